use std::io::{Read, Write};

use bytes::Bytes;
use si4463_frame::{ChannelConfig, CommandChannel, Item};
use tracing::{debug, info};

use crate::config::ConfigDirective;
use crate::consts::{command, fifo, interrupt, State, EXPECTED_PART};
use crate::error::{DriverError, Result};
use crate::part_info::{PartInfo, PART_INFO_LEN};
use crate::poll::PollOptions;
use crate::property::PropertyValue;

/// When a start-transmit/start-receive command takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum StartCondition {
    /// Start as soon as the command is processed.
    #[default]
    Immediate = 0,
    /// Start when the wake-up timer expires.
    WakeUpTimer = 1,
}

/// Arguments of `START_TX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxOptions {
    pub channel: u8,
    /// Retransmit field (2 bits) of the condition byte.
    pub retransmit: u8,
    pub start: StartCondition,
    /// State to enter once the packet has been sent.
    pub post_tx_state: State,
    /// Number of FIFO bytes to send; 0 uses the packet handler's field lengths.
    pub length: u16,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            channel: 0,
            retransmit: 0,
            start: StartCondition::Immediate,
            post_tx_state: State::Ready,
            length: 0,
        }
    }
}

impl TxOptions {
    /// Condition byte: `post_tx_state << 4 | retransmit << 2 | start`.
    pub fn condition(&self) -> u8 {
        (self.post_tx_state.as_u8() << 4) | ((self.retransmit & 0x03) << 2) | self.start as u8
    }
}

/// Arguments of `START_RX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxOptions {
    pub channel: u8,
    pub start: StartCondition,
    /// Number of bytes to receive; 0 uses the packet handler's field lengths.
    pub length: u16,
    /// State to enter on preamble timeout.
    pub timeout_state: State,
    /// State to enter after a valid packet.
    pub valid_state: State,
    /// State to enter after an invalid packet (e.g. CRC error).
    pub invalid_state: State,
}

impl Default for RxOptions {
    fn default() -> Self {
        Self {
            channel: 0,
            start: StartCondition::Immediate,
            length: 0,
            timeout_state: State::NoChange,
            valid_state: State::Ready,
            invalid_state: State::Rx,
        }
    }
}

/// Current chip state and channel, from `REQUEST_DEVICE_STATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceState {
    pub state: State,
    pub channel: u8,
}

/// Typed chip operations over a bridge command channel.
///
/// The driver keeps no chip state of its own; everything it knows comes
/// back from the chip. It is `Sync` whenever the stream is `Send`, so two
/// threads may share one driver. The command channel serializes their
/// requests; deciding who may drive the radio is up to the caller.
pub struct Si4463<T> {
    channel: CommandChannel<T>,
}

impl<T: Read + Write> Si4463<T> {
    /// Create a driver over a bridge stream.
    pub fn new(stream: T) -> Self {
        Self::from_channel(CommandChannel::new(stream))
    }

    /// Create a driver over a bridge stream with explicit channel configuration.
    pub fn with_config(stream: T, config: ChannelConfig) -> Self {
        Self::from_channel(CommandChannel::with_config(stream, config))
    }

    /// Create a driver over an existing command channel.
    pub fn from_channel(channel: CommandChannel<T>) -> Self {
        Self { channel }
    }

    /// Consume the driver and return the bridge stream.
    pub fn into_inner(self) -> T {
        self.channel.into_inner()
    }

    /// Send a raw request.
    pub fn request(&self, items: &[Item<'_>], response_len: u8) -> Result<Bytes> {
        Ok(self.channel.request(items, response_len)?)
    }

    /// Read the chip's identity.
    pub fn part_info(&self) -> Result<PartInfo> {
        let rsp = self.request(&[Item::Byte(command::PART_INFO)], PART_INFO_LEN as u8)?;
        PartInfo::decode(&rsp)
    }

    /// Read the chip's identity and fail unless it is an Si4463.
    pub fn verify_part(&self) -> Result<PartInfo> {
        let info = self.part_info()?;
        if info.part != EXPECTED_PART {
            return Err(DriverError::ProtocolMismatch {
                expected: EXPECTED_PART,
                found: info.part,
            });
        }
        debug!(
            part = format_args!("0x{:04X}", info.part),
            rev = info.chip_revision,
            rom = info.rom_id,
            "chip identified"
        );
        Ok(info)
    }

    /// Read `count` consecutive properties of `group` starting at `index`.
    pub fn get_property(&self, group: u8, index: u8, count: u8) -> Result<PropertyValue> {
        let rsp = self.request(
            &[
                Item::Byte(command::GET_PROPERTY),
                Item::Byte(group),
                Item::Byte(count),
                Item::Byte(index),
            ],
            count,
        )?;
        Ok(PropertyValue::from_response(rsp))
    }

    /// Write consecutive properties of `group` starting at `index`.
    pub fn set_property(&self, group: u8, index: u8, values: &[u8]) -> Result<()> {
        let count = u8::try_from(values.len()).unwrap_or(u8::MAX);
        self.request(
            &[
                Item::Byte(command::SET_PROPERTY),
                Item::Byte(group),
                Item::Byte(count),
                Item::Byte(index),
                Item::Bytes(values),
            ],
            0,
        )?;
        Ok(())
    }

    /// Bytes waiting in the RX FIFO.
    pub fn rx_fifo_count(&self) -> Result<u8> {
        let rsp = self.request(&[Item::Byte(command::FIFO_INFO), Item::Byte(fifo::KEEP)], 1)?;
        Ok(rsp[0])
    }

    /// Free space in the TX FIFO.
    pub fn tx_fifo_space(&self) -> Result<u8> {
        let rsp = self.request(&[Item::Byte(command::FIFO_INFO), Item::Byte(fifo::KEEP)], 2)?;
        Ok(rsp[1])
    }

    pub fn clear_tx_fifo(&self) -> Result<()> {
        self.request(
            &[Item::Byte(command::FIFO_INFO), Item::Byte(fifo::RESET_TX)],
            0,
        )?;
        Ok(())
    }

    pub fn clear_rx_fifo(&self) -> Result<()> {
        self.request(
            &[Item::Byte(command::FIFO_INFO), Item::Byte(fifo::RESET_RX)],
            0,
        )?;
        Ok(())
    }

    /// Clear every pending interrupt.
    pub fn clear_interrupts(&self) -> Result<()> {
        self.request(
            &[
                Item::Byte(command::GET_INT_STATUS),
                Item::Byte(0),
                Item::Byte(0),
                Item::Byte(0),
            ],
            0,
        )?;
        Ok(())
    }

    /// Clear the latched packet-received flag, leaving the others alone.
    pub fn clear_packet_received_flag(&self) -> Result<()> {
        self.clear_ph_flag(interrupt::PACKET_RX)
    }

    /// Clear the latched packet-sent flag, leaving the others alone.
    pub fn clear_packet_sent_flag(&self) -> Result<()> {
        self.clear_ph_flag(interrupt::PACKET_SENT)
    }

    // GET_PH_STATUS clears the pending bits whose mask bit is 0.
    fn clear_ph_flag(&self, bit: u8) -> Result<()> {
        self.request(&[Item::Byte(command::GET_PH_STATUS), Item::Byte(!bit)], 0)?;
        Ok(())
    }

    pub fn write_tx_fifo(&self, data: &[u8]) -> Result<()> {
        self.request(&[Item::Byte(command::WRITE_TX_FIFO), Item::Bytes(data)], 0)?;
        Ok(())
    }

    pub fn read_rx_fifo(&self, length: u8) -> Result<Bytes> {
        self.request(&[Item::Byte(command::READ_RX_FIFO)], length)
    }

    /// Read fast-response register A (latched packet handler status).
    pub fn packet_header_status(&self) -> Result<u8> {
        let rsp = self.request(&[Item::Byte(command::FRR_A_READ)], 1)?;
        Ok(rsp[0])
    }

    /// Spin on the fast-response register until a packet has been received.
    ///
    /// With unbounded options this blocks forever if the chip never reports.
    pub fn poll_until_packet_received(&self, options: &PollOptions) -> Result<u8> {
        self.poll_until(interrupt::PACKET_RX, options)
    }

    /// Spin on the fast-response register until the packet has been sent.
    ///
    /// With unbounded options this blocks forever if the chip never reports.
    pub fn poll_until_packet_sent(&self, options: &PollOptions) -> Result<u8> {
        self.poll_until(interrupt::PACKET_SENT, options)
    }

    fn poll_until(&self, bit: u8, options: &PollOptions) -> Result<u8> {
        let mut budget = options.start();
        loop {
            budget.next_attempt()?;
            let status = self.packet_header_status()?;
            if status & bit != 0 {
                debug!(status, attempts = budget.attempts(), "status bit set");
                return Ok(status);
            }
        }
    }

    pub fn start_transmit(&self, options: &TxOptions) -> Result<()> {
        debug!(
            channel = options.channel,
            length = options.length,
            "start transmit"
        );
        self.request(
            &[
                Item::Byte(command::START_TX),
                Item::Byte(options.channel),
                Item::Byte(options.condition()),
                Item::U16Be(options.length),
            ],
            0,
        )?;
        Ok(())
    }

    pub fn start_receive(&self, options: &RxOptions) -> Result<()> {
        debug!(
            channel = options.channel,
            length = options.length,
            "start receive"
        );
        self.request(
            &[
                Item::Byte(command::START_RX),
                Item::Byte(options.channel),
                Item::Byte(options.start as u8),
                Item::U16Be(options.length),
                Item::Byte(options.timeout_state.as_u8()),
                Item::Byte(options.valid_state.as_u8()),
                Item::Byte(options.invalid_state.as_u8()),
            ],
            0,
        )?;
        Ok(())
    }

    /// Move the chip to `state` directly.
    pub fn change_state(&self, state: State) -> Result<()> {
        self.request(
            &[Item::Byte(command::CHANGE_STATE), Item::Byte(state.as_u8())],
            0,
        )?;
        Ok(())
    }

    /// Ask the chip which state and channel it is in.
    pub fn request_device_state(&self) -> Result<DeviceState> {
        let rsp = self.request(&[Item::Byte(command::REQUEST_DEVICE_STATE)], 2)?;
        let raw = rsp[0] & 0x0F;
        let state = State::from_u8(raw).ok_or(DriverError::UnknownState(raw))?;
        Ok(DeviceState {
            state,
            channel: rsp[1],
        })
    }

    /// Send every configuration directive, in order.
    pub fn load_configuration(&self, directives: &[ConfigDirective]) -> Result<()> {
        for directive in directives {
            debug!(
                name = %directive.name,
                opcode = directive.bytes.first().map_or("EMPTY", |op| command::name(*op)),
                len = directive.bytes.len(),
                "configuration directive"
            );
            self.request(&[Item::Bytes(&directive.bytes)], 0)?;
        }
        info!(count = directives.len(), "radio configured");
        Ok(())
    }

    /// Check the chip identity, then apply the configuration.
    pub fn bring_up(&self, directives: &[ConfigDirective]) -> Result<PartInfo> {
        let info = self.verify_part()?;
        self.load_configuration(directives)?;
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use si4463_frame::decode_request;

    use super::*;
    use crate::poll::CancelToken;

    /// Captures writes; serves a fixed byte script on reads.
    struct ScriptedBridge {
        written: Vec<u8>,
        script: Cursor<Vec<u8>>,
    }

    impl Read for ScriptedBridge {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.script.read(buf)
        }
    }

    impl Write for ScriptedBridge {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn chip(script: &[u8]) -> Si4463<ScriptedBridge> {
        Si4463::new(ScriptedBridge {
            written: Vec::new(),
            script: Cursor::new(script.to_vec()),
        })
    }

    /// Split everything the driver wrote into `(response_len, payload)` pairs.
    fn requests(chip: Si4463<ScriptedBridge>) -> Vec<(u8, Vec<u8>)> {
        let wire = chip.into_inner().written;
        let mut out = Vec::new();
        let mut rest = wire.as_slice();
        while let Some(req) = decode_request(rest) {
            out.push((req.response_len, req.payload.to_vec()));
            rest = &rest[req.wire_size()..];
        }
        assert!(rest.is_empty());
        out
    }

    #[test]
    fn part_info_round_trip() {
        let chip = chip(&[0x01, 0x44, 0x63, 0x01, 0x44, 0x63, 0x01, 0x02]);
        let info = chip.verify_part().unwrap();
        assert_eq!(info.part, 0x4463);
        assert_eq!(info.id, 0x4463);
        assert_eq!(info.rom_id, 0x02);
        assert_eq!(requests(chip), vec![(8, vec![0x01])]);
    }

    #[test]
    fn wrong_part_is_protocol_mismatch() {
        let chip = chip(&[0x01, 0x44, 0x60, 0x01, 0x00, 0x00, 0x01, 0x02]);
        let err = chip.verify_part().unwrap_err();
        assert!(matches!(
            err,
            DriverError::ProtocolMismatch {
                expected: 0x4463,
                found: 0x4460
            }
        ));
    }

    #[test]
    fn get_property_shapes() {
        let chip = chip(&[0x52, 0x01, 0x02, 0x03]);
        assert_eq!(
            chip.get_property(0x00, 0x00, 1).unwrap(),
            PropertyValue::Scalar(0x52)
        );
        let seq = chip.get_property(0x12, 0x08, 3).unwrap();
        assert_eq!(seq.as_bytes(), &[0x01, 0x02, 0x03]);
        assert_eq!(seq.scalar(), None);
        assert_eq!(
            requests(chip),
            vec![
                (1, vec![0x12, 0x00, 0x01, 0x00]),
                (3, vec![0x12, 0x12, 0x03, 0x08]),
            ]
        );
    }

    #[test]
    fn set_property_prefixes_count() {
        let chip = chip(&[0xFF]);
        chip.set_property(0x00, 0x00, &[0x52, 0x00]).unwrap();
        assert_eq!(
            requests(chip),
            vec![(0, vec![0x11, 0x00, 0x02, 0x00, 0x52, 0x00])]
        );
    }

    #[test]
    fn fifo_operations() {
        let chip = chip(&[0x07, 0x00, 0x40, 0xFF, 0xFF]);
        assert_eq!(chip.rx_fifo_count().unwrap(), 0x07);
        assert_eq!(chip.tx_fifo_space().unwrap(), 0x40);
        chip.clear_tx_fifo().unwrap();
        chip.clear_rx_fifo().unwrap();
        assert_eq!(
            requests(chip),
            vec![
                (1, vec![0x15, 0x00]),
                (2, vec![0x15, 0x00]),
                (0, vec![0x15, 0x01]),
                (0, vec![0x15, 0x02]),
            ]
        );
    }

    #[test]
    fn flag_clears_invert_the_target_bit() {
        let chip = chip(&[0xFF, 0xFF, 0xFF]);
        chip.clear_interrupts().unwrap();
        chip.clear_packet_received_flag().unwrap();
        chip.clear_packet_sent_flag().unwrap();
        assert_eq!(
            requests(chip),
            vec![
                (0, vec![0x20, 0x00, 0x00, 0x00]),
                (0, vec![0x21, 0xEF]),
                (0, vec![0x21, 0xDF]),
            ]
        );
    }

    #[test]
    fn start_transmit_packs_condition_and_length() {
        let chip = chip(&[0xFF, 0xFF]);
        chip.start_transmit(&TxOptions {
            length: 3,
            ..TxOptions::default()
        })
        .unwrap();
        chip.start_transmit(&TxOptions {
            channel: 5,
            retransmit: 1,
            start: StartCondition::WakeUpTimer,
            post_tx_state: State::Rx,
            length: 0x0102,
        })
        .unwrap();
        assert_eq!(
            requests(chip),
            vec![
                (0, vec![0x31, 0x00, 0x30, 0x00, 0x03]),
                (0, vec![0x31, 0x05, 0x85, 0x01, 0x02]),
            ]
        );
    }

    #[test]
    fn start_receive_defaults() {
        let chip = chip(&[0xFF]);
        chip.start_receive(&RxOptions {
            length: 64,
            ..RxOptions::default()
        })
        .unwrap();
        assert_eq!(
            requests(chip),
            vec![(0, vec![0x32, 0x00, 0x00, 0x00, 0x40, 0x00, 0x03, 0x08])]
        );
    }

    #[test]
    fn fifo_transfer() {
        let chip = chip(&[0xFF, 0x02, 0x68, 0x69, 0x00]);
        chip.write_tx_fifo(&[0x02, 0x68, 0x69]).unwrap();
        let data = chip.read_rx_fifo(4).unwrap();
        assert_eq!(data.as_ref(), &[0x02, 0x68, 0x69, 0x00]);
        assert_eq!(
            requests(chip),
            vec![(0, vec![0x66, 0x02, 0x68, 0x69]), (4, vec![0x77])]
        );
    }

    #[test]
    fn poll_reissues_fast_read_until_bit_set() {
        let chip = chip(&[0x00, 0x00, 0x10]);
        let status = chip
            .poll_until_packet_received(&PollOptions::unbounded())
            .unwrap();
        assert_eq!(status, 0x10);
        assert_eq!(requests(chip), vec![(1, vec![0x50]); 3]);
    }

    #[test]
    fn poll_ignores_other_bits() {
        let chip = chip(&[0x10, 0x30]);
        let status = chip
            .poll_until_packet_sent(&PollOptions::unbounded())
            .unwrap();
        assert_eq!(status, 0x30);
    }

    #[test]
    fn poll_respects_attempt_limit() {
        let chip = chip(&[0x00; 16]);
        let err = chip
            .poll_until_packet_sent(&PollOptions::unbounded().with_max_attempts(4))
            .unwrap_err();
        assert!(matches!(err, DriverError::PollLimit { attempts: 4, .. }));
        assert_eq!(requests(chip).len(), 4);
    }

    #[test]
    fn poll_respects_cancel_and_timeout() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let chip = chip(&[0x00; 4]);
        let err = chip
            .poll_until_packet_received(&PollOptions::unbounded().with_cancel(cancel))
            .unwrap_err();
        assert!(matches!(err, DriverError::Cancelled));

        let err = chip
            .poll_until_packet_received(&PollOptions::unbounded().with_timeout(Duration::ZERO))
            .unwrap_err();
        assert!(matches!(err, DriverError::PollLimit { attempts: 0, .. }));
    }

    #[test]
    fn device_state_and_change_state() {
        let chip = chip(&[0xFF, 0x08, 0x05]);
        chip.change_state(State::Ready).unwrap();
        let state = chip.request_device_state().unwrap();
        assert_eq!(
            state,
            DeviceState {
                state: State::Rx,
                channel: 5
            }
        );
        assert_eq!(requests(chip), vec![(0, vec![0x34, 0x03]), (2, vec![0x33])]);
    }

    #[test]
    fn bring_up_verifies_then_configures() {
        let mut script = vec![0x01, 0x44, 0x63, 0x01, 0x44, 0x63, 0x01, 0x02];
        script.extend_from_slice(&[0xFF, 0xFF]);
        let chip = chip(&script);
        let directives = vec![
            ConfigDirective {
                name: "RF_POWER_UP".to_string(),
                bytes: Bytes::from_static(&[0x02, 0x01, 0x00]),
            },
            ConfigDirective {
                name: "RF_INT_CTL_ENABLE_1".to_string(),
                bytes: Bytes::from_static(&[0x11, 0x01, 0x01, 0x00, 0x01]),
            },
        ];
        chip.bring_up(&directives).unwrap();
        assert_eq!(
            requests(chip),
            vec![
                (8, vec![0x01]),
                (0, vec![0x02, 0x01, 0x00]),
                (0, vec![0x11, 0x01, 0x01, 0x00, 0x01]),
            ]
        );
    }

    #[test]
    fn bring_up_stops_on_wrong_part() {
        let chip = chip(&[0x01, 0x44, 0x38, 0x01, 0x00, 0x00, 0x01, 0x02]);
        let directives = vec![ConfigDirective {
            name: "RF_POWER_UP".to_string(),
            bytes: Bytes::from_static(&[0x02]),
        }];
        assert!(chip.bring_up(&directives).is_err());
        assert_eq!(requests(chip).len(), 1, "no configuration after mismatch");
    }
}
