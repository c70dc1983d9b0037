//! Si4463 command opcodes, chip states and interrupt bits.
//!
//! Opcode values are the chip's wire constants and must not change.

/// Command opcodes, sent as the first payload byte of a request.
pub mod command {
    pub const NOP: u8 = 0x00;
    pub const PART_INFO: u8 = 0x01;
    pub const POWER_UP: u8 = 0x02;
    pub const FUNC_INFO: u8 = 0x10;
    pub const SET_PROPERTY: u8 = 0x11;
    pub const GET_PROPERTY: u8 = 0x12;
    pub const GPIO_PIN_CFG: u8 = 0x13;
    pub const FIFO_INFO: u8 = 0x15;
    pub const PACKET_INFO: u8 = 0x16;
    pub const GET_INT_STATUS: u8 = 0x20;
    pub const GET_PH_STATUS: u8 = 0x21;
    pub const GET_MODEM_STATUS: u8 = 0x22;
    pub const START_TX: u8 = 0x31;
    pub const START_RX: u8 = 0x32;
    pub const REQUEST_DEVICE_STATE: u8 = 0x33;
    pub const CHANGE_STATE: u8 = 0x34;
    pub const RX_HOP: u8 = 0x36;
    pub const TX_HOP: u8 = 0x37;
    pub const READ_CMD_BUFF: u8 = 0x44;
    pub const FRR_A_READ: u8 = 0x50;
    pub const FRR_B_READ: u8 = 0x51;
    pub const FRR_C_READ: u8 = 0x53;
    pub const FRR_D_READ: u8 = 0x57;
    pub const WRITE_TX_FIFO: u8 = 0x66;
    pub const READ_RX_FIFO: u8 = 0x77;

    /// Returns a human-readable name for an opcode.
    pub fn name(opcode: u8) -> &'static str {
        match opcode {
            NOP => "NOP",
            PART_INFO => "PART_INFO",
            POWER_UP => "POWER_UP",
            FUNC_INFO => "FUNC_INFO",
            SET_PROPERTY => "SET_PROPERTY",
            GET_PROPERTY => "GET_PROPERTY",
            GPIO_PIN_CFG => "GPIO_PIN_CFG",
            FIFO_INFO => "FIFO_INFO",
            PACKET_INFO => "PACKET_INFO",
            GET_INT_STATUS => "GET_INT_STATUS",
            GET_PH_STATUS => "GET_PH_STATUS",
            GET_MODEM_STATUS => "GET_MODEM_STATUS",
            START_TX => "START_TX",
            START_RX => "START_RX",
            REQUEST_DEVICE_STATE => "REQUEST_DEVICE_STATE",
            CHANGE_STATE => "CHANGE_STATE",
            RX_HOP => "RX_HOP",
            TX_HOP => "TX_HOP",
            READ_CMD_BUFF => "READ_CMD_BUFF",
            FRR_A_READ => "FRR_A_READ",
            FRR_B_READ => "FRR_B_READ",
            FRR_C_READ => "FRR_C_READ",
            FRR_D_READ => "FRR_D_READ",
            WRITE_TX_FIFO => "WRITE_TX_FIFO",
            READ_RX_FIFO => "READ_RX_FIFO",
            _ => "UNKNOWN",
        }
    }
}

/// Packet handler interrupt bits, as latched in the fast-response register.
pub mod interrupt {
    pub const PACKET_RX: u8 = 0x10;
    pub const PACKET_SENT: u8 = 0x20;
}

/// `FIFO_INFO` argument bits.
pub(crate) mod fifo {
    pub const KEEP: u8 = 0x00;
    pub const RESET_TX: u8 = 0x01;
    pub const RESET_RX: u8 = 0x02;
}

/// Part number this driver talks to.
pub const EXPECTED_PART: u16 = 0x4463;

/// Chip operating state.
///
/// `NoChange` is only meaningful as an argument ("stay where you are");
/// the chip never reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum State {
    NoChange = 0,
    Sleep = 1,
    SpiActive = 2,
    Ready = 3,
    Ready2 = 4,
    TxTune = 5,
    RxTune = 6,
    Tx = 7,
    Rx = 8,
    RxIdle = 9,
}

impl State {
    /// Alias used by the chip documentation for "remain in current state".
    pub const REMAIN: State = State::NoChange;

    /// The wire value of this state.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Decode a state from its wire value.
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => State::NoChange,
            1 => State::Sleep,
            2 => State::SpiActive,
            3 => State::Ready,
            4 => State::Ready2,
            5 => State::TxTune,
            6 => State::RxTune,
            7 => State::Tx,
            8 => State::Rx,
            9 => State::RxIdle,
            _ => return None,
        })
    }

    /// Upper-case name as used in chip documentation.
    pub fn name(self) -> &'static str {
        match self {
            State::NoChange => "NOCHANGE",
            State::Sleep => "SLEEP",
            State::SpiActive => "SPI_ACTIVE",
            State::Ready => "READY",
            State::Ready2 => "READY2",
            State::TxTune => "TX_TUNE",
            State::RxTune => "RX_TUNE",
            State::Tx => "TX",
            State::Rx => "RX",
            State::RxIdle => "RX_IDLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_wire_values_round_trip() {
        for value in 0..=9u8 {
            let state = State::from_u8(value).unwrap();
            assert_eq!(state.as_u8(), value);
        }
        assert_eq!(State::from_u8(10), None);
        assert_eq!(State::REMAIN, State::NoChange);
    }

    #[test]
    fn opcode_names() {
        assert_eq!(command::name(command::START_RX), "START_RX");
        assert_eq!(command::name(0xEE), "UNKNOWN");
    }
}
