//! Simulated Si4463 behind the bridge protocol.
//!
//! Requests are decoded off the write side and answered on the read side.
//! Transmitted packets can be looped back onto the air so one chip can
//! carry both ends of a conversation.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use si4463_chat::SENDER_THREAD_NAME;
use si4463_frame::decode_request;

const PACKET_RX: u8 = 0x10;
const PACKET_SENT: u8 = 0x20;

/// Which role issued a request, judged by thread name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Who {
    Sender,
    Other,
}

#[derive(Debug, Clone)]
pub struct TraceEntry {
    pub who: Who,
    pub payload: Vec<u8>,
}

impl TraceEntry {
    pub fn opcode(&self) -> u8 {
        self.payload[0]
    }
}

#[derive(Debug, Default)]
pub struct ChipState {
    pub trace: Vec<TraceEntry>,
    pub transmitted: Vec<Vec<u8>>,
    pub air: VecDeque<Vec<u8>>,
    pub loopback: bool,
    /// Status reads before a started transmission completes.
    pub tx_latency: u32,
    /// Status reads before an armed receiver picks up a waiting packet.
    pub rx_latency: u32,
    ph_pending: u8,
    tx_fifo: Vec<u8>,
    rx_fifo: VecDeque<u8>,
    tx_in_flight: Option<(Vec<u8>, u32)>,
    rx_armed: Option<(usize, u32)>,
}

impl ChipState {
    fn tick(&mut self) {
        if let Some((packet, remaining)) = self.tx_in_flight.take() {
            if remaining == 0 {
                self.ph_pending |= PACKET_SENT;
                if self.loopback {
                    self.air.push_back(packet.clone());
                }
                self.transmitted.push(packet);
            } else {
                self.tx_in_flight = Some((packet, remaining - 1));
            }
        }
        if let Some((len, remaining)) = self.rx_armed {
            if self.air.is_empty() {
                return;
            }
            if remaining > 0 {
                self.rx_armed = Some((len, remaining - 1));
                return;
            }
            if let Some(mut packet) = self.air.pop_front() {
                packet.resize(len.max(packet.len()), 0);
                self.rx_fifo.clear();
                self.rx_fifo.extend(packet);
                self.ph_pending |= PACKET_RX;
                self.rx_armed = None;
            }
        }
    }

    fn handle(&mut self, payload: &[u8], response_len: usize) -> Vec<u8> {
        let Some((&opcode, args)) = payload.split_first() else {
            return vec![0; response_len];
        };
        let mut rsp = match opcode {
            0x01 => vec![0x01, 0x44, 0x63, 0x01, 0x44, 0x63, 0x01, 0x02],
            0x15 => {
                let arg = args.first().copied().unwrap_or(0);
                if arg & 0x01 != 0 {
                    self.tx_fifo.clear();
                }
                if arg & 0x02 != 0 {
                    self.rx_fifo.clear();
                }
                vec![self.rx_fifo.len() as u8, (64 - self.tx_fifo.len()) as u8]
            }
            0x20 => {
                self.ph_pending = 0;
                Vec::new()
            }
            0x21 => {
                let mask = args.first().copied().unwrap_or(0xFF);
                let status = self.ph_pending;
                self.ph_pending &= mask;
                vec![status]
            }
            0x31 => {
                let len = u16::from_be_bytes([args[2], args[3]]) as usize;
                let take = if len == 0 { self.tx_fifo.len() } else { len };
                let packet: Vec<u8> = self.tx_fifo.drain(..take.min(self.tx_fifo.len())).collect();
                self.rx_armed = None;
                self.tx_in_flight = Some((packet, self.tx_latency));
                Vec::new()
            }
            0x32 => {
                let len = u16::from_be_bytes([args[2], args[3]]) as usize;
                self.rx_armed = Some((len, self.rx_latency));
                Vec::new()
            }
            0x50 => {
                self.tick();
                vec![self.ph_pending]
            }
            0x66 => {
                self.tx_fifo.extend_from_slice(args);
                Vec::new()
            }
            0x77 => (0..response_len)
                .map(|_| self.rx_fifo.pop_front().unwrap_or(0))
                .collect(),
            _ => Vec::new(),
        };
        rsp.resize(response_len, 0);
        rsp
    }
}

/// Bridge stream over a simulated chip. Clones share the chip.
#[derive(Clone)]
pub struct MockChip {
    pub state: Arc<Mutex<ChipState>>,
    pending: Vec<u8>,
    output: VecDeque<u8>,
}

impl MockChip {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChipState {
                tx_latency: 2,
                rx_latency: 2,
                ..ChipState::default()
            })),
            pending: Vec::new(),
            output: VecDeque::new(),
        }
    }

    pub fn looped_back() -> Self {
        let chip = Self::new();
        chip.state.lock().unwrap().loopback = true;
        chip
    }

    pub fn with_incoming(packet: &[u8]) -> Self {
        let chip = Self::new();
        chip.state.lock().unwrap().air.push_back(packet.to_vec());
        chip
    }

    pub fn trace(&self) -> Vec<TraceEntry> {
        self.state.lock().unwrap().trace.clone()
    }

    pub fn transmitted(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().transmitted.clone()
    }
}

impl Write for MockChip {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        while let Some(req) = decode_request(&self.pending) {
            let size = req.wire_size();
            let payload = req.payload.to_vec();
            let response_len = req.response_len as usize;

            let who = if std::thread::current().name() == Some(SENDER_THREAD_NAME) {
                Who::Sender
            } else {
                Who::Other
            };
            let mut state = self.state.lock().unwrap();
            state.trace.push(TraceEntry {
                who,
                payload: payload.clone(),
            });
            if response_len == 0 {
                state.handle(&payload, 0);
                self.output.push_back(0xFF);
            } else {
                let rsp = state.handle(&payload, response_len);
                self.output.extend(rsp);
            }
            drop(state);
            self.pending.drain(..size);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for MockChip {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.output.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}

/// Collapse a trace into runs of the same role: `(who, first, len)`.
pub fn blocks(trace: &[TraceEntry]) -> Vec<(Who, usize, usize)> {
    let mut out: Vec<(Who, usize, usize)> = Vec::new();
    for (idx, entry) in trace.iter().enumerate() {
        match out.last_mut() {
            Some((who, _, len)) if *who == entry.who => *len += 1,
            _ => out.push((entry.who, idx, 1)),
        }
    }
    out
}
