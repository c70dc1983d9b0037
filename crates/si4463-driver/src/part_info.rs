use bytes::Buf;

use crate::error::{DriverError, Result};

/// Size of the `PART_INFO` response.
pub const PART_INFO_LEN: usize = 8;

/// Chip identity, as returned by `PART_INFO` (big-endian on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartInfo {
    pub chip_revision: u8,
    pub part: u16,
    pub build_id: u8,
    pub id: u16,
    pub customer_id: u8,
    pub rom_id: u8,
}

impl PartInfo {
    /// Decode the 8-byte response.
    pub fn decode(mut src: &[u8]) -> Result<Self> {
        if src.len() < PART_INFO_LEN {
            return Err(DriverError::ShortResponse {
                expected: PART_INFO_LEN,
                got: src.len(),
            });
        }
        Ok(Self {
            chip_revision: src.get_u8(),
            part: src.get_u16(),
            build_id: src.get_u8(),
            id: src.get_u16(),
            customer_id: src.get_u8(),
            rom_id: src.get_u8(),
        })
    }
}
