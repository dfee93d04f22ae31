//! Screen video (v1 and v2) frame header.

use super::Resolution;

pub const HEADER_LEN: usize = 4;

/// Width and height are the low 12 bits of two big-endian 16-bit words.
/// The high nibbles hold the block sizes.
pub fn decode(header: &[u8]) -> Option<Resolution> {
    let width = u16::from_be_bytes([header[0], header[1]]) & 0x0FFF;
    let height = u16::from_be_bytes([header[2], header[3]]) & 0x0FFF;
    Some(Resolution::new(width as u32, height as u32))
}
