//! On2 VP6 frame header.
//!
//! FLV prefixes VP6 frames with one byte holding the horizontal (high
//! nibble) and vertical (low nibble) crop in pixels. The VP6 header then
//! stores the displayed size in macroblocks; intra frames of the simple
//! profile carry two extra bytes before it.

use super::Resolution;

pub const HEADER_LEN: usize = 7;
/// VP6 alpha adds a 3-byte alpha offset before the frame header.
pub const ALPHA_HEADER_LEN: usize = 10;

pub fn decode(header: &[u8]) -> Option<Resolution> {
    Some(macroblock_size(header, 0))
}

pub fn decode_alpha(header: &[u8]) -> Option<Resolution> {
    Some(macroblock_size(header, 3))
}

fn macroblock_size(header: &[u8], base: usize) -> Resolution {
    let crop = header[0];
    let offset = if header[base + 1] & 0x01 != 0 || header[base + 2] & 0x06 == 0 {
        2
    } else {
        0
    };

    let columns = header[base + 4 + offset] as u32;
    let rows = header[base + 3 + offset] as u32;

    Resolution::new(
        (columns << 4).saturating_sub((crop >> 4) as u32),
        (rows << 4).saturating_sub((crop & 0x0F) as u32),
    )
}
