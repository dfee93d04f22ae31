//! Sorenson H.263 picture header.

use bitstream_io::{BigEndian, BitRead, BitReader};

use super::Resolution;

/// Bytes needed to reach the end of the largest picture size field.
pub const HEADER_LEN: usize = 9;

/// Decode the picture size from a Sorenson H.263 picture header.
///
/// Layout: 17-bit picture start code (must be 1), 5-bit version, 8-bit
/// temporal reference, 3-bit picture size. Sizes 0 and 1 are followed by
/// explicit 8-bit or 16-bit width and height; 2 through 6 select a fixed
/// format.
pub fn decode(header: &[u8]) -> Option<Resolution> {
    let mut reader = BitReader::endian(header, BigEndian);

    let start_code: u32 = reader.read(17).ok()?;
    if start_code != 1 {
        return None;
    }

    // version, temporal reference
    reader.skip(5 + 8).ok()?;

    let picture_size: u8 = reader.read(3).ok()?;
    let resolution = match picture_size {
        0 => Resolution::new(reader.read(8).ok()?, reader.read(8).ok()?),
        1 => Resolution::new(reader.read(16).ok()?, reader.read(16).ok()?),
        2 => Resolution::new(352, 288),
        3 => Resolution::new(176, 144),
        4 => Resolution::new(128, 96),
        5 => Resolution::new(320, 240),
        6 => Resolution::new(160, 120),
        _ => return None,
    };

    Some(resolution)
}
