//! FLV container primitives.
//!
//! An FLV file is a 9-byte header (possibly followed by extra header bytes
//! announced by its data offset), a 4-byte zero trailer, and a sequence of
//! tags. Every tag is an 11-byte header, a body, and a 4-byte trailer holding
//! the size of the header plus body.

mod header;
mod tag;

pub use header::{FlvHeader, HEADER_SIZE, MAX_HEADER_SIZE, SIGNATURE};
pub use tag::{AudioTagHeader, TagHeader, TagKind, VideoTagHeader, MAX_BODY_SIZE};

use std::io::{self, Read};

/// Size of a tag header in bytes.
pub const TAG_HEADER_SIZE: u64 = 11;

/// Size of the trailer following every tag (and the header).
pub const PREV_TAG_SIZE_LEN: u64 = 4;

/// Video frame type of a keyframe.
pub const FRAME_TYPE_KEYFRAME: u8 = 1;

/// Read until `buf` is full or the reader is exhausted, returning the number
/// of bytes read.
pub(crate) fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Discard exactly `len` bytes, returning how many were actually available.
pub(crate) fn skip<R: Read>(reader: &mut R, len: u64) -> io::Result<u64> {
    io::copy(&mut reader.take(len), &mut io::sink())
}

/// Encode a trailer for a tag with the given body size.
pub fn prev_tag_size(body_size: u32) -> [u8; 4] {
    (TAG_HEADER_SIZE as u32 + body_size).to_be_bytes()
}
