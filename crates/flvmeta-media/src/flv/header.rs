//! FLV file header.

use super::read_full;
use crate::{Error, Result};
use std::io::Read;

/// File signature.
pub const SIGNATURE: [u8; 3] = *b"FLV";

/// Size of the fixed part of the header.
pub const HEADER_SIZE: u64 = 9;

/// Largest data offset accepted before the file is considered malformed.
pub const MAX_HEADER_SIZE: u64 = 1024 * 1024;

/// The FLV file header, including any bytes between the fixed header and
/// the declared data offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlvHeader {
    pub version: u8,
    pub flags: u8,
    pub data_offset: u32,
    pub extra: Vec<u8>,
}

impl FlvHeader {
    /// Read and validate a header from the start of a stream.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut fixed = [0u8; HEADER_SIZE as usize];
        let n = read_full(reader, &mut fixed)?;
        if n < SIGNATURE.len() || fixed[..3] != SIGNATURE {
            return Err(Error::malformed("missing FLV signature"));
        }
        if n < fixed.len() {
            return Err(Error::Truncated { offset: n as u64 });
        }

        let data_offset = u32::from_be_bytes([fixed[5], fixed[6], fixed[7], fixed[8]]);
        if u64::from(data_offset) < HEADER_SIZE {
            return Err(Error::malformed(format!(
                "data offset {data_offset} is smaller than the header"
            )));
        }
        if u64::from(data_offset) > MAX_HEADER_SIZE {
            return Err(Error::malformed(format!(
                "data offset {data_offset} is unreasonably large"
            )));
        }

        let mut extra = vec![0u8; (u64::from(data_offset) - HEADER_SIZE) as usize];
        let got = read_full(reader, &mut extra)?;
        if got < extra.len() {
            return Err(Error::Truncated {
                offset: HEADER_SIZE + got as u64,
            });
        }

        Ok(Self {
            version: fixed[3],
            flags: fixed[4],
            data_offset,
            extra,
        })
    }

    /// Header size in bytes, as declared by the data offset.
    pub fn size(&self) -> u64 {
        u64::from(self.data_offset)
    }

    /// Serialize the header, extra bytes included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size() as usize);
        out.extend_from_slice(&SIGNATURE);
        out.push(self.version);
        out.push(self.flags);
        out.extend_from_slice(&self.data_offset.to_be_bytes());
        out.extend_from_slice(&self.extra);
        out
    }
}
