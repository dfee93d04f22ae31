//! Error types for flvmeta-amf.

use thiserror::Error;

/// Result type for AMF decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding AMF0 data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The buffer ended before the value was complete.
    #[error("Unexpected end of AMF data: need {need} bytes, have {have}")]
    Truncated { need: usize, have: usize },

    /// A type marker that AMF0 does not define.
    #[error("Unknown AMF0 type marker: {0:#04x}")]
    UnknownMarker(u8),

    /// Objects or arrays nested deeper than the decoder accepts.
    #[error("AMF value nesting exceeds {0} levels")]
    TooDeep(usize),
}
