//! Error types for flvmeta-media.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for flvmeta-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for flvmeta-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Input and output resolve to the same file.
    #[error("Input and output are the same file: {0:?}")]
    SameFile(PathBuf),

    /// The input file could not be opened.
    #[error("Cannot open {path:?} for reading: {source}")]
    OpenRead { path: PathBuf, source: io::Error },

    /// The output file could not be created.
    #[error("Cannot open {path:?} for writing: {source}")]
    OpenWrite { path: PathBuf, source: io::Error },

    /// Missing signature or impossible header.
    #[error("Invalid FLV: {0}")]
    Malformed(String),

    /// The input ended inside a header or a declared tag body.
    #[error("Unexpected end of file at offset {offset:#x}")]
    Truncated { offset: u64 },

    /// A tag type that is not audio, video or script data.
    #[error("Invalid tag of type {kind} at offset {offset:#x}")]
    InvalidTag { kind: u8, offset: u64 },

    /// The name of a script data tag could not be decoded.
    #[error("Unreadable metadata tag at offset {offset:#x}: {source}")]
    Metadata {
        offset: u64,
        source: flvmeta_amf::Error,
    },

    /// A synthesized tag does not fit the 24-bit body size field.
    #[error("Tag body of {0} bytes exceeds the 24-bit size field")]
    TagTooLarge(usize),

    /// Writing the output failed.
    #[error("Write error: {0}")]
    Write(#[source] io::Error),

    /// Reading the input failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a malformed container error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }

    /// Map a read failure, turning an early end of file into [`Error::Truncated`].
    pub(crate) fn from_read(err: io::Error, offset: u64) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated { offset }
        } else {
            Self::Io(err)
        }
    }
}
