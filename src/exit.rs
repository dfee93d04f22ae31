//! Process exit codes.
//!
//! Each failure class of an update gets its own code so scripts can tell
//! them apart. Usage errors reported by clap keep their code 2.

use flvmeta_media::Error;

pub const FAILURE: u8 = 1;
pub const SAME_FILE: u8 = 10;
pub const OPEN_READ: u8 = 11;
pub const MALFORMED: u8 = 12;
pub const TRUNCATED: u8 = 13;
pub const OPEN_WRITE: u8 = 14;
pub const INVALID_TAG: u8 = 15;
pub const WRITE: u8 = 16;

/// Exit code for an update error.
pub fn code_for_media(err: &Error) -> u8 {
    match err {
        Error::SameFile(_) => SAME_FILE,
        Error::OpenRead { .. } => OPEN_READ,
        Error::Malformed(_) => MALFORMED,
        Error::Truncated { .. } | Error::Metadata { .. } => TRUNCATED,
        Error::OpenWrite { .. } => OPEN_WRITE,
        Error::InvalidTag { .. } => INVALID_TAG,
        Error::Write(_) | Error::TagTooLarge(_) => WRITE,
        Error::Io(_) => FAILURE,
    }
}

/// Exit code for any error, looking through added context.
pub fn code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<Error>())
        .map_or(FAILURE, code_for_media)
}
