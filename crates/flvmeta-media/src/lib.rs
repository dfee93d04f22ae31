//! flvmeta-media: FLV scanning, metadata synthesis and rewriting
//!
//! Updating the metadata of an FLV file takes two passes over the input:
//!
//! 1. [`scan`] reads every tag and gathers track statistics, keyframe
//!    positions and byte counts into a [`StreamInfo`].
//! 2. [`synthesize`] turns that into an `onMetaData` record whose size
//!    dependent fields (`filesize`, `datasize`, keyframe file positions)
//!    already describe the output file.
//! 3. [`rewrite`] streams the input again, writing the new record in place
//!    of any existing one and inserting an `onLastSecond` marker in front
//!    of the first tag within the last second of the stream.
//!
//! [`update_metadata`] runs the whole pipeline between two files.
//!
//! # Modules
//!
//! - `flv` - container header and tag primitives
//! - `timestamp` - wrap-around timestamp reconstruction
//! - `scan` - first pass
//! - `metadata` - `onMetaData` synthesis
//! - `rewrite` - second pass
//! - `update` - file-level orchestration

pub mod error;
pub mod flv;
pub mod metadata;
pub mod rewrite;
pub mod scan;
pub mod timestamp;
pub mod update;

#[cfg(test)]
mod testutil;

pub use error::{Error, Result};
pub use metadata::{synthesize, MetadataTag, SynthesisOptions, UpdatePlan};
pub use rewrite::{rewrite, RewriteStats};
pub use scan::{scan, ErrorHandling, Keyframe, ScanOptions, StreamInfo};
pub use update::{update_metadata, update_metadata_with, UpdateOptions, UpdateReport};
