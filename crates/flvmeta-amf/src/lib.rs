//! # flvmeta-amf
//!
//! AMF0 values as they appear in FLV script data tags.
//!
//! An FLV metadata tag body is two AMF0 values back to back: a string
//! naming the event (`onMetaData`, `onLastSecond`, ...) and its payload,
//! usually an associative array. This crate builds, inspects, sizes and
//! serializes those values.
//!
//! Numbers always serialize to 9 bytes. Code that lays out a file before
//! writing it can store a placeholder number, measure the record with
//! [`AmfValue::encoded_len`], and overwrite the number afterwards without
//! changing the record's size.
//!
//! ## Example
//!
//! ```
//! use flvmeta_amf::{AmfValue, Properties};
//!
//! let mut meta = Properties::new();
//! meta.set("duration", 0.0);
//! meta.set("hasVideo", true);
//!
//! let record = AmfValue::EcmaArray(meta);
//! let size = record.encoded_len();
//!
//! let mut record = record;
//! if let Some(props) = record.properties_mut() {
//!     props.set("duration", 3600.0);
//! }
//! assert_eq!(record.encoded_len(), size);
//!
//! let (decoded, used) = flvmeta_amf::decode_slice(&record.to_bytes()).unwrap();
//! assert_eq!(decoded, record);
//! assert_eq!(used, size);
//! ```

pub mod decode;
pub mod error;
#[cfg(feature = "json")]
pub mod json;
mod properties;
pub mod value;

pub use decode::{decode, decode_slice};
pub use error::{Error, Result};
pub use properties::Properties;
pub use value::AmfValue;
