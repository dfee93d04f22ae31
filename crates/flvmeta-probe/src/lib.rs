//! # flvmeta-probe
//!
//! Picture size extraction for the video codecs FLV can carry.
//!
//! FLV has no field for the video dimensions outside of `onMetaData`, so
//! they have to be recovered from the first video frame. Each codec keeps
//! them at a codec-specific position:
//!
//! - Sorenson H.263: picture header, fixed or explicit sizes
//! - Screen video v1/v2: two 12-bit fields
//! - On2 VP6 and VP6 alpha: macroblock counts minus a crop nibble
//! - AVC: the first SPS of the decoder configuration record
//!
//! ## Example
//!
//! ```
//! use flvmeta_probe::{decode_resolution, Resolution, VideoCodec};
//!
//! // Screen video: 12-bit width and height
//! let payload = [0x11, 0x40, 0x10, 0xF0];
//! let decoded = decode_resolution(VideoCodec::from_id(3), &payload);
//! assert_eq!(decoded.resolution, Some(Resolution::new(320, 240)));
//! assert_eq!(decoded.consumed, 4);
//! ```

pub mod codec;

pub use codec::{decode_resolution, DecodedHeader, Resolution, VideoCodec};
