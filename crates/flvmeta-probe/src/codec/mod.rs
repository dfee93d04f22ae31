//! Per-codec frame header decoders.
//!
//! Every FLV video codec stores its picture dimensions at a fixed place in
//! the first frame (or, for AVC, in the sequence header carried by the
//! first tag). Each decoder is handed the tag body that follows the one
//! byte FLV video header and reports how many bytes it looked at.

pub mod avc;
pub mod h263;
pub mod screen;
pub mod vp6;

use std::fmt;

/// Video codec identifier from the low nibble of the FLV video tag header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    /// Sorenson H.263.
    SorensonH263,
    /// Screen video.
    ScreenVideo,
    /// On2 VP6.
    Vp6,
    /// On2 VP6 with alpha channel.
    Vp6Alpha,
    /// Screen video version 2.
    ScreenVideoV2,
    /// H.264 / AVC.
    Avc,
    /// Any other identifier.
    Unknown(u8),
}

impl VideoCodec {
    /// Map a 4-bit codec id to a codec.
    pub fn from_id(id: u8) -> Self {
        match id {
            2 => Self::SorensonH263,
            3 => Self::ScreenVideo,
            4 => Self::Vp6,
            5 => Self::Vp6Alpha,
            6 => Self::ScreenVideoV2,
            7 => Self::Avc,
            other => Self::Unknown(other),
        }
    }

    /// The codec id as stored on disk.
    pub fn id(&self) -> u8 {
        match self {
            Self::SorensonH263 => 2,
            Self::ScreenVideo => 3,
            Self::Vp6 => 4,
            Self::Vp6Alpha => 5,
            Self::ScreenVideoV2 => 6,
            Self::Avc => 7,
            Self::Unknown(id) => *id,
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SorensonH263 => write!(f, "Sorenson H.263"),
            Self::ScreenVideo => write!(f, "Screen video"),
            Self::Vp6 => write!(f, "On2 VP6"),
            Self::Vp6Alpha => write!(f, "On2 VP6 with alpha"),
            Self::ScreenVideoV2 => write!(f, "Screen video v2"),
            Self::Avc => write!(f, "AVC"),
            Self::Unknown(id) => write!(f, "unknown ({id})"),
        }
    }
}

/// Picture dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Outcome of decoding a frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodedHeader {
    /// Dimensions, if the header could be read.
    pub resolution: Option<Resolution>,
    /// Bytes taken from the front of the payload.
    pub consumed: usize,
}

/// Decode the picture dimensions of the first frame of a video track.
///
/// `payload` is the tag body after the one byte FLV video header. Unknown
/// codecs consume nothing and yield no resolution.
pub fn decode_resolution(codec: VideoCodec, payload: &[u8]) -> DecodedHeader {
    match codec {
        VideoCodec::SorensonH263 => fixed(h263::HEADER_LEN, payload, h263::decode),
        VideoCodec::ScreenVideo | VideoCodec::ScreenVideoV2 => {
            fixed(screen::HEADER_LEN, payload, screen::decode)
        }
        VideoCodec::Vp6 => fixed(vp6::HEADER_LEN, payload, vp6::decode),
        VideoCodec::Vp6Alpha => fixed(vp6::ALPHA_HEADER_LEN, payload, vp6::decode_alpha),
        VideoCodec::Avc => avc::decode(payload),
        VideoCodec::Unknown(_) => DecodedHeader::default(),
    }
}

/// Run a decoder that needs exactly `len` bytes.
fn fixed(len: usize, payload: &[u8], decode: fn(&[u8]) -> Option<Resolution>) -> DecodedHeader {
    if payload.len() < len {
        return DecodedHeader {
            resolution: None,
            consumed: payload.len(),
        };
    }
    DecodedHeader {
        resolution: decode(&payload[..len]),
        consumed: len,
    }
}
