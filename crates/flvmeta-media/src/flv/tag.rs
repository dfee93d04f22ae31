//! FLV tag headers and the first body byte of audio and video tags.

use super::{read_full, FRAME_TYPE_KEYFRAME, TAG_HEADER_SIZE};
use crate::{Error, Result};
use std::fmt;
use std::io::Read;

/// Largest body a tag can declare.
pub const MAX_BODY_SIZE: u32 = 0x00FF_FFFF;

/// Kind of a tag, from its type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Audio,
    Video,
    Script,
}

impl TagKind {
    /// Map a type byte, returning `None` for unknown types.
    pub fn from_type(tag_type: u8) -> Option<Self> {
        match tag_type {
            8 => Some(Self::Audio),
            9 => Some(Self::Video),
            18 => Some(Self::Script),
            _ => None,
        }
    }

    /// The type byte.
    pub fn type_id(self) -> u8 {
        match self {
            Self::Audio => 8,
            Self::Video => 9,
            Self::Script => 18,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => write!(f, "audio"),
            Self::Video => write!(f, "video"),
            Self::Script => write!(f, "script"),
        }
    }
}

/// An 11-byte tag header.
///
/// `timestamp` holds the raw 32-bit value: the 24-bit field with the
/// extension byte as its high byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub tag_type: u8,
    pub body_size: u32,
    pub timestamp: u32,
    pub stream_id: u32,
}

impl TagHeader {
    /// Build a header for a tag of a known kind.
    pub fn new(kind: TagKind, body_size: u32, timestamp: u32) -> Self {
        Self {
            tag_type: kind.type_id(),
            body_size,
            timestamp,
            stream_id: 0,
        }
    }

    /// Parse a header from its wire form.
    pub fn parse(b: &[u8; TAG_HEADER_SIZE as usize]) -> Self {
        Self {
            tag_type: b[0],
            body_size: u32::from_be_bytes([0, b[1], b[2], b[3]]),
            timestamp: u32::from_be_bytes([b[7], b[4], b[5], b[6]]),
            stream_id: u32::from_be_bytes([0, b[8], b[9], b[10]]),
        }
    }

    /// Read the next header. Returns `None` at a clean end of stream and
    /// [`Error::Truncated`] when the stream ends inside the header.
    pub fn read<R: Read>(reader: &mut R, offset: u64) -> Result<Option<Self>> {
        let mut b = [0u8; TAG_HEADER_SIZE as usize];
        match read_full(reader, &mut b)? {
            0 => Ok(None),
            n if n < b.len() => Err(Error::Truncated {
                offset: offset + n as u64,
            }),
            _ => Ok(Some(Self::parse(&b))),
        }
    }

    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; TAG_HEADER_SIZE as usize] {
        let size = self.body_size.to_be_bytes();
        let ts = self.timestamp.to_be_bytes();
        let stream = self.stream_id.to_be_bytes();
        [
            self.tag_type,
            size[1],
            size[2],
            size[3],
            ts[1],
            ts[2],
            ts[3],
            ts[0],
            stream[1],
            stream[2],
            stream[3],
        ]
    }

    /// The tag kind, if the type byte is known.
    pub fn kind(&self) -> Option<TagKind> {
        TagKind::from_type(self.tag_type)
    }

    /// Header plus body size.
    pub fn tag_size(&self) -> u64 {
        TAG_HEADER_SIZE + u64::from(self.body_size)
    }
}

/// First body byte of a video tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTagHeader {
    pub frame_type: u8,
    pub codec_id: u8,
}

impl VideoTagHeader {
    pub fn parse(byte: u8) -> Self {
        Self {
            frame_type: byte >> 4,
            codec_id: byte & 0x0F,
        }
    }

    pub fn is_keyframe(&self) -> bool {
        self.frame_type == FRAME_TYPE_KEYFRAME
    }
}

/// First body byte of an audio tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioTagHeader {
    pub sound_format: u8,
    pub sound_rate: u8,
    pub sound_size: u8,
    pub sound_type: u8,
}

impl AudioTagHeader {
    pub fn parse(byte: u8) -> Self {
        Self {
            sound_format: byte >> 4,
            sound_rate: (byte >> 2) & 0x03,
            sound_size: (byte >> 1) & 0x01,
            sound_type: byte & 0x01,
        }
    }

    /// Nominal sample rate in Hz, as written to `audiosamplerate`.
    pub fn sample_rate(&self) -> f64 {
        match self.sound_rate {
            0 => 5500.0,
            1 => 11000.0,
            2 => 22000.0,
            _ => 44000.0,
        }
    }

    /// Bits per sample.
    pub fn sample_size(&self) -> u8 {
        if self.sound_size == 0 {
            8
        } else {
            16
        }
    }

    pub fn is_stereo(&self) -> bool {
        self.sound_type == 1
    }
}
