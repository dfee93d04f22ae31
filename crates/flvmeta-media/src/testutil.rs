//! Builders for synthetic FLV streams used by unit tests.

use crate::flv::{prev_tag_size, TagHeader, TagKind};
use flvmeta_amf::AmfValue;

/// Screen video keyframe payload declaring 320x240.
pub(crate) const SCREEN_320X240: [u8; 4] = [0x11, 0x40, 0x10, 0xF0];

pub(crate) struct FlvBuilder {
    bytes: Vec<u8>,
}

impl FlvBuilder {
    pub(crate) fn new() -> Self {
        let mut bytes = b"FLV\x01\x05\x00\x00\x00\x09".to_vec();
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        Self { bytes }
    }

    /// Offset the next tag will start at.
    pub(crate) fn offset(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub(crate) fn raw_tag(mut self, tag_type: u8, timestamp: u32, body: &[u8]) -> Self {
        let header = TagHeader {
            tag_type,
            body_size: body.len() as u32,
            timestamp,
            stream_id: 0,
        };
        self.bytes.extend_from_slice(&header.to_bytes());
        self.bytes.extend_from_slice(body);
        self.bytes
            .extend_from_slice(&prev_tag_size(body.len() as u32));
        self
    }

    /// Screen video tag (codec 3).
    pub(crate) fn video(self, timestamp: u32, keyframe: bool) -> Self {
        let frame_type = if keyframe { 1 } else { 2 };
        let mut body = vec![(frame_type << 4) | 3];
        body.extend_from_slice(&SCREEN_320X240);
        body.extend_from_slice(&[0u8; 11]);
        self.raw_tag(TagKind::Video.type_id(), timestamp, &body)
    }

    /// MP3 44 kHz 16-bit stereo audio tag.
    pub(crate) fn audio(self, timestamp: u32) -> Self {
        self.raw_tag(TagKind::Audio.type_id(), timestamp, &[0x2F, 1, 2, 3, 4, 5, 6])
    }

    pub(crate) fn script(self, timestamp: u32, name: &str, value: AmfValue) -> Self {
        let mut body = AmfValue::string(name).to_bytes();
        body.extend_from_slice(&value.to_bytes());
        self.raw_tag(TagKind::Script.type_id(), timestamp, &body)
    }

    pub(crate) fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Interleaved stream: video every 40 ms with a keyframe every `gop`
/// frames, audio every 40 ms offset by 20 ms.
pub(crate) fn av_stream(frames: u32, gop: u32) -> FlvBuilder {
    let mut builder = FlvBuilder::new();
    for i in 0..frames {
        builder = builder.video(i * 40, i % gop == 0).audio(i * 40 + 20);
    }
    builder
}
