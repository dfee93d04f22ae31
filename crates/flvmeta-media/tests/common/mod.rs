//! Shared helpers for flvmeta-media integration tests.

#![allow(dead_code)]

use flvmeta_amf::{decode_slice, AmfValue, Properties};

/// Screen video payload declaring 320x240.
pub const SCREEN_320X240: [u8; 4] = [0x11, 0x40, 0x10, 0xF0];

/// Builds FLV byte streams tag by tag.
pub struct FlvBuilder {
    bytes: Vec<u8>,
}

impl FlvBuilder {
    pub fn new() -> Self {
        Self::with_header(0x05, &[])
    }

    pub fn with_header(flags: u8, extra: &[u8]) -> Self {
        let mut bytes = b"FLV\x01".to_vec();
        bytes.push(flags);
        bytes.extend_from_slice(&(9 + extra.len() as u32).to_be_bytes());
        bytes.extend_from_slice(extra);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        Self { bytes }
    }

    pub fn tag(mut self, tag_type: u8, timestamp: u32, body: &[u8]) -> Self {
        let size = (body.len() as u32).to_be_bytes();
        let ts = timestamp.to_be_bytes();
        self.bytes.push(tag_type);
        self.bytes.extend_from_slice(&size[1..]);
        self.bytes.extend_from_slice(&ts[1..]);
        self.bytes.push(ts[0]);
        self.bytes.extend_from_slice(&[0, 0, 0]);
        self.bytes.extend_from_slice(body);
        self.bytes
            .extend_from_slice(&(11 + body.len() as u32).to_be_bytes());
        self
    }

    pub fn video(self, timestamp: u32, keyframe: bool) -> Self {
        let frame_type = if keyframe { 1 } else { 2 };
        let mut body = vec![(frame_type << 4) | 3];
        body.extend_from_slice(&SCREEN_320X240);
        body.extend_from_slice(&[0xAB; 20]);
        self.tag(9, timestamp, &body)
    }

    pub fn audio(self, timestamp: u32) -> Self {
        self.tag(8, timestamp, &[0x2F, 0xFF, 0xFB, 0x90, 0x64, 0x00])
    }

    pub fn script(self, timestamp: u32, name: &str, value: AmfValue) -> Self {
        let mut body = AmfValue::string(name).to_bytes();
        body.extend_from_slice(&value.to_bytes());
        self.tag(18, timestamp, &body)
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// Video every 40 ms with a keyframe every `gop` frames, audio in between.
pub fn av_stream(frames: u32, gop: u32) -> FlvBuilder {
    let mut builder = FlvBuilder::new();
    for i in 0..frames {
        builder = builder.video(i * 40, i % gop == 0).audio(i * 40 + 20);
    }
    builder
}

/// A tag found in an FLV buffer.
#[derive(Debug, Clone)]
pub struct ParsedTag {
    pub offset: u64,
    pub tag_type: u8,
    pub timestamp: u32,
    pub body: Vec<u8>,
    pub trailer: u32,
}

impl ParsedTag {
    pub fn is_video_keyframe(&self) -> bool {
        self.tag_type == 9 && self.body.first().map(|b| b >> 4) == Some(1)
    }

    pub fn script_name(&self) -> Option<String> {
        if self.tag_type != 18 {
            return None;
        }
        decode_slice(&self.body)
            .ok()
            .and_then(|(v, _)| v.as_str().map(str::to_owned))
    }

    pub fn script_value(&self) -> Option<AmfValue> {
        let (_, used) = decode_slice(&self.body).ok()?;
        decode_slice(&self.body[used..]).ok().map(|(v, _)| v)
    }
}

/// Split an FLV buffer into tags.
pub fn parse_tags(bytes: &[u8]) -> Vec<ParsedTag> {
    let data_offset = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) as usize;
    let mut pos = data_offset + 4;
    let mut tags = Vec::new();
    while pos + 11 <= bytes.len() {
        let h = &bytes[pos..pos + 11];
        let size = u32::from_be_bytes([0, h[1], h[2], h[3]]) as usize;
        let timestamp = u32::from_be_bytes([h[7], h[4], h[5], h[6]]);
        let end = pos + 11 + size;
        let trailer = u32::from_be_bytes([
            bytes[end],
            bytes[end + 1],
            bytes[end + 2],
            bytes[end + 3],
        ]);
        tags.push(ParsedTag {
            offset: pos as u64,
            tag_type: h[0],
            timestamp,
            body: bytes[pos + 11..end].to_vec(),
            trailer,
        });
        pos = end + 4;
    }
    tags
}

/// Properties of the `onMetaData` tag of an FLV buffer.
pub fn on_metadata(bytes: &[u8]) -> Properties {
    parse_tags(bytes)
        .iter()
        .find(|t| t.script_name().as_deref() == Some("onMetaData"))
        .and_then(ParsedTag::script_value)
        .and_then(|v| v.properties().cloned())
        .expect("onMetaData present")
}

pub fn number(props: &Properties, name: &str) -> f64 {
    props
        .get(name)
        .and_then(AmfValue::as_number)
        .unwrap_or_else(|| panic!("{name} missing"))
}

pub fn numbers(props: &Properties, object: &str, field: &str) -> Vec<f64> {
    props
        .get(object)
        .and_then(AmfValue::properties)
        .and_then(|p| p.get(field))
        .and_then(AmfValue::as_array)
        .map(|items| items.iter().filter_map(AmfValue::as_number).collect())
        .unwrap_or_default()
}
