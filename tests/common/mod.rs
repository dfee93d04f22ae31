//! Shared helpers for CLI integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Minimal FLV: screen video at 40 ms intervals, MP3 audio in between.
pub fn sample_flv(frames: u32) -> Vec<u8> {
    let mut bytes = b"FLV\x01\x05\x00\x00\x00\x09\x00\x00\x00\x00".to_vec();
    for i in 0..frames {
        let frame_type: u8 = if i % 10 == 0 { 1 } else { 2 };
        let mut video = vec![(frame_type << 4) | 3, 0x11, 0x40, 0x10, 0xF0];
        video.extend_from_slice(&[0u8; 16]);
        push_tag(&mut bytes, 9, i * 40, &video);
        push_tag(&mut bytes, 8, i * 40 + 20, &[0x2F, 1, 2, 3, 4]);
    }
    bytes
}

pub fn push_tag(bytes: &mut Vec<u8>, tag_type: u8, timestamp: u32, body: &[u8]) {
    let size = (body.len() as u32).to_be_bytes();
    let ts = timestamp.to_be_bytes();
    bytes.push(tag_type);
    bytes.extend_from_slice(&size[1..]);
    bytes.extend_from_slice(&ts[1..]);
    bytes.push(ts[0]);
    bytes.extend_from_slice(&[0, 0, 0]);
    bytes.extend_from_slice(body);
    bytes.extend_from_slice(&(11 + body.len() as u32).to_be_bytes());
}

pub fn write_sample(dir: &Path, name: &str, frames: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, sample_flv(frames)).unwrap();
    path
}

/// Whether `haystack` contains `needle`.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
