//! Reconstruction of timestamps beyond the 32-bit tag field.
//!
//! Some muxers let the timestamp field wrap. Whenever a tag's raw timestamp
//! is lower than the previous raw timestamp of the same kind, a shared
//! extension counter is incremented and `counter << 24` is added to every
//! following timestamp. Scanning and rewriting run the same extender so both
//! passes agree on effective timestamps.

use crate::flv::TagKind;

#[derive(Debug, Default, Clone)]
pub struct TimestampExtender {
    last_audio: u32,
    last_video: u32,
    last_script: u32,
    extension: u32,
}

impl TimestampExtender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Effective timestamp for the next tag. Tags of unknown kind do not
    /// move the counter but still receive the current extension.
    pub fn extend(&mut self, kind: Option<TagKind>, raw: u32) -> u32 {
        if let Some(kind) = kind {
            let last = match kind {
                TagKind::Audio => &mut self.last_audio,
                TagKind::Video => &mut self.last_video,
                TagKind::Script => &mut self.last_script,
            };
            if raw < *last {
                self.extension = self.extension.wrapping_add(1);
            }
            *last = raw;
        }
        raw.wrapping_add(self.extension << 24)
    }
}
