//! First pass over an FLV stream.
//!
//! The scanner reads every tag once, front to back, and collects what the
//! metadata synthesizer needs: per-track statistics, keyframe positions,
//! byte accounting and the location of any existing `onMetaData` tag.

use crate::flv::{
    self, AudioTagHeader, FlvHeader, TagHeader, TagKind, VideoTagHeader, PREV_TAG_SIZE_LEN,
    TAG_HEADER_SIZE,
};
use crate::metadata::{ON_LAST_SECOND, ON_METADATA};
use crate::timestamp::TimestampExtender;
use crate::{Error, Result};
use flvmeta_amf::{decode_slice, AmfValue};
use flvmeta_probe::{decode_resolution, Resolution, VideoCodec};
use std::io::Read;
use tracing::{debug, warn};

/// What to do with tags that are not audio, video or script data, and with
/// audio or video tags without a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorHandling {
    /// Abort on the first invalid tag.
    #[default]
    Strict,
    /// Warn and copy invalid tags through unchanged.
    Tolerant,
    /// Same as tolerant; reserved for repairing damaged streams.
    Fix,
}

impl ErrorHandling {
    fn aborts(self) -> bool {
        self == Self::Strict
    }
}

/// Options controlling the scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    pub error_handling: ErrorHandling,
    /// Decode the value of an existing `onMetaData` tag so its properties
    /// can be carried over.
    pub preserve_metadata: bool,
}

/// Statistics for the video track.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoTrack {
    pub codec: VideoCodec,
    pub resolution: Option<Resolution>,
    pub first_timestamp: u32,
    /// First non-zero effective timestamp, used as the frame duration.
    pub frame_duration: u32,
    pub frame_count: u64,
    /// Header plus body bytes of all video tags.
    pub data_size: u64,
    /// Body bytes excluding the one-byte video tag header.
    pub payload_size: u64,
}

/// Statistics for the audio track.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioTrack {
    pub codec_id: u8,
    pub sample_rate: f64,
    pub sample_size: u8,
    pub stereo: bool,
    pub first_timestamp: u32,
    pub frame_duration: u32,
    pub frame_count: u64,
    pub data_size: u64,
    pub payload_size: u64,
}

/// A video keyframe as found in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyframe {
    /// Effective timestamp in milliseconds.
    pub timestamp: u32,
    /// Offset of the tag in the input file.
    pub offset: u64,
}

impl Keyframe {
    pub fn seconds(&self) -> f64 {
        f64::from(self.timestamp) / 1000.0
    }
}

/// The first `onMetaData` tag of the input, which the rewrite replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ExistingMetadata {
    pub offset: u64,
    /// Header, body and trailer.
    pub size: u64,
    /// Decoded value, present only when metadata preservation is enabled
    /// and the value decoded cleanly.
    pub value: Option<AmfValue>,
}

/// A tag that raised the running maximum timestamp. The `onLastSecond`
/// marker can only be inserted in front of one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerCandidate {
    pub timestamp: u32,
    pub offset: u64,
}

/// Everything the first pass learned about a stream.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub header: FlvHeader,
    pub video: Option<VideoTrack>,
    pub audio: Option<AudioTrack>,
    /// Header plus body bytes of script tags other than the replaced
    /// `onMetaData`.
    pub meta_data_size: u64,
    /// Header, body and trailer bytes of tolerated unknown tags.
    pub unknown_data_size: u64,
    /// Trailer bytes of the leading trailer and every kept known tag.
    pub total_prev_tags_size: u64,
    pub biggest_tag_body_size: u32,
    /// Highest effective timestamp of any known tag.
    pub last_timestamp: u32,
    /// Whether the last video tag was a keyframe.
    pub can_seek_to_end: bool,
    pub keyframes: Vec<Keyframe>,
    pub has_last_second: bool,
    pub on_metadata: Option<ExistingMetadata>,
    pub marker_candidates: Vec<MarkerCandidate>,
    pub tag_count: u64,
}

impl StreamInfo {
    fn new(header: FlvHeader) -> Self {
        Self {
            header,
            video: None,
            audio: None,
            meta_data_size: 0,
            unknown_data_size: 0,
            total_prev_tags_size: PREV_TAG_SIZE_LEN,
            biggest_tag_body_size: 0,
            last_timestamp: 0,
            can_seek_to_end: false,
            keyframes: Vec::new(),
            has_last_second: false,
            on_metadata: None,
            marker_candidates: Vec::new(),
            tag_count: 0,
        }
    }

    pub fn last_keyframe(&self) -> Option<&Keyframe> {
        self.keyframes.last()
    }
}

/// Scan a whole stream positioned at its first byte.
pub fn scan<R: Read>(reader: R, options: ScanOptions) -> Result<StreamInfo> {
    Scanner::new(reader, options).scan()
}

/// Streaming reader for the first pass.
pub struct Scanner<R> {
    reader: R,
    options: ScanOptions,
    offset: u64,
    body: Vec<u8>,
}

impl<R: Read> Scanner<R> {
    pub fn new(reader: R, options: ScanOptions) -> Self {
        Self {
            reader,
            options,
            offset: 0,
            body: Vec::new(),
        }
    }

    pub fn scan(mut self) -> Result<StreamInfo> {
        let header = FlvHeader::read(&mut self.reader)?;
        self.offset = header.size();

        let mut lead = [0u8; PREV_TAG_SIZE_LEN as usize];
        let n = flv::read_full(&mut self.reader, &mut lead)?;
        if n < lead.len() {
            return Err(Error::Truncated {
                offset: self.offset + n as u64,
            });
        }
        self.offset += PREV_TAG_SIZE_LEN;

        let mut info = StreamInfo::new(header);
        let mut extender = TimestampExtender::new();
        let mut running_max: Option<u32> = None;

        while let Some(tag) = TagHeader::read(&mut self.reader, self.offset)? {
            let tag_offset = self.offset;
            self.offset += TAG_HEADER_SIZE;

            let kind = tag.kind();
            let timestamp = extender.extend(kind, tag.timestamp);
            info.tag_count += 1;
            info.biggest_tag_body_size = info.biggest_tag_body_size.max(tag.body_size);

            let consumed = match kind {
                Some(TagKind::Script) => self.scan_script(&tag, tag_offset, &mut info)?,
                Some(TagKind::Video) if tag.body_size > 0 => {
                    self.scan_video(&tag, tag_offset, timestamp, &mut info)?
                }
                Some(TagKind::Audio) if tag.body_size > 0 => {
                    self.scan_audio(&tag, timestamp, &mut info)?
                }
                _ => self.invalid_tag(&tag, tag_offset, &mut info)?,
            };

            if kind.is_some() {
                info.last_timestamp = info.last_timestamp.max(timestamp);
            }

            self.skip_body(u64::from(tag.body_size) - consumed)?;
            self.skip_trailer()?;

            let replaced = info
                .on_metadata
                .as_ref()
                .is_some_and(|m| m.offset == tag_offset);
            if !replaced && running_max.map_or(true, |max| timestamp > max) {
                running_max = Some(timestamp);
                info.marker_candidates.push(MarkerCandidate {
                    timestamp,
                    offset: tag_offset,
                });
            }
        }

        debug!(
            tags = info.tag_count,
            keyframes = info.keyframes.len(),
            last_timestamp = info.last_timestamp,
            "Scan complete"
        );
        Ok(info)
    }

    /// Returns the number of body bytes consumed.
    fn scan_script(&mut self, tag: &TagHeader, offset: u64, info: &mut StreamInfo) -> Result<u64> {
        self.read_body(tag.body_size)?;
        let (name, used) =
            decode_slice(&self.body).map_err(|source| Error::Metadata { offset, source })?;

        let name = name.as_str().map(str::to_owned);
        if name.as_deref() == Some(ON_METADATA) && info.on_metadata.is_none() {
            let value = if self.options.preserve_metadata {
                match decode_slice(&self.body[used..]) {
                    Ok((value, _)) => Some(value),
                    Err(e) => {
                        warn!(offset, error = %e, "Existing onMetaData is unreadable, not preserving it");
                        None
                    }
                }
            } else {
                None
            };
            info.on_metadata = Some(ExistingMetadata {
                offset,
                size: tag.tag_size() + PREV_TAG_SIZE_LEN,
                value,
            });
        } else {
            if name.as_deref() == Some(ON_LAST_SECOND) {
                info.has_last_second = true;
            }
            info.meta_data_size += tag.tag_size();
            info.total_prev_tags_size += PREV_TAG_SIZE_LEN;
        }

        Ok(u64::from(tag.body_size))
    }

    fn scan_video(
        &mut self,
        tag: &TagHeader,
        offset: u64,
        timestamp: u32,
        info: &mut StreamInfo,
    ) -> Result<u64> {
        let mut first = [0u8; 1];
        self.read_exact(&mut first)?;
        let header = VideoTagHeader::parse(first[0]);
        let mut consumed = 1;

        if info.video.is_none() {
            let codec = VideoCodec::from_id(header.codec_id);
            self.read_body(tag.body_size - 1)?;
            consumed += u64::from(tag.body_size - 1);
            let decoded = decode_resolution(codec, &self.body);
            debug!(%codec, resolution = ?decoded.resolution, header_bytes = decoded.consumed, "Video track");
            info.video = Some(VideoTrack {
                codec,
                resolution: decoded.resolution,
                first_timestamp: timestamp,
                frame_duration: 0,
                frame_count: 0,
                data_size: 0,
                payload_size: 0,
            });
        }

        if let Some(track) = info.video.as_mut() {
            if track.frame_duration == 0 && timestamp != 0 {
                track.frame_duration = timestamp;
            }
            track.frame_count += 1;
            track.data_size += tag.tag_size();
            track.payload_size += u64::from(tag.body_size - 1);
        }

        if header.is_keyframe() {
            info.keyframes.push(Keyframe { timestamp, offset });
            info.can_seek_to_end = true;
        } else {
            info.can_seek_to_end = false;
        }
        info.total_prev_tags_size += PREV_TAG_SIZE_LEN;

        Ok(consumed)
    }

    fn scan_audio(&mut self, tag: &TagHeader, timestamp: u32, info: &mut StreamInfo) -> Result<u64> {
        let mut first = [0u8; 1];
        self.read_exact(&mut first)?;

        let track = info.audio.get_or_insert_with(|| {
            let header = AudioTagHeader::parse(first[0]);
            AudioTrack {
                codec_id: header.sound_format,
                sample_rate: header.sample_rate(),
                sample_size: header.sample_size(),
                stereo: header.is_stereo(),
                first_timestamp: timestamp,
                frame_duration: 0,
                frame_count: 0,
                data_size: 0,
                payload_size: 0,
            }
        });

        if track.frame_duration == 0 && timestamp != 0 {
            track.frame_duration = timestamp;
        }
        track.frame_count += 1;
        track.data_size += tag.tag_size();
        track.payload_size += u64::from(tag.body_size - 1);
        info.total_prev_tags_size += PREV_TAG_SIZE_LEN;

        Ok(1)
    }

    fn invalid_tag(&mut self, tag: &TagHeader, offset: u64, info: &mut StreamInfo) -> Result<u64> {
        if self.options.error_handling.aborts() {
            return Err(Error::InvalidTag {
                kind: tag.tag_type,
                offset,
            });
        }
        warn!(
            tag_type = tag.tag_type,
            body_size = tag.body_size,
            offset,
            "Invalid tag, copying it unchanged"
        );
        info.unknown_data_size += tag.tag_size() + PREV_TAG_SIZE_LEN;
        Ok(0)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.reader
            .read_exact(buf)
            .map_err(|e| Error::from_read(e, self.offset))?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    fn read_body(&mut self, len: u32) -> Result<()> {
        self.body.resize(len as usize, 0);
        let n = flv::read_full(&mut self.reader, &mut self.body)?;
        if n < self.body.len() {
            return Err(Error::Truncated {
                offset: self.offset + n as u64,
            });
        }
        self.offset += n as u64;
        Ok(())
    }

    fn skip_body(&mut self, len: u64) -> Result<()> {
        let skipped = flv::skip(&mut self.reader, len)?;
        self.offset += skipped;
        if skipped < len {
            return Err(Error::Truncated {
                offset: self.offset,
            });
        }
        Ok(())
    }

    /// A missing trailer at the very end of the file is tolerated.
    fn skip_trailer(&mut self) -> Result<()> {
        self.offset += flv::skip(&mut self.reader, PREV_TAG_SIZE_LEN)?;
        Ok(())
    }
}
