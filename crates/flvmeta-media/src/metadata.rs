//! Synthesis of the `onMetaData` record from scan results.
//!
//! The record is built with placeholder values for the fields that depend
//! on its own encoded size (`filesize`, `datasize` and keyframe file
//! positions). AMF0 numbers always encode to nine bytes, so the final values
//! can be patched in afterwards without changing the tag size.

use crate::flv::{FlvHeader, PREV_TAG_SIZE_LEN, TAG_HEADER_SIZE};
use crate::scan::{AudioTrack, StreamInfo, VideoTrack};
use chrono::{DateTime, Utc};
use flvmeta_amf::{AmfValue, Properties};
use tracing::debug;

pub const ON_METADATA: &str = "onMetaData";
pub const ON_LAST_SECOND: &str = "onLastSecond";

/// The marker goes in front of the first tag this close to the end, in
/// milliseconds.
pub const LAST_SECOND_WINDOW_MS: u64 = 1000;

/// Smallest copy buffer handed to the rewriter.
const MIN_COPY_BUFFER: usize = 64 * 1024;

/// Properties owned by the synthesizer. Values supplied by the caller or
/// preserved from the input under these names are overwritten or removed.
const VIDEO_FIELDS: &[&str] = &[
    "lastkeyframetimestamp",
    "width",
    "height",
    "videodatarate",
    "framerate",
    "videosize",
    "videocodecid",
];
const AUDIO_FIELDS: &[&str] = &[
    "audiodatarate",
    "audiosamplerate",
    "audiosamplesize",
    "stereo",
    "audiosize",
    "audiocodecid",
];

/// A script data tag: an AMF string name followed by a value.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataTag {
    pub name: String,
    pub value: AmfValue,
}

impl MetadataTag {
    pub fn new(name: impl Into<String>, value: AmfValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Encoded body size.
    pub fn body_size(&self) -> usize {
        self.name_value().encoded_len() + self.value.encoded_len()
    }

    /// Header, body and trailer.
    pub fn tag_size(&self) -> u64 {
        TAG_HEADER_SIZE + self.body_size() as u64 + PREV_TAG_SIZE_LEN
    }

    pub fn encode_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.body_size());
        self.name_value().encode(&mut body);
        self.value.encode(&mut body);
        body
    }

    fn name_value(&self) -> AmfValue {
        AmfValue::string(self.name.as_str())
    }
}

/// Inputs to the synthesizer besides the scan.
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// Extra properties merged over any preserved ones.
    pub metadata: Option<Properties>,
    pub creator: String,
    pub date: DateTime<Utc>,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            metadata: None,
            creator: default_creator(),
            date: Utc::now(),
        }
    }
}

/// Value of `metadatacreator`.
pub fn default_creator() -> String {
    format!("flvmeta {}", env!("CARGO_PKG_VERSION"))
}

/// Everything the rewriter needs to produce the output.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub header: FlvHeader,
    pub on_metadata: MetadataTag,
    pub on_last_second: MetadataTag,
    /// Input offset of the `onMetaData` tag to replace. When `None` the new
    /// tag is written right after the header.
    pub replaced_offset: Option<u64>,
    /// Input offset of the tag the marker is inserted in front of.
    pub last_second_offset: Option<u64>,
    pub copy_buffer_size: usize,
    pub duration: f64,
    pub filesize: u64,
    pub datasize: u64,
    pub keyframe_count: usize,
    pub tag_count: u64,
}

impl UpdatePlan {
    pub fn inserts_marker(&self) -> bool {
        self.last_second_offset.is_some()
    }
}

/// Build the metadata record and output layout for a scanned stream.
pub fn synthesize(info: StreamInfo, options: SynthesisOptions) -> UpdatePlan {
    let duration_ms = duration_ms(&info);
    let duration = duration_ms as f64 / 1000.0;

    let mut props = info
        .on_metadata
        .as_ref()
        .and_then(|m| m.value.as_ref())
        .and_then(AmfValue::properties)
        .cloned()
        .unwrap_or_default();
    if let Some(extra) = options.metadata {
        props.extend(extra);
    }

    props.set("hasMetadata", true);
    props.set("hasVideo", info.video.is_some());
    props.set("hasAudio", info.audio.is_some());
    props.set("duration", duration);
    props.set("lasttimestamp", f64::from(info.last_timestamp) / 1000.0);

    match &info.video {
        Some(video) => set_video_fields(&mut props, video, &info, duration),
        None => remove_all(&mut props, VIDEO_FIELDS),
    }
    match &info.audio {
        Some(audio) => set_audio_fields(&mut props, audio, duration),
        None => remove_all(&mut props, AUDIO_FIELDS),
    }

    props.set("filesize", 0.0);
    if let Some(video) = &info.video {
        props.set("videosize", video.data_size as f64);
    }
    if let Some(audio) = &info.audio {
        props.set("audiosize", audio.data_size as f64);
    }
    props.set("datasize", 0.0);
    props.set("metadatacreator", options.creator);
    props.set(
        "metadatadate",
        AmfValue::Date {
            millis: options.date.timestamp_millis() as f64,
            timezone: 0,
        },
    );
    if let Some(audio) = &info.audio {
        props.set("audiocodecid", f64::from(audio.codec_id));
    }
    if let Some(video) = &info.video {
        props.set("videocodecid", f64::from(video.codec.id()));
    }

    match (&info.video, &info.audio) {
        (Some(video), Some(audio)) => {
            let delay = i64::from(audio.first_timestamp) - i64::from(video.first_timestamp);
            props.set("audiodelay", delay as f64 / 1000.0);
        }
        _ => {
            props.remove("audiodelay");
        }
    }

    props.set("canSeekToEnd", info.can_seek_to_end);
    props.set("hasCuePoints", false);
    props.set("cuePoints", AmfValue::StrictArray(Vec::new()));
    props.set("hasKeyframes", !info.keyframes.is_empty());

    let mut keyframes = Properties::new();
    keyframes.set(
        "times",
        AmfValue::StrictArray(info.keyframes.iter().map(|k| k.seconds().into()).collect()),
    );
    keyframes.set(
        "filepositions",
        AmfValue::StrictArray(
            info.keyframes
                .iter()
                .map(|k| (k.offset as f64).into())
                .collect(),
        ),
    );
    props.set("keyframes", AmfValue::Object(keyframes));

    let mut on_metadata = MetadataTag::new(ON_METADATA, AmfValue::EcmaArray(props));
    let on_last_second = MetadataTag::new(ON_LAST_SECOND, AmfValue::ecma_array());
    let metadata_size = on_metadata.tag_size();
    let marker_size = on_last_second.tag_size();

    let last_second_offset = if info.has_last_second {
        None
    } else {
        info.marker_candidates
            .iter()
            .find(|c| duration_ms.saturating_sub(u64::from(c.timestamp)) <= LAST_SECOND_WINDOW_MS)
            .map(|c| c.offset)
    };

    let translate = |offset: u64| -> u64 {
        let mut out = match &info.on_metadata {
            None => offset + metadata_size,
            Some(existing) if offset > existing.offset => {
                offset + metadata_size - existing.size
            }
            Some(_) => offset,
        };
        if last_second_offset.is_some_and(|marker| offset >= marker) {
            out += marker_size;
        }
        out
    };

    let video_size = info.video.as_ref().map_or(0, |v| v.data_size);
    let audio_size = info.audio.as_ref().map_or(0, |a| a.data_size);
    let marker_count = u64::from(last_second_offset.is_some());
    let datasize = video_size
        + audio_size
        + info.meta_data_size
        + (metadata_size - PREV_TAG_SIZE_LEN)
        + marker_count * (marker_size - PREV_TAG_SIZE_LEN);
    let filesize = info.header.size()
        + info.total_prev_tags_size
        + PREV_TAG_SIZE_LEN * (1 + marker_count)
        + datasize
        + info.unknown_data_size;

    if let Some(props) = on_metadata.value.properties_mut() {
        props.set("datasize", datasize as f64);
        props.set("filesize", filesize as f64);
        if let Some(positions) = props
            .get_mut("keyframes")
            .and_then(AmfValue::properties_mut)
            .and_then(|kf| kf.get_mut("filepositions"))
            .and_then(AmfValue::as_array_mut)
        {
            for (slot, keyframe) in positions.iter_mut().zip(&info.keyframes) {
                *slot = AmfValue::Number(translate(keyframe.offset) as f64);
            }
        }
    }
    debug_assert_eq!(on_metadata.tag_size(), metadata_size);

    debug!(
        duration,
        filesize,
        datasize,
        marker = ?last_second_offset,
        "Metadata computed"
    );

    UpdatePlan {
        copy_buffer_size: (info.biggest_tag_body_size as usize).max(MIN_COPY_BUFFER),
        replaced_offset: info.on_metadata.as_ref().map(|m| m.offset),
        keyframe_count: info.keyframes.len(),
        tag_count: info.tag_count,
        header: info.header,
        on_metadata,
        on_last_second,
        last_second_offset,
        duration,
        filesize,
        datasize,
    }
}

/// Last timestamp plus one frame of the primary track, audio first.
fn duration_ms(info: &StreamInfo) -> u64 {
    let frame = match (&info.audio, &info.video) {
        (Some(audio), _) => audio.frame_duration,
        (None, Some(video)) => video.frame_duration,
        (None, None) => 0,
    };
    u64::from(info.last_timestamp) + u64::from(frame)
}

fn rate_kbps(bytes: u64, duration: f64) -> f64 {
    if duration > 0.0 {
        bytes as f64 * 8.0 / 1024.0 / duration
    } else {
        0.0
    }
}

fn set_video_fields(props: &mut Properties, video: &VideoTrack, info: &StreamInfo, duration: f64) {
    let last_keyframe = info.last_keyframe().map_or(0.0, |k| k.seconds());
    props.set("lastkeyframetimestamp", last_keyframe);

    match video.resolution.filter(|r| r.width > 0) {
        Some(r) => props.set("width", f64::from(r.width)),
        None => {
            props.remove("width");
        }
    }
    match video.resolution.filter(|r| r.height > 0) {
        Some(r) => props.set("height", f64::from(r.height)),
        None => {
            props.remove("height");
        }
    }

    props.set("videodatarate", rate_kbps(video.payload_size, duration));
    let framerate = if duration > 0.0 {
        video.frame_count as f64 / duration
    } else {
        0.0
    };
    props.set("framerate", framerate);
}

fn set_audio_fields(props: &mut Properties, audio: &AudioTrack, duration: f64) {
    props.set("audiodatarate", rate_kbps(audio.payload_size, duration));
    props.set("audiosamplerate", audio.sample_rate);
    props.set("audiosamplesize", f64::from(audio.sample_size));
    props.set("stereo", audio.stereo);
}

fn remove_all(props: &mut Properties, names: &[&str]) {
    for name in names {
        props.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{scan, ScanOptions};
    use crate::testutil::{av_stream, FlvBuilder};
    use chrono::TimeZone;
    use std::io::Cursor;

    fn options() -> SynthesisOptions {
        SynthesisOptions {
            metadata: None,
            creator: "flvmeta test".to_string(),
            date: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    fn plan_for(bytes: Vec<u8>, scan_options: ScanOptions, opts: SynthesisOptions) -> UpdatePlan {
        let info = scan(Cursor::new(bytes), scan_options).unwrap();
        synthesize(info, opts)
    }

    fn props(plan: &UpdatePlan) -> &Properties {
        plan.on_metadata.value.properties().unwrap()
    }

    fn number(plan: &UpdatePlan, name: &str) -> f64 {
        props(plan).get(name).and_then(AmfValue::as_number).unwrap()
    }

    #[test]
    fn test_duration_uses_audio_frame() {
        let plan = plan_for(av_stream(25, 5).build(), ScanOptions::default(), options());
        // last timestamp 980 + first audio timestamp 20
        assert_eq!(plan.duration, 1.0);
        assert_eq!(number(&plan, "lasttimestamp"), 0.98);
        assert_eq!(number(&plan, "width"), 320.0);
        assert_eq!(number(&plan, "height"), 240.0);
        assert_eq!(number(&plan, "framerate"), 25.0);
        assert_eq!(number(&plan, "audiosamplerate"), 44000.0);
        assert_eq!(number(&plan, "audiodelay"), 0.02);
        assert_eq!(number(&plan, "videocodecid"), 3.0);
    }

    #[test]
    fn test_field_order() {
        let plan = plan_for(av_stream(3, 1).build(), ScanOptions::default(), options());
        let names: Vec<&str> = props(&plan).iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "hasMetadata",
                "hasVideo",
                "hasAudio",
                "duration",
                "lasttimestamp",
                "lastkeyframetimestamp",
                "width",
                "height",
                "videodatarate",
                "framerate",
                "audiodatarate",
                "audiosamplerate",
                "audiosamplesize",
                "stereo",
                "filesize",
                "videosize",
                "audiosize",
                "datasize",
                "metadatacreator",
                "metadatadate",
                "audiocodecid",
                "videocodecid",
                "audiodelay",
                "canSeekToEnd",
                "hasCuePoints",
                "cuePoints",
                "hasKeyframes",
                "keyframes",
            ]
        );
    }

    #[test]
    fn test_audio_only_omits_video_fields() {
        let mut builder = FlvBuilder::new();
        for i in 0..5 {
            builder = builder.audio(i * 26);
        }
        let plan = plan_for(builder.build(), ScanOptions::default(), options());
        let p = props(&plan);
        assert_eq!(p.get("hasVideo"), Some(&AmfValue::Boolean(false)));
        for name in VIDEO_FIELDS.iter().chain(["audiodelay"].iter()) {
            assert!(!p.contains(name), "{name} should be omitted");
        }
        assert_eq!(p.get("hasKeyframes"), Some(&AmfValue::Boolean(false)));
        assert_eq!(plan.duration, 0.13);
    }

    #[test]
    fn test_zero_duration_rates() {
        let bytes = FlvBuilder::new().video(0, true).build();
        let plan = plan_for(bytes, ScanOptions::default(), options());
        assert_eq!(plan.duration, 0.0);
        assert_eq!(number(&plan, "videodatarate"), 0.0);
        assert_eq!(number(&plan, "framerate"), 0.0);
        assert_eq!(
            props(&plan).get("canSeekToEnd"),
            Some(&AmfValue::Boolean(true))
        );
    }

    #[test]
    fn test_sizes_without_existing_metadata() {
        let bytes = av_stream(10, 5).build();
        let input_len = bytes.len() as u64;
        let plan = plan_for(bytes, ScanOptions::default(), options());

        let meta = plan.on_metadata.tag_size();
        let marker = plan.on_last_second.tag_size();
        assert!(plan.inserts_marker());
        assert_eq!(plan.filesize, input_len + meta + marker);
        assert_eq!(number(&plan, "filesize"), plan.filesize as f64);
        assert_eq!(
            plan.datasize,
            10 * (11 + 16) + 10 * (11 + 7) + (meta - 4) + (marker - 4)
        );
    }

    #[test]
    fn test_keyframe_positions_shifted() {
        let bytes = av_stream(10, 5).build();
        let info = scan(Cursor::new(bytes), ScanOptions::default()).unwrap();
        let originals: Vec<u64> = info.keyframes.iter().map(|k| k.offset).collect();
        let plan = synthesize(info, options());
        let shift = plan.on_metadata.tag_size() + plan.on_last_second.tag_size();

        let positions = props(&plan)
            .get("keyframes")
            .and_then(AmfValue::properties)
            .and_then(|k| k.get("filepositions"))
            .and_then(AmfValue::as_array)
            .unwrap();
        for (pos, orig) in positions.iter().zip(&originals) {
            // The stream is shorter than a second, so the marker precedes
            // every keyframe.
            assert_eq!(pos.as_number(), Some((orig + shift) as f64));
        }
    }

    #[test]
    fn test_marker_goes_before_last_second() {
        let plan = plan_for(av_stream(50, 10).build(), ScanOptions::default(), options());
        // duration 2000 ms: first tag at or after 1000 ms is video frame 25.
        let expected = 13 + 25 * (31 + 22);
        assert_eq!(plan.last_second_offset, Some(expected));
    }

    #[test]
    fn test_existing_marker_not_duplicated() {
        let bytes = av_stream(3, 1)
            .script(100, ON_LAST_SECOND, AmfValue::ecma_array())
            .build();
        let plan = plan_for(bytes, ScanOptions::default(), options());
        assert!(!plan.inserts_marker());
    }

    #[test]
    fn test_replacing_existing_metadata() {
        let mut old = Properties::new();
        old.set("title", "clip");
        old.set("duration", 99.0);
        let builder = FlvBuilder::new().script(0, ON_METADATA, AmfValue::EcmaArray(old));
        let existing_size = builder.offset() - 13;
        let bytes = builder.video(0, true).video(40, false).build();
        let input_len = bytes.len() as u64;

        let plan = plan_for(
            bytes,
            ScanOptions {
                preserve_metadata: true,
                ..Default::default()
            },
            options(),
        );
        assert_eq!(plan.replaced_offset, Some(13));
        let p = props(&plan);
        assert_eq!(p.get("title").and_then(AmfValue::as_str), Some("clip"));
        assert_eq!(number(&plan, "duration"), 0.08);
        let names: Vec<&str> = p.iter().map(|(n, _)| n).collect();
        assert_eq!(&names[..2], &["title", "duration"]);

        let marker = plan.on_last_second.tag_size();
        assert_eq!(
            plan.filesize,
            input_len - existing_size + plan.on_metadata.tag_size() + marker
        );
    }

    #[test]
    fn test_caller_metadata_overridden_by_computed() {
        let mut extra = Properties::new();
        extra.set("author", "someone");
        extra.set("duration", 1234.0);
        let opts = SynthesisOptions {
            metadata: Some(extra),
            ..options()
        };
        let plan = plan_for(av_stream(3, 1).build(), ScanOptions::default(), opts);
        let p = props(&plan);
        assert_eq!(p.get("author").and_then(AmfValue::as_str), Some("someone"));
        assert_eq!(number(&plan, "duration"), 0.12);
    }

    #[test]
    fn test_creator_and_date() {
        let plan = plan_for(av_stream(2, 1).build(), ScanOptions::default(), options());
        let p = props(&plan);
        assert_eq!(
            p.get("metadatacreator").and_then(AmfValue::as_str),
            Some("flvmeta test")
        );
        assert_eq!(
            p.get("metadatadate"),
            Some(&AmfValue::Date {
                millis: 1_704_164_645_000.0,
                timezone: 0
            })
        );
        assert!(default_creator().starts_with("flvmeta "));
    }

    #[test]
    fn test_metadata_tag_encoding() {
        let tag = MetadataTag::new(ON_LAST_SECOND, AmfValue::ecma_array());
        let body = tag.encode_body();
        assert_eq!(body.len(), tag.body_size());
        // string marker, u16 length, name, ECMA array marker, count, end marker
        assert_eq!(body.len(), 3 + 12 + 1 + 4 + 3);
        assert_eq!(tag.tag_size(), 11 + 23 + 4);
    }
}
