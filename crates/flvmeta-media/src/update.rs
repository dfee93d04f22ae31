//! File-level entry point: scan, synthesize, rewrite.

use crate::metadata::{synthesize, SynthesisOptions};
use crate::rewrite::rewrite;
use crate::scan::{scan, ErrorHandling, ScanOptions};
use crate::{Error, Result};
use flvmeta_amf::Properties;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

/// Options for [`update_metadata`].
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub error_handling: ErrorHandling,
    /// Extra properties for `onMetaData`. Computed fields take precedence.
    pub metadata: Option<Properties>,
    /// Keep the properties of an existing `onMetaData` tag.
    pub preserve_metadata: bool,
}

impl UpdateOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            error_handling: ErrorHandling::default(),
            metadata: None,
            preserve_metadata: false,
        }
    }
}

/// Summary of a completed update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateReport {
    /// Tags found in the input.
    pub tags: u64,
    pub keyframes: usize,
    /// Duration in seconds.
    pub duration: f64,
    pub filesize: u64,
    pub datasize: u64,
    pub bytes_written: u64,
    pub marker_inserted: bool,
    pub replaced_existing: bool,
}

/// Write a copy of `options.input` to `options.output` with a freshly
/// computed `onMetaData` tag and an `onLastSecond` marker.
///
/// The input is never modified. Input and output must be different files.
pub fn update_metadata(options: &UpdateOptions) -> Result<UpdateReport> {
    update_metadata_with(options, SynthesisOptions::default())
}

/// Like [`update_metadata`], with explicit synthesis options. The
/// `metadata` field of `synthesis` is replaced by `options.metadata`.
pub fn update_metadata_with(
    options: &UpdateOptions,
    mut synthesis: SynthesisOptions,
) -> Result<UpdateReport> {
    if is_same_file(&options.input, &options.output) {
        return Err(Error::SameFile(options.output.clone()));
    }

    let file = File::open(&options.input).map_err(|source| Error::OpenRead {
        path: options.input.clone(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    info!("Parsing {}", options.input.display());
    let stream = scan(
        &mut reader,
        ScanOptions {
            error_handling: options.error_handling,
            preserve_metadata: options.preserve_metadata,
        },
    )?;
    info!(
        "Found {} tags, {} keyframes",
        stream.tag_count,
        stream.keyframes.len()
    );

    synthesis.metadata = options.metadata.clone();
    let plan = synthesize(stream, synthesis);

    let out = File::create(&options.output).map_err(|source| Error::OpenWrite {
        path: options.output.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(out);

    info!("Writing {}", options.output.display());
    let stats = rewrite(&mut reader, &mut writer, &plan)?;
    info!(
        "{} written ({} bytes, duration {:.3}s)",
        options.output.display(),
        stats.bytes_written,
        plan.duration
    );

    Ok(UpdateReport {
        tags: plan.tag_count,
        keyframes: plan.keyframe_count,
        duration: plan.duration,
        filesize: plan.filesize,
        datasize: plan.datasize,
        bytes_written: stats.bytes_written,
        marker_inserted: stats.marker_inserted,
        replaced_existing: plan.replaced_offset.is_some(),
    })
}

/// Compare two paths literally and, where both resolve, canonically. The
/// output may not exist yet, in which case its parent is resolved.
fn is_same_file(input: &Path, output: &Path) -> bool {
    if input == output {
        return true;
    }
    match (fs::canonicalize(input), canonical_output(output)) {
        (Ok(a), Some(b)) => a == b,
        _ => false,
    }
}

fn canonical_output(path: &Path) -> Option<PathBuf> {
    if let Ok(p) = fs::canonicalize(path) {
        return Some(p);
    }
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::canonicalize(parent).ok().map(|p| p.join(name))
}
