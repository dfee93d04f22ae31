//! Second pass: stream the input into a new file with updated metadata.

use crate::flv::{
    self, prev_tag_size, TagHeader, TagKind, MAX_BODY_SIZE, PREV_TAG_SIZE_LEN, TAG_HEADER_SIZE,
};
use crate::metadata::{MetadataTag, UpdatePlan};
use crate::timestamp::TimestampExtender;
use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom, Write};
use tracing::debug;

/// Counters from a rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub tags_written: u64,
    pub bytes_written: u64,
    pub marker_inserted: bool,
}

/// Writes the output for an [`UpdatePlan`].
pub struct Rewriter<'a, W> {
    plan: &'a UpdatePlan,
    output: W,
    stats: RewriteStats,
}

impl<'a, W: Write> Rewriter<'a, W> {
    pub fn new(plan: &'a UpdatePlan, output: W) -> Self {
        Self {
            plan,
            output,
            stats: RewriteStats::default(),
        }
    }

    /// Copy every tag of `input`, replacing or inserting `onMetaData` and
    /// inserting `onLastSecond` where the plan says so.
    pub fn rewrite<R: Read + Seek>(mut self, input: &mut R) -> Result<RewriteStats> {
        let plan = self.plan;
        let metadata_body = encode_tag_body(&plan.on_metadata)?;
        let marker_body = encode_tag_body(&plan.on_last_second)?;

        self.put(&plan.header.to_bytes())?;
        self.put(&[0u8; PREV_TAG_SIZE_LEN as usize])?;

        if plan.replaced_offset.is_none() {
            self.put_script_tag(&metadata_body, 0)?;
        }

        let mut offset = plan.header.size() + PREV_TAG_SIZE_LEN;
        input.seek(SeekFrom::Start(offset))?;

        let mut extender = TimestampExtender::new();
        let mut body = Vec::with_capacity(plan.copy_buffer_size);

        while let Some(tag) = TagHeader::read(input, offset)? {
            let timestamp = extender.extend(tag.kind(), tag.timestamp);
            let body_offset = offset + TAG_HEADER_SIZE;

            if Some(offset) == plan.replaced_offset {
                self.put_script_tag(&metadata_body, 0)?;
                let skipped = flv::skip(input, u64::from(tag.body_size))?;
                if skipped < u64::from(tag.body_size) {
                    return Err(Error::Truncated {
                        offset: body_offset + skipped,
                    });
                }
            } else {
                if Some(offset) == plan.last_second_offset {
                    debug!(offset, timestamp, "Inserting onLastSecond");
                    self.put_script_tag(&marker_body, timestamp)?;
                    self.stats.marker_inserted = true;
                }

                body.resize(tag.body_size as usize, 0);
                let n = flv::read_full(input, &mut body)?;
                if n < body.len() {
                    return Err(Error::Truncated {
                        offset: body_offset + n as u64,
                    });
                }
                self.put(&TagHeader { timestamp, ..tag }.to_bytes())?;
                self.put(&body)?;
                self.put(&prev_tag_size(tag.body_size))?;
                self.stats.tags_written += 1;
            }

            let trailer = flv::skip(input, PREV_TAG_SIZE_LEN)?;
            offset = body_offset + u64::from(tag.body_size) + trailer;
        }

        self.output.flush().map_err(Error::Write)?;
        Ok(self.stats)
    }

    fn put_script_tag(&mut self, body: &[u8], timestamp: u32) -> Result<()> {
        let header = TagHeader::new(TagKind::Script, body.len() as u32, timestamp);
        self.put(&header.to_bytes())?;
        self.put(body)?;
        self.put(&prev_tag_size(body.len() as u32))?;
        self.stats.tags_written += 1;
        Ok(())
    }

    fn put(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.write_all(bytes).map_err(Error::Write)?;
        self.stats.bytes_written += bytes.len() as u64;
        Ok(())
    }
}

/// Rewrite `input` into `output` following `plan`.
pub fn rewrite<R, W>(input: &mut R, output: W, plan: &UpdatePlan) -> Result<RewriteStats>
where
    R: Read + Seek,
    W: Write,
{
    Rewriter::new(plan, output).rewrite(input)
}

fn encode_tag_body(tag: &MetadataTag) -> Result<Vec<u8>> {
    let body = tag.encode_body();
    if body.len() > MAX_BODY_SIZE as usize {
        return Err(Error::TagTooLarge(body.len()));
    }
    Ok(body)
}
