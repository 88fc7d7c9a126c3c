//! WebM to Ogg remuxing.
//!
//! Opus packets are copied bit-for-bit from WebM blocks into Ogg pages.
//! Nothing is decoded or re-encoded.

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::config::{ParsePolicy, RemuxOptions};
use crate::ebml::{ParsedStreamInfo, Walker};
use crate::error::{RemuxError, Result};
use crate::ogg::{create_ogg_page, flags, lacing_count, MAX_SEGMENTS, OGG_MAGIC};
use crate::opus::{build_opus_head, build_opus_tags, codec_private_pre_skip, opus_packet_samples};

/// MIME type of the produced stream.
pub const CONTENT_TYPE: &str = "audio/ogg";

/// How the output was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemuxState {
    /// The input already was an Ogg stream and is returned as is.
    PassThrough,
    /// The input was parsed as WebM and paginated into Ogg.
    Done,
}

/// Result of a remux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemuxOutput<'a> {
    /// Ogg bytes. Borrowed from the input on pass-through.
    pub data: Cow<'a, [u8]>,
    pub state: RemuxState,
    /// Pages written, header pages included. Zero on pass-through.
    pub pages: u32,
    /// Granule position of the last page. Zero on pass-through.
    pub granule: u64,
}

impl RemuxOutput<'_> {
    /// Returns the MIME type to store or upload the data with.
    pub fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    /// Returns true if the input was returned unchanged.
    pub fn is_pass_through(&self) -> bool {
        self.state == RemuxState::PassThrough
    }

    /// Detaches the output from the input buffer.
    pub fn into_owned(self) -> RemuxOutput<'static> {
        RemuxOutput {
            data: Cow::Owned(self.data.into_owned()),
            state: self.state,
            pages: self.pages,
            granule: self.granule,
        }
    }
}

/// Remuxes with default options.
pub fn remux(input: &[u8]) -> Result<RemuxOutput<'_>> {
    Remuxer::default().remux(input)
}

/// Converts WebM/Opus buffers into Ogg/Opus buffers.
///
/// A `Remuxer` holds no per-call state and can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct Remuxer {
    options: RemuxOptions,
}

impl Remuxer {
    /// Creates a remuxer with the given options.
    pub fn new(options: RemuxOptions) -> Self {
        Self { options }
    }

    /// Returns the options in use.
    pub fn options(&self) -> &RemuxOptions {
        &self.options
    }

    /// Remuxes `input`.
    ///
    /// Input starting with "OggS" is returned unchanged. Otherwise the
    /// input is parsed as WebM and every audio block becomes one Ogg packet.
    pub fn remux<'a>(&self, input: &'a [u8]) -> Result<RemuxOutput<'a>> {
        if input.starts_with(OGG_MAGIC) {
            debug!(len = input.len(), "remux: input is already Ogg, passing through");
            return Ok(RemuxOutput {
                data: Cow::Borrowed(input),
                state: RemuxState::PassThrough,
                pages: 0,
                granule: 0,
            });
        }

        let info = Walker::new(input)
            .filter_audio_track(self.options.filter_audio_track)
            .run();
        self.check(&info)?;

        let pre_skip = info
            .codec_private
            .and_then(codec_private_pre_skip)
            .unwrap_or(self.options.default_pre_skip);
        let serial = match self.options.serial {
            Some(serial) => serial,
            None => random_serial()?,
        };
        let channels = u8::try_from(info.channels).unwrap_or(u8::MAX);
        // Float to int casts saturate; NaN becomes 0.
        let sample_rate = info.sample_rate as u32;

        debug!(
            channels,
            sample_rate,
            pre_skip,
            serial,
            frames = info.frames.len(),
            "remux: parsed webm"
        );

        let mut out = create_ogg_page(
            flags::BOS,
            0,
            serial,
            0,
            &[build_opus_head(channels, sample_rate, pre_skip)],
        );
        out.extend(create_ogg_page(
            flags::NONE,
            0,
            serial,
            1,
            &[build_opus_tags(&self.options.vendor)],
        ));

        let (pages, granule) = self.paginate(&info.frames, serial, &mut out)?;
        debug!(pages, granule, bytes = out.len(), "remux: done");

        Ok(RemuxOutput {
            data: Cow::Owned(out),
            state: RemuxState::Done,
            pages,
            granule,
        })
    }

    fn check(&self, info: &ParsedStreamInfo<'_>) -> Result<()> {
        if self.options.parse_policy == ParsePolicy::Strict {
            if let Some(&issue) = info.issues.first() {
                return Err(issue.into());
            }
        }
        if info.frames.is_empty() {
            return Err(RemuxError::NoFramesFound);
        }
        Ok(())
    }

    /// Packs frames greedily into pages after the two header pages.
    ///
    /// A packet with more lacing values than the segment limit gets a page
    /// of its own. Returns the total page count and the final granule
    /// position.
    fn paginate(&self, frames: &[&[u8]], serial: u32, out: &mut Vec<u8>) -> Result<(u32, u64)> {
        let packet_limit = self.options.packet_limit();
        let segment_limit = self.options.segment_limit();

        let mut sequence = 2u32;
        let mut granule = 0u64;
        let mut batch: Vec<&[u8]> = Vec::with_capacity(packet_limit);
        let mut segments = 0;

        let mut flush = |batch: &mut Vec<&[u8]>, header_type: u8, granule: u64| {
            trace!(sequence, packets = batch.len(), granule, "remux: page");
            out.extend(create_ogg_page(header_type, granule, serial, sequence, batch.as_slice()));
            sequence += 1;
            batch.clear();
        };

        for &packet in frames {
            let lacing = lacing_count(packet.len());
            if lacing > MAX_SEGMENTS {
                return Err(RemuxError::PacketTooLarge { len: packet.len() });
            }
            if !batch.is_empty() && (batch.len() >= packet_limit || segments + lacing > segment_limit)
            {
                flush(&mut batch, flags::NONE, granule);
                segments = 0;
            }
            batch.push(packet);
            segments += lacing;
            granule += opus_packet_samples(packet) as u64;
        }
        flush(&mut batch, flags::EOS, granule);

        Ok((sequence, granule))
    }
}

fn random_serial() -> Result<u32> {
    let mut buf = [0u8; 4];
    getrandom::fill(&mut buf).map_err(RemuxError::Serial)?;
    Ok(u32::from_le_bytes(buf))
}
