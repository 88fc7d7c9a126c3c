//! Ogg page inspection command.

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use giztoy_remux::ogg::{flags, read_pages, Page};
use giztoy_remux::opus::{OpusHead, Toc, OPUS_TAGS_MAGIC};
use giztoy_remux::Remuxer;
use tracing::debug;

use crate::Cli;
use crate::config::load_options;
use crate::output::{read_input, Output, OutputFormat};

/// Prints the pages of an Ogg/Opus stream.
#[derive(Args)]
pub struct InspectCommand {
    /// Input file (Ogg, or WebM to remux first), "-" for stdin
    input: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Report file (default: stdout)
    #[arg(short = 'o', long)]
    output: Option<String>,
}

impl InspectCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let options = load_options(cli.config.as_deref()).context("load options")?;
        let input = read_input(&self.input)?;

        let out = Remuxer::new(options)
            .remux(&input)
            .with_context(|| format!("remux {}", self.input))?;
        let report = StreamReport::new(&out.data, !out.is_pass_through())?;
        debug!(input = %self.input, pages = report.pages.len(), remuxed = report.remuxed, "inspect: read");

        Output::new(OutputFormat::from_json_flag(self.json), self.output.clone()).write(&report)
    }
}

#[derive(Debug, Serialize)]
struct StreamReport {
    /// True when the input was WebM and the pages come from a remux.
    remuxed: bool,
    head: Option<HeadReport>,
    vendor: Option<String>,
    /// TOC of the first audio packet.
    first_packet: Option<String>,
    duration_secs: f64,
    pages: Vec<PageReport>,
}

#[derive(Debug, Serialize)]
struct HeadReport {
    version: u8,
    channels: u8,
    pre_skip: u16,
    input_sample_rate: u32,
    output_gain: i16,
    mapping_family: u8,
}

impl From<OpusHead> for HeadReport {
    fn from(head: OpusHead) -> Self {
        Self {
            version: head.version,
            channels: head.channels,
            pre_skip: head.pre_skip,
            input_sample_rate: head.input_sample_rate,
            output_gain: head.output_gain,
            mapping_family: head.mapping_family,
        }
    }
}

#[derive(Debug, Serialize)]
struct PageReport {
    sequence: u32,
    flags: Vec<&'static str>,
    granule: u64,
    serial: u32,
    segments: usize,
    packets: usize,
    body_len: usize,
    crc_ok: bool,
}

impl From<&Page> for PageReport {
    fn from(page: &Page) -> Self {
        Self {
            sequence: page.sequence,
            flags: page_flags(page.header_type),
            granule: page.granule_position,
            serial: page.serial,
            segments: page.segment_table.len(),
            packets: page.packets().len(),
            body_len: page.body.len(),
            crc_ok: page.verify_crc(),
        }
    }
}

impl StreamReport {
    fn new(data: &[u8], remuxed: bool) -> anyhow::Result<Self> {
        let pages = read_pages(data).context("read ogg pages")?;

        let head = pages.first().and_then(|p| OpusHead::parse(&p.body));
        let vendor = pages.get(1).and_then(|p| tags_vendor(&p.body));
        let first_packet = pages
            .get(2)
            .and_then(|p| p.packets().first().and_then(|packet| packet.first().copied()))
            .map(|byte| Toc::new(byte).to_string());

        let pre_skip = head.map_or(0, |h| h.pre_skip as u64);
        let granule = pages.last().map_or(0, |p| p.granule_position);
        let duration_secs = granule.saturating_sub(pre_skip) as f64 / 48000.0;

        Ok(Self {
            remuxed,
            head: head.map(HeadReport::from),
            vendor,
            first_packet,
            duration_secs,
            pages: pages.iter().map(PageReport::from).collect(),
        })
    }
}

fn page_flags(header_type: u8) -> Vec<&'static str> {
    let mut out = Vec::new();
    if header_type & flags::CONTINUATION != 0 {
        out.push("continuation");
    }
    if header_type & flags::BOS != 0 {
        out.push("bos");
    }
    if header_type & flags::EOS != 0 {
        out.push("eos");
    }
    out
}

/// Vendor string of an OpusTags packet.
fn tags_vendor(body: &[u8]) -> Option<String> {
    if !body.starts_with(OPUS_TAGS_MAGIC) {
        return None;
    }
    let len = u32::from_le_bytes(body.get(8..12)?.try_into().ok()?) as usize;
    let vendor = body.get(12..12usize.checked_add(len)?)?;
    Some(String::from_utf8_lossy(vendor).into_owned())
}
