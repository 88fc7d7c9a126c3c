//! WebM tree walker.
//!
//! Descends the known master elements depth-first and collects the few
//! leaves the remuxer needs. Traversal order is document order, which for
//! Cluster/Block elements is also playback order.

use std::fmt;

use tracing::{debug, warn};

use super::ids;
use super::reader::{is_unknown_size, read_element_id, read_float, read_uint, read_vint};

/// ID used as the parent of the top-level span.
pub const ROOT: u32 = 0;
/// Deepest master nesting the walker descends into. WebM needs four levels.
pub const MAX_DEPTH: usize = 64;

/// Why a span walk stopped before reaching its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStop {
    /// The bytes at the cursor are not a valid element ID.
    BadElementId,
    /// The element size vint is invalid or runs past the buffer.
    BadSize,
    /// Master elements nest deeper than [`MAX_DEPTH`].
    TooDeep,
}

impl fmt::Display for SpanStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadElementId => write!(f, "invalid element id"),
            Self::BadSize => write!(f, "invalid element size"),
            Self::TooDeep => write!(f, "elements nested too deep"),
        }
    }
}

/// A span that stopped early. Everything decoded before `offset` is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanIssue {
    /// ID of the element whose children were being walked.
    pub parent: u32,
    /// Byte offset of the undecodable child.
    pub offset: usize,
    pub reason: SpanStop,
}

/// Lacing mode from a block's flags byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lacing {
    None,
    Xiph,
    FixedSize,
    Ebml,
}

impl Lacing {
    fn from_flags(flags: u8) -> Self {
        match (flags >> 1) & 0x03 {
            0 => Self::None,
            1 => Self::Xiph,
            2 => Self::FixedSize,
            _ => Self::Ebml,
        }
    }
}

impl fmt::Display for Lacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Xiph => write!(f, "xiph"),
            Self::FixedSize => write!(f, "fixed-size"),
            Self::Ebml => write!(f, "ebml"),
        }
    }
}

/// Payload of a SimpleBlock or Block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFrame<'a> {
    pub track: u64,
    pub lacing: Lacing,
    /// Everything after the flags byte. Only a single frame when `lacing`
    /// is [`Lacing::None`].
    pub data: &'a [u8],
}

/// Splits a block payload into track number, flags and frame bytes.
///
/// The 16-bit relative timecode is skipped. Returns `None` if the payload
/// is too short to hold the block header.
pub fn extract_block_frame(block: &[u8]) -> Option<BlockFrame<'_>> {
    let (track, len) = read_vint(block, 0)?;
    let flags = *block.get(len + 2)?;
    Some(BlockFrame {
        track,
        lacing: Lacing::from_flags(flags),
        data: &block[len + 3..],
    })
}

/// Kind of a Matroska track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackKind {
    Audio,
    Video,
    #[default]
    Other,
}

/// A track described by a TrackEntry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrackInfo {
    pub number: Option<u64>,
    pub kind: TrackKind,
    pub codec_id: Option<String>,
    track_type: Option<u64>,
}

impl TrackInfo {
    fn classify(&mut self) {
        self.kind = match self.track_type {
            Some(ids::TRACK_TYPE_AUDIO) => TrackKind::Audio,
            Some(ids::TRACK_TYPE_VIDEO) => TrackKind::Video,
            _ => match self.codec_id.as_deref() {
                Some(id) if id == ids::CODEC_ID_OPUS || id.starts_with("A_") => TrackKind::Audio,
                Some(id) if id.starts_with("V_") => TrackKind::Video,
                _ => TrackKind::Other,
            },
        };
    }
}

/// Stream parameters and audio frames found in a WebM buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStreamInfo<'a> {
    pub channels: u32,
    pub sample_rate: f64,
    /// CodecPrivate bytes, verbatim.
    pub codec_private: Option<&'a [u8]>,
    /// Block payloads in document order.
    pub frames: Vec<&'a [u8]>,
    pub tracks: Vec<TrackInfo>,
    /// Number of the first audio track, if the Tracks element named one.
    pub audio_track: Option<u64>,
    /// Blocks that carried a lacing mode and were kept as single frames.
    pub laced_blocks: usize,
    /// Blocks dropped because they belong to another track.
    pub skipped_blocks: usize,
    /// Spans that stopped early, in the order they were found.
    pub issues: Vec<SpanIssue>,
}

impl Default for ParsedStreamInfo<'_> {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 48000.0,
            codec_private: None,
            frames: Vec::new(),
            tracks: Vec::new(),
            audio_track: None,
            laced_blocks: 0,
            skipped_blocks: 0,
            issues: Vec::new(),
        }
    }
}

/// Parses a WebM buffer, keeping only blocks of the resolved audio track.
pub fn parse_webm(buf: &[u8]) -> ParsedStreamInfo<'_> {
    Walker::new(buf).run()
}

/// Recursive descent over `(position, end)` spans of one buffer.
pub struct Walker<'a> {
    buf: &'a [u8],
    filter_audio_track: bool,
    info: ParsedStreamInfo<'a>,
    track: Option<TrackInfo>,
    track_private: Option<&'a [u8]>,
}

impl<'a> Walker<'a> {
    /// Creates a walker with audio-track filtering enabled.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            filter_audio_track: true,
            info: ParsedStreamInfo::default(),
            track: None,
            track_private: None,
        }
    }

    /// Accept blocks of every track when `false`.
    pub fn filter_audio_track(mut self, enabled: bool) -> Self {
        self.filter_audio_track = enabled;
        self
    }

    /// Walks the whole buffer.
    pub fn run(mut self) -> ParsedStreamInfo<'a> {
        if let Err(issue) = self.walk_span(0, self.buf.len(), ROOT, 0) {
            self.record(issue);
        }
        self.info
    }

    fn record(&mut self, issue: SpanIssue) {
        warn!(
            parent = ids::name(issue.parent),
            offset = issue.offset,
            "webm: {}, stopping span early",
            issue.reason
        );
        self.info.issues.push(issue);
    }

    fn walk_span(
        &mut self,
        start: usize,
        end: usize,
        parent: u32,
        depth: usize,
    ) -> Result<(), SpanIssue> {
        let stop = move |offset, reason| SpanIssue {
            parent,
            offset,
            reason,
        };

        let mut pos = start;
        while pos < end {
            let (id, id_len) =
                read_element_id(self.buf, pos).ok_or_else(|| stop(pos, SpanStop::BadElementId))?;
            let (size, size_len) =
                read_vint(self.buf, pos + id_len).ok_or_else(|| stop(pos, SpanStop::BadSize))?;

            let content_start = pos + id_len + size_len;
            // A header straddling the span end leaves nothing readable in it.
            if content_start > end {
                return Err(stop(pos, SpanStop::BadSize));
            }
            let content_end = if is_unknown_size(size, size_len) {
                end
            } else {
                let size = usize::try_from(size).unwrap_or(usize::MAX);
                content_start.saturating_add(size).min(end)
            };

            if ids::is_master(id) {
                if depth >= MAX_DEPTH {
                    return Err(stop(pos, SpanStop::TooDeep));
                }
                self.enter(id);
                if let Err(issue) = self.walk_span(content_start, content_end, id, depth + 1) {
                    self.record(issue);
                }
                self.leave(id);
            } else {
                self.leaf(id, content_start, content_end);
            }

            pos = content_end;
        }
        Ok(())
    }

    fn enter(&mut self, id: u32) {
        if id == ids::TRACK_ENTRY {
            self.track = Some(TrackInfo::default());
            self.track_private = None;
        }
    }

    fn leave(&mut self, id: u32) {
        if id != ids::TRACK_ENTRY {
            return;
        }
        let Some(mut track) = self.track.take() else {
            return;
        };
        track.classify();

        if track.kind == TrackKind::Audio && self.info.audio_track.is_none() {
            if let Some(number) = track.number {
                debug!(track = number, codec = ?track.codec_id, "webm: resolved audio track");
                self.info.audio_track = Some(number);
            }
            if let Some(private) = self.track_private.take() {
                self.info.codec_private = Some(private);
            }
        }
        self.info.tracks.push(track);
    }

    fn leaf(&mut self, id: u32, start: usize, end: usize) {
        let buf: &'a [u8] = self.buf;
        let data = &buf[start..end];
        match id {
            ids::CHANNELS => {
                self.info.channels = u32::try_from(read_uint(data)).unwrap_or(u32::MAX);
            }
            ids::SAMPLING_FREQUENCY => {
                if let Some(rate) = read_float(data) {
                    self.info.sample_rate = rate;
                }
            }
            ids::CODEC_PRIVATE => {
                if self.track.is_some() {
                    self.track_private = Some(data);
                }
                if self.info.audio_track.is_none() {
                    self.info.codec_private = Some(data);
                }
            }
            ids::TRACK_NUMBER => {
                if let Some(track) = self.track.as_mut() {
                    track.number = Some(read_uint(data));
                }
            }
            ids::TRACK_TYPE => {
                if let Some(track) = self.track.as_mut() {
                    track.track_type = Some(read_uint(data));
                }
            }
            ids::CODEC_ID => {
                if let Some(track) = self.track.as_mut() {
                    let codec = String::from_utf8_lossy(data);
                    track.codec_id = Some(codec.trim_end_matches('\0').to_string());
                }
            }
            ids::SIMPLE_BLOCK | ids::BLOCK => self.block(data, start),
            _ => {}
        }
    }

    fn block(&mut self, data: &'a [u8], offset: usize) {
        let Some(frame) = extract_block_frame(data) else {
            return;
        };

        if self.filter_audio_track {
            if let Some(audio) = self.info.audio_track {
                if frame.track != audio {
                    debug!(track = frame.track, offset, "webm: skipping block of non-audio track");
                    self.info.skipped_blocks += 1;
                    return;
                }
            }
        }

        if frame.lacing != Lacing::None {
            warn!(
                lacing = %frame.lacing,
                offset,
                "webm: laced SimpleBlock detected, unsupported"
            );
            self.info.laced_blocks += 1;
        }

        if !frame.data.is_empty() {
            self.info.frames.push(frame.data);
        }
    }
}
