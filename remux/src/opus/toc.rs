//! Opus TOC (Table of Contents) parsing.
//!
//! Implements RFC 6716 Section 3.1, enough to compute packet durations
//! for Ogg granule positions.

/// Samples assumed for a packet with no TOC byte (20 ms at 48 kHz).
pub const DEFAULT_PACKET_SAMPLES: u32 = 960;

/// TOC byte from an Opus packet header.
///
/// Layout:
/// ```text
///          0 1 2 3 4 5 6 7
///         +-+-+-+-+-+-+-+-+
///         | config  |s| c |
///         +-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toc(pub u8);

impl Toc {
    /// Creates a TOC from a byte.
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    /// Returns the configuration number (0-31).
    pub fn configuration(&self) -> Configuration {
        Configuration((self.0 >> 3) & 0x1F)
    }

    /// Returns true if the TOC indicates stereo audio.
    pub fn is_stereo(&self) -> bool {
        (self.0 & 0b00000100) != 0
    }

    /// Returns the frame count code.
    pub fn frame_code(&self) -> FrameCode {
        FrameCode::from_bits(self.0 & 0b00000011)
    }
}

impl std::fmt::Display for Toc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "config={}, mode={}, bw={}, {}, {}, stereo={}",
            self.configuration().0,
            self.configuration().mode(),
            self.configuration().bandwidth(),
            self.configuration().frame_duration(),
            self.frame_code(),
            self.is_stereo(),
        )
    }
}

/// Opus configuration number (0-31).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration(pub u8);

impl Configuration {
    /// Returns the configuration mode (SILK, CELT, or Hybrid).
    pub fn mode(&self) -> ConfigurationMode {
        match self.0 {
            0..=11 => ConfigurationMode::Silk,
            12..=15 => ConfigurationMode::Hybrid,
            _ => ConfigurationMode::Celt,
        }
    }

    /// Returns the audio bandwidth.
    pub fn bandwidth(&self) -> Bandwidth {
        match self.0 {
            0..=3 => Bandwidth::NB,
            4..=7 => Bandwidth::MB,
            8..=11 => Bandwidth::WB,
            12..=13 => Bandwidth::SWB,
            14..=15 => Bandwidth::FB,
            16..=19 => Bandwidth::NB,
            20..=23 => Bandwidth::WB,
            24..=27 => Bandwidth::SWB,
            _ => Bandwidth::FB,
        }
    }

    /// Returns the duration of a single frame.
    pub fn frame_duration(&self) -> FrameDuration {
        match self.0 {
            16 | 20 | 24 | 28 => FrameDuration::Duration2500us,
            17 | 21 | 25 | 29 => FrameDuration::Duration5ms,
            0 | 4 | 8 | 12 | 14 | 18 | 22 | 26 | 30 => FrameDuration::Duration10ms,
            1 | 5 | 9 | 13 | 15 | 19 | 23 | 27 | 31 => FrameDuration::Duration20ms,
            2 | 6 | 10 => FrameDuration::Duration40ms,
            _ => FrameDuration::Duration60ms,
        }
    }
}

/// Configuration mode (SILK, CELT, or Hybrid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationMode {
    Silk,
    Celt,
    Hybrid,
}

impl std::fmt::Display for ConfigurationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Silk => write!(f, "SILK"),
            Self::Celt => write!(f, "CELT"),
            Self::Hybrid => write!(f, "Hybrid"),
        }
    }
}

/// Audio bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    /// Narrowband (4 kHz audio)
    NB,
    /// Medium-band (6 kHz audio)
    MB,
    /// Wideband (8 kHz audio)
    WB,
    /// Super-wideband (12 kHz audio)
    SWB,
    /// Fullband (20 kHz audio)
    FB,
}

impl std::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NB => write!(f, "NB"),
            Self::MB => write!(f, "MB"),
            Self::WB => write!(f, "WB"),
            Self::SWB => write!(f, "SWB"),
            Self::FB => write!(f, "FB"),
        }
    }
}

/// Frame code indicating number of frames per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCode {
    /// One frame in the packet.
    OneFrame,
    /// Two frames with equal compressed size.
    TwoEqualFrames,
    /// Two frames with different compressed sizes.
    TwoDifferentFrames,
    /// Arbitrary number of frames, counted in the second byte.
    ArbitraryFrames,
}

impl FrameCode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::OneFrame,
            1 => Self::TwoEqualFrames,
            2 => Self::TwoDifferentFrames,
            _ => Self::ArbitraryFrames,
        }
    }
}

impl std::fmt::Display for FrameCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneFrame => write!(f, "one frame"),
            Self::TwoEqualFrames => write!(f, "two equal frames"),
            Self::TwoDifferentFrames => write!(f, "two different frames"),
            Self::ArbitraryFrames => write!(f, "arbitrary frames"),
        }
    }
}

/// Frame duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDuration {
    Duration2500us,
    Duration5ms,
    Duration10ms,
    Duration20ms,
    Duration40ms,
    Duration60ms,
}

impl FrameDuration {
    /// Returns the number of samples in one frame at 48 kHz.
    pub fn samples_48k(&self) -> u32 {
        match self {
            Self::Duration2500us => 120,
            Self::Duration5ms => 240,
            Self::Duration10ms => 480,
            Self::Duration20ms => 960,
            Self::Duration40ms => 1920,
            Self::Duration60ms => 2880,
        }
    }
}

impl std::fmt::Display for FrameDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duration2500us => write!(f, "2.5ms"),
            Self::Duration5ms => write!(f, "5ms"),
            Self::Duration10ms => write!(f, "10ms"),
            Self::Duration20ms => write!(f, "20ms"),
            Self::Duration40ms => write!(f, "40ms"),
            Self::Duration60ms => write!(f, "60ms"),
        }
    }
}

/// Returns the number of 48 kHz samples an Opus packet decodes to.
///
/// An empty packet counts as [`DEFAULT_PACKET_SAMPLES`]. A code 3 packet
/// without its frame count byte counts as one frame.
pub fn opus_packet_samples(packet: &[u8]) -> u32 {
    let Some(&byte) = packet.first() else {
        return DEFAULT_PACKET_SAMPLES;
    };
    let toc = Toc::new(byte);
    let per_frame = toc.configuration().frame_duration().samples_48k();

    let frames = match toc.frame_code() {
        FrameCode::OneFrame => 1,
        FrameCode::TwoEqualFrames | FrameCode::TwoDifferentFrames => 2,
        FrameCode::ArbitraryFrames => packet.get(1).map_or(1, |b| (b & 0b00111111) as u32),
    };
    per_frame * frames
}
