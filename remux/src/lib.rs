//! WebM to Ogg remuxer for Opus audio.
//!
//! Browser recorders produce WebM/Matroska files; many consumers (voice
//! note APIs, players) only accept Ogg/Opus. This crate moves the Opus
//! packets from one container into the other without touching the audio.
//!
//! - `ebml`: EBML decoding and the WebM tree walker
//! - `opus`: TOC parsing and the OpusHead/OpusTags packets
//! - `ogg`: page writer, CRC and page reader
//! - `remux`: the pipeline tying them together
//!
//! # Example
//!
//! ```rust
//! use giztoy_remux::{remux, RemuxError};
//!
//! // Ogg input passes through untouched
//! let ogg = b"OggS\x00\x02rest of the stream";
//! let out = remux(ogg).unwrap();
//! assert!(out.is_pass_through());
//! assert_eq!(out.content_type(), "audio/ogg");
//!
//! // Input without any Opus frames is rejected
//! assert!(matches!(remux(&[0u8; 32]), Err(RemuxError::NoFramesFound)));
//! ```

pub mod config;
pub mod ebml;
pub mod error;
pub mod ogg;
pub mod opus;
pub mod remux;

pub use config::{ParsePolicy, RemuxOptions};
pub use ebml::{parse_webm, ParsedStreamInfo};
pub use error::{RemuxError, Result};
pub use remux::{remux, RemuxOutput, RemuxState, Remuxer, CONTENT_TYPE};
