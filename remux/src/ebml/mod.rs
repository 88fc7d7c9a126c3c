//! EBML (Matroska/WebM) parsing.
//!
//! - `reader`: element ID, vint and leaf payload decoders
//! - `walker`: recursive descent collecting audio parameters and frames

pub mod ids;
mod reader;
mod walker;

pub use reader::*;
pub use walker::*;

#[cfg(test)]
pub(crate) use walker::testutil;
