//! Opus bitstream helpers.
//!
//! Stateless functions over individual Opus packets and the two
//! Opus-in-Ogg header packets. Audio content is never decoded.

mod header;
mod toc;

pub use header::*;
pub use toc::*;
