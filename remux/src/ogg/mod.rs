//! Ogg container format.
//!
//! Page construction and read-back as defined in RFC 3533.

mod crc;
mod page;
mod sync;
mod writer;

pub use crc::crc32;
pub use page::*;
pub use sync::*;
pub use writer::create_ogg_page;
