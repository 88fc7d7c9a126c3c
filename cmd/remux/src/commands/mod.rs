//! CLI commands module.

mod convert;
mod inspect;

pub use convert::ConvertCommand;
pub use inspect::InspectCommand;
