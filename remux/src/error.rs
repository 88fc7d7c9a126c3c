use thiserror::Error;

use crate::ebml::SpanIssue;

/// Errors returned by remux operations.
#[derive(Debug, Error)]
pub enum RemuxError {
    #[error("remux: no Opus frames found in input")]
    NoFramesFound,

    #[error("remux: truncated element {id:#X} at offset {offset}: {reason}")]
    Truncated {
        id: u32,
        offset: usize,
        reason: String,
    },

    #[error("remux: packet of {len} bytes does not fit in a single Ogg page")]
    PacketTooLarge { len: usize },

    #[error("remux: failed to draw stream serial: {0}")]
    Serial(getrandom::Error),
}

impl From<SpanIssue> for RemuxError {
    fn from(issue: SpanIssue) -> Self {
        RemuxError::Truncated {
            id: issue.parent,
            offset: issue.offset,
            reason: issue.reason.to_string(),
        }
    }
}

/// Result type for remux operations.
pub type Result<T> = std::result::Result<T, RemuxError>;
