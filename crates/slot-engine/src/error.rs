//! Error types for slot-engine operations.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Malformed calendar document: {0}")]
    Parse(String),

    #[error("Slot unavailable: {hour} on {date} is not free")]
    SlotUnavailable { date: String, hour: String },

    #[error("Ambiguous cancellation on {date}: {matches} bookings match")]
    AmbiguousCancellation { date: String, matches: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Coarse failure category for callers that branch on the kind of failure
/// (e.g. an agent deciding whether to re-prompt the user).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Parse,
    SlotUnavailable,
    AmbiguousCancellation,
    InvalidArgument,
    Storage,
}

impl SlotError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SlotError::Parse(_) => ErrorKind::Parse,
            SlotError::SlotUnavailable { .. } => ErrorKind::SlotUnavailable,
            SlotError::AmbiguousCancellation { .. } => ErrorKind::AmbiguousCancellation,
            SlotError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            SlotError::Io { .. } => ErrorKind::Storage,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SlotError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SlotError>;
