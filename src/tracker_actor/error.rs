//! Error types for order trackers.

use thiserror::Error;

/// Reasons a tracker stops early.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackerError {
    /// The registry fired (or dropped) the tracker's handle.
    #[error("Tracking cancelled")]
    Cancelled,

    /// The tracker task panicked.
    #[error("Tracker panicked: {0}")]
    Panicked(String),

    /// The tracker task was aborted by the runtime.
    #[error("Tracker aborted")]
    Aborted,
}
