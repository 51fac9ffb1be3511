//! Error types for the inspector crate.

use thiserror::Error;

/// Result type alias for inspector operations.
pub type Result<T> = std::result::Result<T, InspectorError>;

/// Errors that can occur while scheduling inspections.
#[derive(Error, Debug)]
pub enum InspectorError {
    /// Watcher error.
    #[error("watcher error: {0}")]
    Watcher(#[from] autoinspect_watcher::WatcherError),

    /// Unknown inspection profile.
    #[error("unknown inspection profile: {0}")]
    ProfileNotFound(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Inspection engine error.
    #[error("inspection failed: {0}")]
    Inspection(String),
}
