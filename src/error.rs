use std::path::PathBuf;
use thiserror::Error;

/// Errors from the ambient layer (configuration, event queue).
/// The monitoring core itself never fails: bad telemetry is sanitized, not raised.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The reactor has shut down and dropped its receiver.
    #[error("monitor event queue closed")]
    QueueClosed,

    #[error("monitor event queue full")]
    QueueFull,
}

pub type Result<T> = std::result::Result<T, MonitorError>;
