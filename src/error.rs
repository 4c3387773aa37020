// Fatal error class: everything that ends the session outright.
// Per-transaction bus faults are not errors in this sense, they are
// TxReport values consumed by the error monitor.

use std::path::PathBuf;

/// Error types for the rig
#[derive(Debug, thiserror::Error)]
pub enum RigError {
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
