use std::path::PathBuf;
use thiserror::Error;
use tonelink_core::ModemError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Modem(#[from] ModemError),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}
