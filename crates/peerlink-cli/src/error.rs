//! Error handling for the peerlink CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("peerlink core error: {0}")]
    Core(#[from] peerlink_core::PeerlinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out waiting for {0}")]
    Timeout(String),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
