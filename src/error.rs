use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EcpackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Password required for this operation")]
    PasswordRequired,

    #[error("Invalid window size: {0}. Must be between 1 and 65535")]
    InvalidWindow(usize),

    #[error("Invalid lookahead size: {0}. Must be between 3 and 65535")]
    InvalidLookahead(usize),

    #[error("Invalid container format: {0}")]
    InvalidFormat(String),

    #[error("Truncated container: {0}")]
    Truncated(String),

    #[error("Corrupt token {index}: {reason}")]
    CorruptToken { index: usize, reason: String },

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Source path not accessible: {0}")]
    SourceNotFound(PathBuf),

    #[error("Invalid destination directory: {0}")]
    InvalidDestination(PathBuf),
}

pub type Result<T> = std::result::Result<T, EcpackError>;
