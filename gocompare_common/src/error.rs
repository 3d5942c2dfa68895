use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoCompareError {
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to write report to {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid relative path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to enumerate {}: {message}", .root.display())]
    Enumeration { root: PathBuf, message: String },

    #[error("Comparison cancelled")]
    Cancelled,

    #[error("Comparison worker panicked")]
    WorkerPanicked,
}
