use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobSearchError>;

#[derive(Error, Debug)]
pub enum JobSearchError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Metadata file {path} is not valid: {source}")]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Index file {path} could not be decoded: {source}")]
    IndexDecode {
        path: PathBuf,
        source: bincode::Error,
    },
    #[error("Invalid index: {0}")]
    InvalidIndex(String),
    #[error("Vector dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
    },
    #[error("Embedding error: {0}")]
    Embedding(String),
}
