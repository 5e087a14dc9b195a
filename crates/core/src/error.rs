use thiserror::Error;

#[derive(Error, Debug)]
pub enum DonorwatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("{0}")]
    Other(String),
}
