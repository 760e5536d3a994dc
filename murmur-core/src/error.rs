use thiserror::Error;

/// All errors produced by murmur-core.
#[derive(Debug, Error)]
pub enum MurmurError {
    #[error("resource format error: {0}")]
    Format(String),

    #[error("no vocabulary entry for token id {token}")]
    Lookup { token: i32 },

    #[error("inference error: {0}")]
    Inference(String),

    #[error("invalid audio: {0}")]
    InvalidAudio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MurmurError>;
