use thiserror::Error;

/// All errors produced by emolens-core.
#[derive(Debug, Error)]
pub enum EmolensError {
    #[error("audio decode error: {0}")]
    Decode(String),

    #[error("spectrogram computation error: {0}")]
    Computation(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("emotion prediction error: {0}")]
    Prediction(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EmolensError>;
