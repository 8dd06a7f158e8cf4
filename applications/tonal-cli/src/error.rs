/// Driver error types
use thiserror::Error;
use tonal_effect::EffectError;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unsupported audio: {0}")]
    UnsupportedAudio(String),

    #[error("Effect rejected {request} with status {status}")]
    Rejected { request: String, status: i32 },

    #[error("Effect error: {0}")]
    Effect(#[from] EffectError),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
