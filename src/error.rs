//! Error types for earshot

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EarshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scene: {0}")]
    MalformedScene(String),

    #[error("Unexpected scene tag: expected {expected:?}, found {found:?}")]
    UnexpectedTag { expected: String, found: String },

    #[error("Animation error: {0}")]
    Animation(String),

    #[error("Waveform codec error: {0}")]
    Codec(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, EarshotError>;
