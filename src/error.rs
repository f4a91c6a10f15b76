// Library error type
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid tag: {0}")]
    InvalidTag(String),
    #[error("invalid audio stream: {0}")]
    InvalidAudio(String),
}

pub type Result<T> = std::result::Result<T, Error>;
