use thiserror::Error;

/// Frame source errors.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("frame source unavailable: {0}")]
    Unavailable(String),

    #[error("capture already running")]
    AlreadyCapturing,

    #[error("capture not running")]
    NotCapturing,
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, SourceError>;
