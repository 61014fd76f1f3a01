use thiserror::Error;

/// Transform configuration errors, rejected at construction.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("tiles per side must be at least 1")]
    ZeroTiles,

    #[error("max depth must be positive, got {0}")]
    NonPositiveMaxDepth(f32),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, ConfigError>;
