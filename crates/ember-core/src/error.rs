//! Error types for Ember

use thiserror::Error;

/// The main error type for Ember operations
#[derive(Debug, Error)]
pub enum EmberError {
    #[error("Particle pool exhausted: limit of {capacity} records reached")]
    PoolExhausted { capacity: usize },

    #[error("Stale particle handle: {0}")]
    StaleHandle(String),

    #[error("Particle is still linked into an emitter list: {0}")]
    ParticleStillLinked(String),

    #[error("Emitter index {index} is out of bounds (emitter count {count})")]
    InvalidEmitterIndex { index: usize, count: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Ember operations
pub type Result<T> = std::result::Result<T, EmberError>;

impl From<toml::de::Error> for EmberError {
    fn from(err: toml::de::Error) -> Self {
        EmberError::TomlParseError(err.to_string())
    }
}
