//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// No `[models.<name>]` section was configured.
    #[error("No multilingual configuration for model '{name}'")]
    UnknownModel { name: String },
}
