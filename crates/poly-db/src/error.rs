//! Error types for poly-db.

use std::fmt;

use poly_core::ConfigurationError;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// Errors raised by a host or translation store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The row to update does not exist.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Catch-all for backend failures.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Which write or read failed during a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteStage {
    Host,
    Translation { language: String },
    Cascade,
    Load,
    Transaction,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => f.write_str("host"),
            Self::Translation { language } => write!(f, "translation '{language}'"),
            Self::Cascade => f.write_str("translation cascade"),
            Self::Load => f.write_str("load"),
            Self::Transaction => f.write_str("transaction"),
        }
    }
}

/// Errors from loading, validating, and saving translated hosts.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// One or more rules failed; nothing was written.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Write to a name that is neither a host attribute nor a qualified name.
    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    /// Translations were written before the host had a primary key value.
    #[error("Host has no primary key value")]
    MissingPrimaryKey,

    /// A store call failed. `rolled_back == false` means earlier writes of
    /// the same operation may have been kept.
    #[error("{stage} failed (rolled back: {rolled_back}): {source}")]
    Persistence {
        stage: WriteStage,
        rolled_back: bool,
        #[source]
        source: StoreError,
    },
}

impl SyncError {
    pub(crate) fn persistence(stage: WriteStage, source: StoreError) -> Self {
        Self::Persistence {
            stage,
            rolled_back: false,
            source,
        }
    }

    /// Mark a persistence failure as rolled back; other errors pass through.
    #[must_use]
    pub fn rolled_back(self) -> Self {
        match self {
            Self::Persistence { stage, source, .. } => Self::Persistence {
                stage,
                rolled_back: true,
                source,
            },
            other => other,
        }
    }

    /// The failing stage, for persistence failures.
    #[must_use]
    pub const fn stage(&self) -> Option<&WriteStage> {
        match self {
            Self::Persistence { stage, .. } => Some(stage),
            _ => None,
        }
    }
}
