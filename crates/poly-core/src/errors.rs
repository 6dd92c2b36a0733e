//! Setup-time error types.
//!
//! A `ConfigurationError` aborts attaching translation support to a host. It is
//! never recovered from. Per-attempt failures (validation, persistence) are
//! defined in `poly-db` where the lifecycle runs.

use thiserror::Error;

/// Fatal configuration problems detected while attaching to a host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No languages were configured, or the list/map was empty.
    #[error("Please specify a non-empty list of available languages")]
    MissingLanguages,

    /// Languages were given as a single scalar instead of a list or map.
    #[error("Languages must be a list or a map of codes, got scalar '{value}'")]
    InvalidLanguages { value: String },

    /// Normalization left nothing usable in the language set.
    #[error("Language set is empty after normalization")]
    EmptyLanguageSet,

    /// The resolved default language is not one of the configured languages.
    #[error("Default language '{language}' is not among the configured languages")]
    UnknownDefaultLanguage { language: String },

    /// No translated attributes were configured.
    #[error("Please specify multilingual attributes")]
    MissingAttributes,

    /// The translation store's foreign key column was not named.
    #[error("Please specify langForeignKey")]
    MissingForeignKey,

    /// The translation store identifier was not given.
    #[error("Please specify the translation table name")]
    MissingTableName,

    /// The host does not expose exactly one primary key field.
    #[error("Host must have a single-column primary key, found {found} field(s)")]
    PrimaryKey { found: usize },
}
