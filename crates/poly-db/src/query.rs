//! Query scopes controlling which translation relation is eagerly loaded.
//!
//! `localized()` and `multilingual()` are mutually exclusive: installing one
//! replaces the other, so the last call wins.

use poly_core::{LanguagePolicy, Value};

use crate::behavior::MultilingualBehavior;

/// Eager-load choice of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EagerLoad {
    /// No translation relation; the current language row is fetched lazily.
    #[default]
    None,
    /// The single row for one language.
    Localized {
        language: Option<String>,
        abridge: Option<bool>,
    },
    /// Every translation row.
    Multilingual,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    key: Option<Value>,
    eager: EagerLoad,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the host with this primary key value.
    #[must_use]
    pub fn key(mut self, key: impl Into<Value>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Eager-load the row for `language`, or for the current language when
    /// `None`. The code is normalized with the host's own policy.
    #[must_use]
    pub fn localized(mut self, language: Option<&str>) -> Self {
        self.eager = EagerLoad::Localized {
            language: language.map(str::to_string),
            abridge: None,
        };
        self
    }

    /// Like `localized`, but `abridge` decides whether the requested code is
    /// cut to two characters.
    #[must_use]
    pub fn localized_with(mut self, language: Option<&str>, abridge: bool) -> Self {
        self.eager = EagerLoad::Localized {
            language: language.map(str::to_string),
            abridge: Some(abridge),
        };
        self
    }

    /// Eager-load every translation row.
    #[must_use]
    pub fn multilingual(mut self) -> Self {
        self.eager = EagerLoad::Multilingual;
        self
    }

    #[must_use]
    pub const fn key_value(&self) -> Option<&Value> {
        self.key.as_ref()
    }

    #[must_use]
    pub const fn eager(&self) -> &EagerLoad {
        &self.eager
    }

    /// Language a `localized` scope resolves to for `behavior`.
    #[must_use]
    pub fn localized_language(&self, behavior: &MultilingualBehavior) -> Option<String> {
        let EagerLoad::Localized { language, abridge } = &self.eager else {
            return None;
        };
        let Some(language) = language.as_deref() else {
            return Some(behavior.current_language().to_string());
        };
        let normalized = match abridge {
            Some(abridge) => LanguagePolicy::from_abridge(*abridge).normalize(language),
            None => behavior.languages().normalize(language),
        };
        Some(normalized)
    }
}
