//! Per-model multilingual settings.
//!
//! Required fields are optional here so that a missing value surfaces as a
//! `ConfigurationError` when the model is attached, not as a parse failure.

use poly_core::LanguageSource;
use serde::{Deserialize, Serialize};

fn default_language_field() -> String {
    "language".to_string()
}

const fn default_true() -> bool {
    true
}

fn default_excluded_validators() -> Vec<String> {
    vec!["unique".to_string()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MultilingualConfig {
    /// Host attributes stored per language.
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Available languages: a list of codes or a map of code to label.
    #[serde(default)]
    pub languages: LanguageSource,

    /// Default language; falls back to the ambient locale.
    #[serde(default)]
    pub default_language: Option<String>,

    /// Language used by the single-translation relation; falls back to the app language.
    #[serde(default)]
    pub current_language: Option<String>,

    /// Translation column referencing the host's primary key.
    #[serde(default)]
    pub lang_foreign_key: Option<String>,

    /// Translation table or collection name.
    #[serde(default)]
    pub table_name: Option<String>,

    /// Translation column holding the language code.
    #[serde(default = "default_language_field")]
    pub language_field: String,

    /// Prefix of translated value columns, to avoid collisions with host columns.
    #[serde(default)]
    pub localized_prefix: String,

    /// Apply `required` rules to every language, not just the default.
    #[serde(default)]
    pub require_translations: bool,

    /// Overwrite host values with empty translated values on load, and
    /// update existing rows even when nothing was set.
    #[serde(default)]
    pub force_overwrite: bool,

    /// Delete translation rows explicitly when the host is deleted.
    #[serde(default = "default_true")]
    pub force_delete: bool,

    /// Shorten language codes to their first two characters.
    #[serde(default = "default_true")]
    pub abridge: bool,

    /// Validators never copied onto per-language attributes.
    #[serde(default = "default_excluded_validators")]
    pub excluded_validators: Vec<String>,
}

impl Default for MultilingualConfig {
    fn default() -> Self {
        Self {
            attributes: Vec::new(),
            languages: LanguageSource::default(),
            default_language: None,
            current_language: None,
            lang_foreign_key: None,
            table_name: None,
            language_field: default_language_field(),
            localized_prefix: String::new(),
            require_translations: false,
            force_overwrite: false,
            force_delete: default_true(),
            abridge: default_true(),
            excluded_validators: default_excluded_validators(),
        }
    }
}

impl MultilingualConfig {
    pub fn new<A, S>(attributes: A, languages: LanguageSource) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            languages,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    #[must_use]
    pub fn lang_foreign_key(mut self, key: impl Into<String>) -> Self {
        self.lang_foreign_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    #[must_use]
    pub fn current_language(mut self, language: impl Into<String>) -> Self {
        self.current_language = Some(language.into());
        self
    }

    #[must_use]
    pub fn language_field(mut self, field: impl Into<String>) -> Self {
        self.language_field = field.into();
        self
    }

    #[must_use]
    pub fn localized_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.localized_prefix = prefix.into();
        self
    }

    #[must_use]
    pub const fn require_translations(mut self, on: bool) -> Self {
        self.require_translations = on;
        self
    }

    #[must_use]
    pub const fn force_overwrite(mut self, on: bool) -> Self {
        self.force_overwrite = on;
        self
    }

    #[must_use]
    pub const fn force_delete(mut self, on: bool) -> Self {
        self.force_delete = on;
        self
    }

    #[must_use]
    pub const fn abridge(mut self, on: bool) -> Self {
        self.abridge = on;
        self
    }
}
