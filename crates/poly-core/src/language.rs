//! Language normalization and the resolved language set.
//!
//! The policy is chosen once when a host is attached:
//!
//! ```text
//! Abridge   en-US -> en        qualified name: title_en
//! Preserve  en-US -> en-US     qualified name: title_en_us
//! ```

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigurationError;

/// How language codes are canonicalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum LanguagePolicy {
    /// Keep only the first two characters of a code.
    Abridge,
    /// Keep the code as given.
    Preserve,
}

impl LanguagePolicy {
    #[must_use]
    pub const fn from_abridge(abridge: bool) -> Self {
        if abridge { Self::Abridge } else { Self::Preserve }
    }

    /// Canonical form of a language code.
    #[must_use]
    pub fn normalize(self, code: &str) -> String {
        match self {
            Self::Abridge => code.chars().take(2).collect(),
            Self::Preserve => code.to_string(),
        }
    }

    /// Suffix used when building a qualified attribute name.
    ///
    /// Preserved codes are lower-cased with `-` mapped to `_` so the
    /// qualified name stays a plain identifier.
    #[must_use]
    pub fn suffix(self, language: &str) -> String {
        match self {
            Self::Abridge => language.to_string(),
            Self::Preserve => language.to_lowercase().replace('-', "_"),
        }
    }

    /// Build `attribute_language` for this policy.
    #[must_use]
    pub fn qualified_name(self, attribute: &str, language: &str) -> String {
        format!("{attribute}_{}", self.suffix(language))
    }
}

/// Raw language configuration before normalization.
///
/// A labelled map contributes only its keys, in the order they were written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum LanguageSource {
    List(Vec<String>),
    Labeled(IndexMap<String, String>),
    Scalar(String),
}

impl Default for LanguageSource {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl LanguageSource {
    fn raw_codes(&self) -> Result<Vec<&str>, ConfigurationError> {
        let codes: Vec<&str> = match self {
            Self::List(list) => list.iter().map(String::as_str).collect(),
            Self::Labeled(map) => map.keys().map(String::as_str).collect(),
            Self::Scalar(value) => {
                return Err(ConfigurationError::InvalidLanguages {
                    value: value.clone(),
                });
            }
        };
        if codes.is_empty() {
            return Err(ConfigurationError::MissingLanguages);
        }
        Ok(codes)
    }
}

impl<S: Into<String>> FromIterator<S> for LanguageSource {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}

/// Ordered, de-duplicated language codes with exactly one default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSet {
    codes: Vec<String>,
    default: String,
    policy: LanguagePolicy,
}

impl LanguageSet {
    /// Normalize and de-duplicate `source`, then pick the default language.
    ///
    /// An empty or missing `default` falls back to `ambient_default`, which is
    /// normalized the same way.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the source is empty or scalar, if
    /// normalization leaves no codes, or if the default is not in the set.
    pub fn resolve(
        source: &LanguageSource,
        default: Option<&str>,
        ambient_default: &str,
        policy: LanguagePolicy,
    ) -> Result<Self, ConfigurationError> {
        let mut codes: Vec<String> = Vec::new();
        for raw in source.raw_codes()? {
            let code = policy.normalize(raw.trim());
            if !code.is_empty() && !codes.contains(&code) {
                codes.push(code);
            }
        }
        if codes.is_empty() {
            return Err(ConfigurationError::EmptyLanguageSet);
        }

        let default = match default {
            Some(d) if !d.is_empty() => policy.normalize(d),
            _ => policy.normalize(ambient_default),
        };
        if !codes.contains(&default) {
            return Err(ConfigurationError::UnknownDefaultLanguage { language: default });
        }

        Ok(Self {
            codes,
            default,
            policy,
        })
    }

    #[must_use]
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    /// Languages other than the default, in declaration order.
    pub fn translations(&self) -> impl Iterator<Item = &str> {
        self.iter().filter(|code| *code != self.default)
    }

    #[must_use]
    pub fn default_language(&self) -> &str {
        &self.default
    }

    #[must_use]
    pub fn is_default(&self, code: &str) -> bool {
        self.default == code
    }

    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    #[must_use]
    pub const fn policy(&self) -> LanguagePolicy {
        self.policy
    }

    #[must_use]
    pub fn normalize(&self, code: &str) -> String {
        self.policy.normalize(code)
    }

    #[must_use]
    pub fn qualified_name(&self, attribute: &str, language: &str) -> String {
        self.policy.qualified_name(attribute, language)
    }
}
