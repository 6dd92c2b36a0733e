//! Validation rules declared by a host.
//!
//! Only the rule *shape* lives here. Deriving per-language rules and running
//! them happens in `poly-db`.

use std::collections::BTreeMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Which validator a rule runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorKind {
    Required,
    /// Accepts any value. Marks an attribute as assignable without checks.
    Safe,
    String,
    Integer,
    Unique,
    Custom(String),
}

impl ValidatorKind {
    /// Parse the conventional validator name; unknown names become `Custom`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "required" => Self::Required,
            "safe" => Self::Safe,
            "string" => Self::String,
            "integer" => Self::Integer,
            "unique" => Self::Unique,
            other => Self::Custom(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Required => "required",
            Self::Safe => "safe",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Unique => "unique",
            Self::Custom(name) => name,
        }
    }
}

impl fmt::Display for ValidatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation rule: one validator applied to a list of attributes.
///
/// `skip_on_empty == None` means the host left it unset and the validator's
/// own default applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    pub attributes: Vec<String>,
    pub kind: ValidatorKind,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_on_empty: Option<bool>,
}

impl Rule {
    pub fn new<I, S>(attributes: I, kind: ValidatorKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attributes: attributes.into_iter().map(Into::into).collect(),
            kind,
            params: BTreeMap::new(),
            skip_on_empty: None,
        }
    }

    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub const fn skip_on_empty(mut self, skip: bool) -> Self {
        self.skip_on_empty = Some(skip);
        self
    }

    /// Same validator and parameters, applied to other attributes.
    #[must_use]
    pub fn retarget(&self, attributes: Vec<String>) -> Self {
        Self {
            attributes,
            ..self.clone()
        }
    }

    /// Whether empty values bypass this rule. `Required` never skips.
    #[must_use]
    pub fn skips_empty(&self) -> bool {
        !matches!(self.kind, ValidatorKind::Required) && self.skip_on_empty.unwrap_or(true)
    }

    #[must_use]
    pub fn applies_to(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|a| a == attribute)
    }
}
