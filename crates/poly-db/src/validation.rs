//! Rule evaluation seam and collected validation errors.
//!
//! Rule execution belongs to the host application. `BuiltinRules` covers the
//! validator kinds the engine itself reasons about (`required`, `safe`) plus
//! simple `string`/`integer` checks; anything else passes.

use std::collections::BTreeMap;
use std::fmt;

use poly_core::{Rule, ValidatorKind, Value};

/// Evaluates one rule against one attribute value.
pub trait RuleEngine {
    /// An error message when `value` fails `rule`, `None` when it passes.
    fn check(&self, rule: &Rule, attribute: &str, value: Option<&Value>) -> Option<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinRules;

impl BuiltinRules {
    fn check_string(rule: &Rule, attribute: &str, value: &Value) -> Option<String> {
        let Value::Text(text) = value else {
            return Some(format!("{attribute} must be a string."));
        };
        let len = i64::try_from(text.chars().count()).unwrap_or(i64::MAX);
        if let Some(max) = rule.params.get("max").and_then(Value::as_int) {
            if len > max {
                return Some(format!(
                    "{attribute} should contain at most {max} characters."
                ));
            }
        }
        if let Some(min) = rule.params.get("min").and_then(Value::as_int) {
            if len < min {
                return Some(format!(
                    "{attribute} should contain at least {min} characters."
                ));
            }
        }
        None
    }

    fn check_integer(attribute: &str, value: &Value) -> Option<String> {
        let ok = match value {
            Value::Int(_) => true,
            Value::Text(text) => text.trim().parse::<i64>().is_ok(),
            _ => false,
        };
        (!ok).then(|| format!("{attribute} must be an integer."))
    }
}

impl RuleEngine for BuiltinRules {
    fn check(&self, rule: &Rule, attribute: &str, value: Option<&Value>) -> Option<String> {
        let blank = value.is_none_or(Value::is_blank);
        if rule.kind == ValidatorKind::Required {
            return blank.then(|| format!("{attribute} cannot be blank."));
        }
        if blank && rule.skips_empty() {
            return None;
        }
        let value = value.unwrap_or(&Value::Null);
        match rule.kind {
            ValidatorKind::String => Self::check_string(rule, attribute, value),
            ValidatorKind::Integer => Self::check_integer(attribute, value),
            _ => None,
        }
    }
}

/// Error messages keyed by the attribute name they apply to (`title_en`, `title`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn has(&self, attribute: &str) -> bool {
        self.errors.contains_key(attribute)
    }

    #[must_use]
    pub fn get(&self, attribute: &str) -> &[String] {
        self.errors.get(attribute).map_or(&[], Vec::as_slice)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (attribute, messages) in &self.errors {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{attribute}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Run every rule against every attribute it names.
pub fn validate<F>(engine: &dyn RuleEngine, rules: &[Rule], lookup: F) -> ValidationErrors
where
    F: Fn(&str) -> Option<Value>,
{
    let mut errors = ValidationErrors::default();
    for rule in rules {
        for attribute in &rule.attributes {
            let value = lookup(attribute);
            if let Some(message) = engine.check(rule, attribute, value.as_ref()) {
                errors.add(attribute.as_str(), message);
            }
        }
    }
    errors
}
