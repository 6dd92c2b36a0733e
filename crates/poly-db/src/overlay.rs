//! Instance-scoped store of translated values keyed by qualified name.
//!
//! A bare name (`title`) holds the default-language value; `title_en` holds
//! the English one. The overlay is a view over translation rows and is never
//! persisted itself.

use std::collections::BTreeMap;

use poly_core::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeOverlay {
    values: BTreeMap<String, Value>,
}

impl AttributeOverlay {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// `None` for a name that was never set. A name set to `Null` returns
    /// `Some(&Value::Null)`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
