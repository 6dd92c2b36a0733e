//! The host entity contract.

use poly_core::{Rule, Value};

/// A record that owns translated attributes.
///
/// Type-level facts (primary key, declared rules) are associated functions so
/// they can be checked once, when translation support is attached.
pub trait HostEntity {
    /// Primary key field names. Exactly one is required.
    fn primary_key() -> &'static [&'static str];

    /// Validation rules declared on the host's own attributes.
    fn rules() -> Vec<Rule>;

    /// Whether `name` is one of the host's own stored attributes.
    fn has_attribute(&self, name: &str) -> bool;

    fn attribute(&self, name: &str) -> Option<Value>;

    fn set_attribute(&mut self, name: &str, value: Value);

    /// Set a value read from storage. The attribute is clean afterwards.
    fn populate_attribute(&mut self, name: &str, value: Value) {
        self.set_attribute(name, value);
    }

    fn is_new_record(&self) -> bool;

    /// Called by the store after the host row was written.
    fn mark_persisted(&mut self) {}

    /// Value of the single primary key field, if set.
    fn primary_key_value(&self) -> Option<Value> {
        let field = Self::primary_key().first()?;
        self.attribute(field).filter(|v| !v.is_null())
    }
}
