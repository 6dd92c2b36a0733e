use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Column layout of a translation store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TranslationSchema {
    /// Table or collection identifier.
    pub table_name: String,
    /// Column holding the language code.
    pub language_field: String,
    /// Column referencing the host's primary key.
    pub foreign_key: String,
    /// Prefix prepended to every translated value column.
    pub localized_prefix: String,
    /// Translated host attributes, in declaration order.
    pub attributes: Vec<String>,
}

impl TranslationSchema {
    /// Storage column for a translated attribute.
    #[must_use]
    pub fn column(&self, attribute: &str) -> String {
        format!("{}{attribute}", self.localized_prefix)
    }

    /// A fresh, unsaved row for `owner_id` in `language`.
    #[must_use]
    pub fn new_record(&self, owner_id: Value, language: &str) -> TranslationRecord {
        TranslationRecord::new(owner_id, language)
    }
}

/// One row of translated values for a host in one language.
///
/// `values` is keyed by storage column (prefix included). `id` is assigned by
/// the store on first save; `None` marks a row that was never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranslationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub owner_id: Value,
    pub language: String,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl TranslationRecord {
    #[must_use]
    pub fn new(owner_id: Value, language: &str) -> Self {
        Self {
            id: None,
            owner_id,
            language: language.to_string(),
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    /// Value of a storage column, `None` if the column was never written.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value.into());
        self
    }

    /// Render the row with the schema's column names.
    ///
    /// Unwritten value columns come out as `Null`.
    #[must_use]
    pub fn to_row(&self, schema: &TranslationSchema) -> BTreeMap<String, Value> {
        let mut row = BTreeMap::new();
        row.insert(schema.foreign_key.clone(), self.owner_id.clone());
        row.insert(
            schema.language_field.clone(),
            Value::Text(self.language.clone()),
        );
        for attribute in &schema.attributes {
            let column = schema.column(attribute);
            let value = self.values.get(&column).cloned().unwrap_or_default();
            row.insert(column, value);
        }
        row
    }
}
