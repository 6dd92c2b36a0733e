//! In-memory reference store.
//!
//! Implements every persistence contract over plain vectors. Transactions
//! snapshot the tables on `begin` and restore them on `rollback`. A failure can
//! be injected for one language to exercise partial-write handling.

use std::collections::BTreeMap;

use anyhow::anyhow;
use poly_core::{TranslationRecord, TranslationSchema, Value};

use crate::error::StoreError;
use crate::host::HostEntity;
use crate::store::{HostStore, TranslationStore, Transactional};

#[derive(Debug, Clone)]
struct Tables<H> {
    hosts: Vec<H>,
    translations: BTreeMap<String, Vec<TranslationRecord>>,
    next_host_id: i64,
    next_row_id: u64,
}

impl<H> Default for Tables<H> {
    fn default() -> Self {
        Self {
            hosts: Vec::new(),
            translations: BTreeMap::new(),
            next_host_id: 0,
            next_row_id: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryStore<H> {
    tables: Tables<H>,
    snapshot: Option<Tables<H>>,
    transactions: bool,
    fail_language: Option<String>,
}

impl<H> Default for MemoryStore<H> {
    fn default() -> Self {
        Self {
            tables: Tables::default(),
            snapshot: None,
            transactions: true,
            fail_language: None,
        }
    }
}

impl<H> MemoryStore<H> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report no transaction support; every write is kept as it happens.
    #[must_use]
    pub const fn without_transactions(mut self) -> Self {
        self.transactions = false;
        self
    }

    /// Fail every translation write for `language`.
    #[must_use]
    pub fn fail_on_language(mut self, language: impl Into<String>) -> Self {
        self.fail_language = Some(language.into());
        self
    }

    #[must_use]
    pub fn hosts(&self) -> &[H] {
        &self.tables.hosts
    }

    /// Every row of the schema's table.
    #[must_use]
    pub fn rows(&self, schema: &TranslationSchema) -> &[TranslationRecord] {
        self.tables
            .translations
            .get(&schema.table_name)
            .map_or(&[], Vec::as_slice)
    }

    /// Every row of the schema's table keyed by storage column name: foreign
    /// key, language field and prefixed value columns.
    #[must_use]
    pub fn table(&self, schema: &TranslationSchema) -> Vec<BTreeMap<String, Value>> {
        self.rows(schema)
            .iter()
            .map(|row| row.to_row(schema))
            .collect()
    }

    /// Insert a translation row directly, assigning an id if it has none.
    pub fn seed_translation(&mut self, schema: &TranslationSchema, mut record: TranslationRecord) {
        if record.id.is_none() {
            self.tables.next_row_id += 1;
            record.id = Some(self.tables.next_row_id);
        }
        self.table_mut(schema).push(record);
    }

    fn table_mut(&mut self, schema: &TranslationSchema) -> &mut Vec<TranslationRecord> {
        self.tables
            .translations
            .entry(schema.table_name.clone())
            .or_default()
    }
}

impl<H: HostEntity + Clone> HostStore<H> for MemoryStore<H> {
    fn find_hosts(&self, key: Option<&Value>) -> Result<Vec<H>, StoreError> {
        Ok(self
            .tables
            .hosts
            .iter()
            .filter(|host| key.is_none_or(|key| host.primary_key_value().as_ref() == Some(key)))
            .cloned()
            .collect())
    }

    fn insert_host(&mut self, host: &mut H) -> Result<(), StoreError> {
        match host.primary_key_value() {
            Some(Value::Int(id)) => {
                self.tables.next_host_id = self.tables.next_host_id.max(id);
            }
            Some(_) => {}
            None => {
                self.tables.next_host_id += 1;
                let field = H::primary_key()
                    .first()
                    .ok_or_else(|| anyhow!("host type declares no primary key"))?;
                host.set_attribute(field, Value::Int(self.tables.next_host_id));
            }
        }
        host.mark_persisted();
        self.tables.hosts.push(host.clone());
        Ok(())
    }

    fn update_host(&mut self, host: &mut H) -> Result<(), StoreError> {
        let key = host
            .primary_key_value()
            .ok_or_else(|| StoreError::NotFound("host without key".into()))?;
        let slot = self
            .tables
            .hosts
            .iter_mut()
            .find(|stored| stored.primary_key_value().as_ref() == Some(&key))
            .ok_or_else(|| StoreError::NotFound(format!("host {key}")))?;
        host.mark_persisted();
        *slot = host.clone();
        Ok(())
    }

    fn delete_host(&mut self, key: &Value) -> Result<usize, StoreError> {
        let before = self.tables.hosts.len();
        self.tables
            .hosts
            .retain(|host| host.primary_key_value().as_ref() != Some(key));
        Ok(before - self.tables.hosts.len())
    }
}

impl<H> TranslationStore for MemoryStore<H> {
    fn find_translations(
        &self,
        schema: &TranslationSchema,
        owner: &Value,
    ) -> Result<Vec<TranslationRecord>, StoreError> {
        Ok(self
            .rows(schema)
            .iter()
            .filter(|row| &row.owner_id == owner)
            .cloned()
            .collect())
    }

    fn find_translation(
        &self,
        schema: &TranslationSchema,
        owner: &Value,
        language: &str,
    ) -> Result<Option<TranslationRecord>, StoreError> {
        Ok(self
            .rows(schema)
            .iter()
            .find(|row| &row.owner_id == owner && row.language == language)
            .cloned())
    }

    fn save_translation(
        &mut self,
        schema: &TranslationSchema,
        record: &mut TranslationRecord,
    ) -> Result<(), StoreError> {
        if self.fail_language.as_deref() == Some(record.language.as_str()) {
            return Err(anyhow!("injected failure for language '{}'", record.language).into());
        }

        let Some(id) = record.id else {
            self.tables.next_row_id += 1;
            record.id = Some(self.tables.next_row_id);
            tracing::debug!(
                table = %schema.table_name,
                language = %record.language,
                "inserted translation"
            );
            self.table_mut(schema).push(record.clone());
            return Ok(());
        };

        let slot = self
            .table_mut(schema)
            .iter_mut()
            .find(|row| row.id == Some(id))
            .ok_or_else(|| StoreError::NotFound(format!("{} row {id}", schema.table_name)))?;
        *slot = record.clone();
        Ok(())
    }

    fn delete_translations(
        &mut self,
        schema: &TranslationSchema,
        owner: &Value,
    ) -> Result<usize, StoreError> {
        let table = self.table_mut(schema);
        let before = table.len();
        table.retain(|row| &row.owner_id != owner);
        Ok(before - table.len())
    }
}

impl<H: Clone> Transactional for MemoryStore<H> {
    fn supports_transactions(&self) -> bool {
        self.transactions
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        if self.transactions {
            self.snapshot = Some(self.tables.clone());
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let snapshot = self
            .snapshot
            .take()
            .ok_or_else(|| anyhow!("no transaction in progress"))?;
        self.tables = snapshot;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Post, post_behavior};
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_assigns_keys() {
        let mut store = MemoryStore::new();
        let mut first = Post::new();
        let mut second = Post::new();
        store.insert_host(&mut first).unwrap();
        store.insert_host(&mut second).unwrap();
        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert!(!first.is_new_record());
        assert_eq!(store.find_hosts(Some(&Value::Int(2))).unwrap().len(), 1);
    }

    #[test]
    fn rollback_restores_snapshot() {
        let behavior = post_behavior();
        let mut store: MemoryStore<Post> = MemoryStore::new();
        store.seed_translation(
            behavior.schema(),
            TranslationRecord::new(Value::Int(1), "ru").with("title", "T"),
        );

        store.begin().unwrap();
        store
            .delete_translations(behavior.schema(), &Value::Int(1))
            .unwrap();
        assert!(store.rows(behavior.schema()).is_empty());
        store.rollback().unwrap();

        assert_eq!(store.rows(behavior.schema()).len(), 1);
    }

    #[test]
    fn update_of_missing_row_is_not_found() {
        let behavior = post_behavior();
        let mut store: MemoryStore<Post> = MemoryStore::new();
        let mut record = TranslationRecord::new(Value::Int(1), "ru");
        record.id = Some(42);
        let err = store
            .save_translation(behavior.schema(), &mut record)
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
