//! Lifecycle hooks that keep the overlay and the translation store in step.
//!
//! The persistence layer calls these at fixed points:
//!
//! ```text
//! read host row(s)          -> on_after_load
//! before rules run          -> on_before_validate
//! host row inserted         -> on_after_insert
//! host row updated          -> on_after_update
//! host row deleted          -> on_after_delete
//! ```
//!
//! Translation writes always follow the host write, so the foreign key is
//! known. Each translation write that fails reports its language.

use std::collections::BTreeMap;

use poly_core::{TranslationRecord, Value};

use crate::error::{SyncError, WriteStage};
use crate::host::HostEntity;
use crate::resolver::{Resolved, index_by_language, merge_all, merge_single};
use crate::store::TranslationStore;
use crate::translated::{Translated, load_error};

/// Callbacks a host's persistence layer invokes around its own reads and writes.
pub trait LifecycleHooks {
    /// Merge whichever relation was fetched. When none was, the current
    /// language row is fetched lazily.
    ///
    /// # Errors
    ///
    /// Returns a `Load` persistence error if the lazy fetch fails.
    fn on_after_load(&mut self, store: &dyn TranslationStore) -> Result<(), SyncError>;

    /// Copy host values into the default-language qualified slots.
    ///
    /// If a non-default translation was merged onto the bare names, its
    /// values first move back to their own language's slots and the stored
    /// default-language values return to the host.
    fn on_before_validate(&mut self);

    /// Write translation rows for a freshly inserted host. Returns the number
    /// of rows written.
    ///
    /// # Errors
    ///
    /// Returns `MissingPrimaryKey` or a `Translation` persistence error.
    fn on_after_insert(&mut self, store: &mut dyn TranslationStore) -> Result<usize, SyncError>;

    /// Upsert translation rows for an updated host. Returns the number of rows
    /// written.
    ///
    /// # Errors
    ///
    /// Returns `MissingPrimaryKey`, a `Load` error if existing rows cannot be
    /// read, or a `Translation` persistence error.
    fn on_after_update(&mut self, store: &mut dyn TranslationStore) -> Result<usize, SyncError>;

    /// Remove translation rows of a deleted host when `force_delete` is set.
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns `MissingPrimaryKey` or a `Cascade` persistence error.
    fn on_after_delete(&mut self, store: &mut dyn TranslationStore) -> Result<usize, SyncError>;
}

impl<H: HostEntity> LifecycleHooks for Translated<H> {
    fn on_after_load(&mut self, store: &dyn TranslationStore) -> Result<(), SyncError> {
        match self.relations.resolve() {
            Resolved::All(rows) => {
                merge_all(&self.behavior, &mut self.host, &mut self.overlay, rows);
                self.displaced = None;
                return Ok(());
            }
            Resolved::Single(row) => {
                self.displaced =
                    merge_single(&self.behavior, &mut self.host, &mut self.overlay, row);
                return Ok(());
            }
            Resolved::Unloaded => {}
        }

        let Some(owner) = self.host.primary_key_value() else {
            tracing::debug!(
                table = %self.behavior.schema().table_name,
                "unsaved host, nothing to load"
            );
            return Ok(());
        };
        let language = self.behavior.current_language().to_string();
        tracing::debug!(
            table = %self.behavior.schema().table_name,
            owner = %owner,
            language = %language,
            "lazily fetching current translation"
        );
        let row = store
            .find_translation(self.behavior.schema(), &owner, &language)
            .map_err(load_error)?;
        self.displaced =
            merge_single(&self.behavior, &mut self.host, &mut self.overlay, row.as_ref());
        self.relations.set_translation(row);
        Ok(())
    }

    fn on_before_validate(&mut self) {
        if let Some(displaced) = self.displaced.take() {
            displaced.restore(&self.behavior, &mut self.host, &mut self.overlay);
        }
        let default = self.behavior.languages().default_language();
        for attribute in self.behavior.attributes() {
            if !self.host.has_attribute(attribute) {
                continue;
            }
            let value = self.host.attribute(attribute).unwrap_or_default();
            self.overlay
                .set(self.behavior.qualified_name(attribute, default), value.clone());
            self.overlay.set(attribute.as_str(), value);
        }
    }

    fn on_after_insert(&mut self, store: &mut dyn TranslationStore) -> Result<usize, SyncError> {
        self.save_translations(store, BTreeMap::new())
    }

    fn on_after_update(&mut self, store: &mut dyn TranslationStore) -> Result<usize, SyncError> {
        let fetched;
        let rows: &[TranslationRecord] = if let Some(rows) = self.relations.translations() {
            rows
        } else {
            let owner = self.owner_id()?;
            fetched = store
                .find_translations(self.behavior.schema(), &owner)
                .map_err(load_error)?;
            &fetched
        };
        let existing = index_by_language(&self.behavior, rows)
            .into_iter()
            .map(|(language, row)| (language, row.clone()))
            .collect();
        self.save_translations(store, existing)
    }

    fn on_after_delete(&mut self, store: &mut dyn TranslationStore) -> Result<usize, SyncError> {
        if !self.behavior.force_delete() {
            return Ok(0);
        }
        let owner = self.owner_id()?;
        let removed = store
            .delete_translations(self.behavior.schema(), &owner)
            .map_err(|source| SyncError::persistence(WriteStage::Cascade, source))?;
        tracing::debug!(
            table = %self.behavior.schema().table_name,
            owner = %owner,
            removed,
            "deleted translations"
        );
        self.relations.clear();
        Ok(removed)
    }
}

impl<H: HostEntity> Translated<H> {
    /// Value a translation row receives for `attribute` in `language`.
    fn source_value(&self, attribute: &str, language: &str) -> Option<Value> {
        if self.behavior.languages().is_default(language) && self.host.has_attribute(attribute) {
            return self.host.attribute(attribute);
        }
        let name = if self.behavior.languages().is_default(language) {
            attribute.to_string()
        } else {
            self.behavior.qualified_name(attribute, language)
        };
        self.overlay.get(&name).cloned()
    }

    /// Upsert one row per declared language.
    ///
    /// Only non-null values are written, so an untouched column keeps its
    /// stored value. A new row that received nothing is skipped. Under
    /// `force_overwrite` an existing row's untouched columns are cleared.
    fn save_translations(
        &mut self,
        store: &mut dyn TranslationStore,
        mut existing: BTreeMap<String, TranslationRecord>,
    ) -> Result<usize, SyncError> {
        let owner = self.owner_id()?;
        let schema = self.behavior.schema().clone();
        let mut saved = Vec::new();

        for language in self.behavior.languages().iter() {
            let mut record = existing
                .remove(language)
                .unwrap_or_else(|| schema.new_record(owner.clone(), language));
            record.owner_id = owner.clone();

            let mut written = false;
            for attribute in &schema.attributes {
                let column = schema.column(attribute);
                match self.source_value(attribute, language) {
                    Some(value) if !value.is_null() => {
                        record.set(column, value);
                        written = true;
                    }
                    _ if self.behavior.force_overwrite() && !record.is_new_record() => {
                        record.set(column, Value::Null);
                    }
                    _ => {}
                }
            }

            if record.is_new_record() && !written {
                tracing::debug!(
                    table = %schema.table_name,
                    owner = %owner,
                    language = %language,
                    "skipping empty translation"
                );
                continue;
            }

            if let Err(source) = store.save_translation(&schema, &mut record) {
                tracing::warn!(
                    table = %schema.table_name,
                    owner = %owner,
                    language = %language,
                    error = %source,
                    "translation write failed"
                );
                return Err(SyncError::persistence(
                    WriteStage::Translation {
                        language: language.to_string(),
                    },
                    source,
                ));
            }
            saved.push(record);
        }

        let count = saved.len();
        self.relations.set_translations(saved);
        Ok(count)
    }
}
