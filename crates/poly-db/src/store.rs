//! Persistence contracts.
//!
//! The engine never talks to storage directly. Whatever owns the database
//! implements these traits and invokes the lifecycle hooks at the right points.

use poly_core::{TranslationRecord, TranslationSchema, Value};

use crate::error::StoreError;
use crate::host::HostEntity;

/// Host row persistence.
pub trait HostStore<H: HostEntity> {
    /// Hosts matching `key`, or every host when `key` is `None`.
    fn find_hosts(&self, key: Option<&Value>) -> Result<Vec<H>, StoreError>;

    /// Insert a new host. Assigns the primary key if the host has none.
    fn insert_host(&mut self, host: &mut H) -> Result<(), StoreError>;

    fn update_host(&mut self, host: &mut H) -> Result<(), StoreError>;

    /// Number of rows removed.
    fn delete_host(&mut self, key: &Value) -> Result<usize, StoreError>;
}

/// Translation row persistence, one table per schema.
pub trait TranslationStore {
    /// All rows referencing `owner`.
    fn find_translations(
        &self,
        schema: &TranslationSchema,
        owner: &Value,
    ) -> Result<Vec<TranslationRecord>, StoreError>;

    /// The row for `owner` in exactly `language`.
    fn find_translation(
        &self,
        schema: &TranslationSchema,
        owner: &Value,
        language: &str,
    ) -> Result<Option<TranslationRecord>, StoreError>;

    /// Insert when `record.id` is `None` (assigning it), update otherwise.
    fn save_translation(
        &mut self,
        schema: &TranslationSchema,
        record: &mut TranslationRecord,
    ) -> Result<(), StoreError>;

    /// Number of rows removed.
    fn delete_translations(
        &mut self,
        schema: &TranslationSchema,
        owner: &Value,
    ) -> Result<usize, StoreError>;
}

/// Optional transaction support. The defaults describe a store without it.
pub trait Transactional {
    fn supports_transactions(&self) -> bool {
        false
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
