//! Service layer running lifecycle hooks around host reads and writes.
//!
//! `MultilingualService` owns a store implementing the host, translation, and
//! transaction contracts. Every mutation follows this protocol:
//!
//! 1. Copy default-language values into qualified slots (`on_before_validate`)
//! 2. Validate host and derived rules; refuse to write on any failure
//! 3. Begin transaction (when the store supports it)
//! 4. Write the host row
//! 5. Write or delete translation rows
//! 6. Commit, or roll back on the first failure

use std::marker::PhantomData;
use std::sync::Arc;

use poly_core::Value;

use crate::behavior::MultilingualBehavior;
use crate::error::{StoreError, SyncError, WriteStage};
use crate::host::HostEntity;
use crate::query::{EagerLoad, Query};
use crate::resolver::Relations;
use crate::store::{HostStore, TranslationStore, Transactional};
use crate::sync::LifecycleHooks;
use crate::translated::{Translated, load_error};
use crate::validation::{BuiltinRules, RuleEngine};

pub struct MultilingualService<H, S> {
    behavior: Arc<MultilingualBehavior>,
    store: S,
    engine: Box<dyn RuleEngine>,
    host: PhantomData<fn() -> H>,
}

fn host_error(source: StoreError) -> SyncError {
    SyncError::persistence(WriteStage::Host, source)
}

fn transaction_error(source: StoreError) -> SyncError {
    SyncError::persistence(WriteStage::Transaction, source)
}

impl<H, S> MultilingualService<H, S>
where
    H: HostEntity,
    S: HostStore<H> + TranslationStore + Transactional,
{
    /// Create a service validating with `BuiltinRules`.
    pub fn new(behavior: Arc<MultilingualBehavior>, store: S) -> Self {
        Self {
            behavior,
            store,
            engine: Box::new(BuiltinRules),
            host: PhantomData,
        }
    }

    /// Replace the rule engine.
    #[must_use]
    pub fn with_engine(mut self, engine: impl RuleEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    #[must_use]
    pub fn behavior(&self) -> &Arc<MultilingualBehavior> {
        &self.behavior
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    /// Wrap a new, unsaved host.
    #[must_use]
    pub fn create(&self, host: H) -> Translated<H> {
        Translated::new(host, Arc::clone(&self.behavior))
    }

    /// Hosts matching `query`, with the requested relation merged.
    ///
    /// # Errors
    ///
    /// Returns a `Load` persistence error if a host or translation read fails.
    pub fn find(&self, query: &Query) -> Result<Vec<Translated<H>>, SyncError> {
        let hosts = self
            .store
            .find_hosts(query.key_value())
            .map_err(load_error)?;

        let mut found = Vec::with_capacity(hosts.len());
        for host in hosts {
            let relations = self.eager_relations(&host, query)?;
            let mut item = Translated::from_loaded(host, Arc::clone(&self.behavior), relations);
            item.on_after_load(&self.store)?;
            found.push(item);
        }
        Ok(found)
    }

    /// The host with primary key `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a `Load` persistence error if a read fails.
    pub fn find_one(
        &self,
        key: impl Into<Value>,
        query: &Query,
    ) -> Result<Option<Translated<H>>, SyncError> {
        let query = query.clone().key(key);
        Ok(self.find(&query)?.into_iter().next())
    }

    fn eager_relations(&self, host: &H, query: &Query) -> Result<Relations, SyncError> {
        let Some(owner) = host.primary_key_value() else {
            return Ok(Relations::default());
        };
        let schema = self.behavior.schema();
        match query.eager() {
            EagerLoad::None => Ok(Relations::default()),
            EagerLoad::Multilingual => self
                .store
                .find_translations(schema, &owner)
                .map(Relations::all)
                .map_err(load_error),
            EagerLoad::Localized { .. } => {
                let language = query
                    .localized_language(&self.behavior)
                    .unwrap_or_else(|| self.behavior.current_language().to_string());
                self.store
                    .find_translation(schema, &owner, &language)
                    .map(Relations::single)
                    .map_err(load_error)
            }
        }
    }

    /// Validate and persist the host and its translations. Returns the number
    /// of translation rows written.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` without writing anything, or a
    /// persistence error naming the failed stage. `rolled_back` tells whether
    /// earlier writes of this save were undone.
    pub fn save(&mut self, item: &mut Translated<H>) -> Result<usize, SyncError> {
        item.on_before_validate();
        item.validate(self.engine.as_ref())?;

        let inserting = item.host().is_new_record();
        let written = self.in_transaction(|store| {
            if inserting {
                store.insert_host(item.host_mut()).map_err(host_error)?;
                item.on_after_insert(store)
            } else {
                store.update_host(item.host_mut()).map_err(host_error)?;
                item.on_after_update(store)
            }
        })?;

        tracing::info!(
            table = %self.behavior.schema().table_name,
            inserted = inserting,
            translations = written,
            "saved host"
        );
        Ok(written)
    }

    /// Delete the host and, under `force_delete`, its translations. Returns
    /// the number of translation rows removed.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::MissingPrimaryKey` for an unsaved host, or a
    /// persistence error naming the failed stage.
    pub fn delete(&mut self, item: &mut Translated<H>) -> Result<usize, SyncError> {
        let owner = item.owner_id()?;
        let removed = self.in_transaction(|store| {
            store.delete_host(&owner).map_err(host_error)?;
            item.on_after_delete(store)
        })?;

        tracing::info!(
            table = %self.behavior.schema().table_name,
            owner = %owner,
            translations = removed,
            "deleted host"
        );
        Ok(removed)
    }

    fn in_transaction<T, F>(&mut self, op: F) -> Result<T, SyncError>
    where
        F: FnOnce(&mut S) -> Result<T, SyncError>,
    {
        let transactional = self.store.supports_transactions();
        if transactional {
            self.store.begin().map_err(transaction_error)?;
        }

        let result = op(&mut self.store).and_then(|value| {
            if transactional {
                self.store.commit().map_err(transaction_error)?;
            }
            Ok(value)
        });

        let err = match result {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !transactional {
            tracing::warn!(
                table = %self.behavior.schema().table_name,
                error = %err,
                "write failed without a transaction; earlier writes were kept"
            );
            return Err(err);
        }
        match self.store.rollback() {
            Ok(()) => {
                tracing::warn!(
                    table = %self.behavior.schema().table_name,
                    error = %err,
                    "rolled back"
                );
                Err(err.rolled_back())
            }
            Err(rollback) => {
                tracing::warn!(
                    table = %self.behavior.schema().table_name,
                    error = %err,
                    rollback_error = %rollback,
                    "rollback failed"
                );
                Err(err)
            }
        }
    }
}
