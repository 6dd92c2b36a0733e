//! A host instance composed with its attribute overlay.
//!
//! `Translated<H>` is the typed accessor surface: every read and write of a
//! translated value goes through `get`/`set`, which route bare names to the
//! host and qualified names (`title_en`) to the overlay.

use std::sync::Arc;

use poly_core::{TranslationRecord, Value};

use crate::behavior::MultilingualBehavior;
use crate::error::{StoreError, SyncError, WriteStage};
use crate::host::HostEntity;
use crate::overlay::AttributeOverlay;
use crate::resolver::{Displaced, Relations};
use crate::store::TranslationStore;
use crate::validation::{RuleEngine, validate};

#[derive(Debug, Clone)]
pub struct Translated<H: HostEntity> {
    pub(crate) host: H,
    pub(crate) behavior: Arc<MultilingualBehavior>,
    pub(crate) overlay: AttributeOverlay,
    pub(crate) relations: Relations,
    pub(crate) displaced: Option<Displaced>,
}

impl<H: HostEntity> Translated<H> {
    /// Wrap a host, seeding every qualified and bare name with `Null`.
    #[must_use]
    pub fn new(host: H, behavior: Arc<MultilingualBehavior>) -> Self {
        Self::from_loaded(host, behavior, Relations::default())
    }

    /// Wrap a host read from storage together with whatever relations were
    /// fetched alongside it. Call `on_after_load` to merge them.
    #[must_use]
    pub fn from_loaded(host: H, behavior: Arc<MultilingualBehavior>, relations: Relations) -> Self {
        let mut overlay = AttributeOverlay::new();
        for name in behavior.qualified_names() {
            overlay.set(name, Value::Null);
        }
        for attribute in behavior.attributes() {
            overlay.set(attribute.as_str(), Value::Null);
        }
        Self {
            host,
            behavior,
            overlay,
            relations,
            displaced: None,
        }
    }

    /// Read a host attribute or a qualified name.
    ///
    /// `None` means the name is neither a host attribute nor a registered
    /// qualified name. A registered name that was never given a value reads
    /// as `Some(Value::Null)`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if self.host.has_attribute(name) {
            return self.host.attribute(name);
        }
        self.overlay.get(name).cloned()
    }

    /// Write a host attribute or a qualified name.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::UnknownAttribute` if `name` is neither.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), SyncError> {
        let value = value.into();
        if self.host.has_attribute(name) {
            if self.behavior.is_translated(name) {
                self.overlay.set(name, value.clone());
            }
            self.host.set_attribute(name, value);
            return Ok(());
        }
        if self.behavior.is_overlay_name(name) {
            self.overlay.set(name, value);
            return Ok(());
        }
        Err(SyncError::UnknownAttribute {
            name: name.to_string(),
        })
    }

    /// Write several names, stopping at the first unknown one.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::UnknownAttribute` for the first unknown name.
    pub fn set_attributes<I, S, V>(&mut self, values: I) -> Result<(), SyncError>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in values {
            self.set(name.as_ref(), value)?;
        }
        Ok(())
    }

    /// Run host and derived rules against the current values.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Validation` with every failure keyed by the
    /// attribute or qualified name it applies to.
    pub fn validate(&self, engine: &dyn RuleEngine) -> Result<(), SyncError> {
        let errors = validate(engine, self.behavior.rules(), |name| self.get(name));
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Validation(errors))
        }
    }

    /// Every translation row of this host, from the loaded relation or the store.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::MissingPrimaryKey` for an unsaved host, or a
    /// `Load` persistence error.
    pub fn translations(
        &self,
        store: &dyn TranslationStore,
    ) -> Result<Vec<TranslationRecord>, SyncError> {
        if let Some(rows) = self.relations.translations() {
            return Ok(rows.to_vec());
        }
        let owner = self.owner_id()?;
        store
            .find_translations(self.behavior.schema(), &owner)
            .map_err(load_error)
    }

    /// The row for `language` (current language when `None`).
    ///
    /// A populated single-translation relation answers for the current language.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::MissingPrimaryKey` for an unsaved host, or a
    /// `Load` persistence error.
    pub fn translation(
        &self,
        store: &dyn TranslationStore,
        language: Option<&str>,
    ) -> Result<Option<TranslationRecord>, SyncError> {
        let language = language.map_or_else(
            || self.behavior.current_language().to_string(),
            |lang| self.behavior.languages().normalize(lang),
        );
        if language == self.behavior.current_language() {
            if let Some(row) = self.relations.translation() {
                return Ok(row.cloned());
            }
        }
        let owner = self.owner_id()?;
        store
            .find_translation(self.behavior.schema(), &owner, &language)
            .map_err(load_error)
    }

    pub(crate) fn owner_id(&self) -> Result<Value, SyncError> {
        self.host
            .primary_key_value()
            .ok_or(SyncError::MissingPrimaryKey)
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    #[must_use]
    pub fn behavior(&self) -> &MultilingualBehavior {
        &self.behavior
    }

    #[must_use]
    pub const fn overlay(&self) -> &AttributeOverlay {
        &self.overlay
    }

    #[must_use]
    pub const fn relations(&self) -> &Relations {
        &self.relations
    }

    /// Language shown by the bare names when a single translation in a
    /// non-default language replaced them.
    #[must_use]
    pub fn displayed_language(&self) -> &str {
        self.displaced.as_ref().map_or_else(
            || self.behavior.languages().default_language(),
            Displaced::language,
        )
    }
}

pub(crate) fn load_error(source: StoreError) -> SyncError {
    SyncError::persistence(WriteStage::Load, source)
}
