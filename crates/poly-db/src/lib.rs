//! # poly-db
//!
//! Attribute overlay and translation synchronization for Polyglot hosts.
//!
//! A host record exposes a fixed set of attributes in several languages. The
//! default-language value lives on the host itself; every language's values
//! are stored as one row per language in a translation table. This crate keeps
//! the two in step:
//!
//! - `MultilingualBehavior` validates configuration once per host type and
//!   derives per-language validation rules
//! - `Translated<H>` composes a host with its `AttributeOverlay` and offers
//!   typed `get`/`set` over bare (`title`) and qualified (`title_en`) names
//! - `LifecycleHooks` merges loaded rows and upserts rows after host writes
//! - `Query` selects the eager-loaded relation (`localized()` / `multilingual()`)
//! - `MultilingualService` runs validation and writes inside a transaction
//!
//! Storage stays behind the `HostStore`, `TranslationStore`, and
//! `Transactional` traits. `MemoryStore` implements all three in memory.

pub mod behavior;
pub mod derive;
pub mod error;
pub mod host;
pub mod memory;
pub mod overlay;
pub mod query;
pub mod resolver;
pub mod service;
pub mod store;
pub mod sync;
pub mod translated;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use behavior::MultilingualBehavior;
pub use derive::derive_rules;
pub use error::{StoreError, SyncError, WriteStage};
pub use host::HostEntity;
pub use memory::MemoryStore;
pub use overlay::AttributeOverlay;
pub use query::{EagerLoad, Query};
pub use resolver::{Displaced, Relations, Resolved};
pub use service::MultilingualService;
pub use store::{HostStore, TranslationStore, Transactional};
pub use sync::LifecycleHooks;
pub use translated::Translated;
pub use validation::{BuiltinRules, RuleEngine, ValidationErrors};
