//! # poly-core
//!
//! Core types shared by every Polyglot crate.
//!
//! This crate provides:
//! - `Value`, the attribute value carried by hosts, overlays, and translation rows
//! - `Rule` and `ValidatorKind`, the tagged-variant validation rule
//! - The statically declared translation row (`TranslationRecord`) and its
//!   column layout (`TranslationSchema`)
//! - Language normalization: `LanguagePolicy`, `LanguageSet`, qualified names
//! - `ConfigurationError`, raised once when a host is attached

pub mod entities;
pub mod errors;
pub mod language;
pub mod rules;
pub mod value;

pub use entities::{TranslationRecord, TranslationSchema};
pub use errors::ConfigurationError;
pub use language::{LanguagePolicy, LanguageSet, LanguageSource};
pub use rules::{Rule, ValidatorKind};
pub use value::Value;
