//! Entity structs for translation storage.
//!
//! The translation row type is declared once and parameterized by a
//! `TranslationSchema` at setup time instead of being generated per host.

mod translation;

pub use translation::{TranslationRecord, TranslationSchema};
