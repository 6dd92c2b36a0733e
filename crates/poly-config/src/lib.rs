//! # poly-config
//!
//! Layered configuration loading for Polyglot using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`POLYGLOT_*` prefix, `__` as separator)
//! 2. Project-level `.polyglot/config.toml`
//! 3. User-level `~/.config/polyglot/config.toml`
//! 4. Built-in defaults
//!
//! # Layout
//!
//! ```toml
//! [locale]
//! app_language = "en-US"
//! default_language = "ru"
//!
//! [models.post]
//! attributes = ["title", "body"]
//! languages = { ru = "Russian", en-US = "English" }
//! lang_foreign_key = "post_id"
//! table_name = "postLang"
//! ```
//!
//! Figment maps `POLYGLOT_MODELS__POST__TABLE_NAME` -> `models.post.table_name`.

mod error;
mod locale;
mod model;

pub use error::ConfigError;
pub use locale::LocaleConfig;
pub use model::MultilingualConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolyConfig {
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub models: BTreeMap<String, MultilingualConfig>,
}

impl PolyConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and embedding applications can add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".polyglot/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("POLYGLOT_").split("__"))
    }

    /// Settings for one model.
    pub fn model(&self, name: &str) -> Result<&MultilingualConfig, ConfigError> {
        self.models.get(name).ok_or_else(|| ConfigError::UnknownModel {
            name: name.to_string(),
        })
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("polyglot").join("config.toml"))
    }

    /// Load `.env` walking up from `CARGO_MANIFEST_DIR`, else the current dir.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
