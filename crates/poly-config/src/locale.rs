//! Ambient locale settings.

use serde::{Deserialize, Serialize};

fn default_app_language() -> String {
    "en-US".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocaleConfig {
    /// Language the application runs in (e.g., `en-US`).
    #[serde(default = "default_app_language")]
    pub app_language: String,

    /// Application-wide default content language, if different from `app_language`.
    #[serde(default)]
    pub default_language: Option<String>,
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            app_language: default_app_language(),
            default_language: None,
        }
    }
}

impl LocaleConfig {
    /// Default language for models that do not declare one.
    pub fn ambient_default(&self) -> &str {
        match self.default_language.as_deref() {
            Some(lang) if !lang.is_empty() => lang,
            _ => &self.app_language,
        }
    }
}
