//! Shared test fixtures for poly-db unit tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use poly_config::{LocaleConfig, MultilingualConfig};
use poly_core::{Rule, ValidatorKind, Value};

use crate::behavior::MultilingualBehavior;
use crate::host::HostEntity;

/// Blog post host with dirty tracking. Translated: `title`, `body`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Post {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub body: Option<String>,
    new_record: bool,
    dirty: BTreeSet<String>,
}

impl Post {
    pub fn new() -> Self {
        Self {
            new_record: true,
            ..Self::default()
        }
    }

    /// A post as read back from storage.
    pub fn stored(id: i64) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    pub fn is_dirty(&self, name: &str) -> bool {
        self.dirty.contains(name)
    }

    fn assign(&mut self, name: &str, value: Value) {
        match name {
            "id" => self.id = value.as_int(),
            "title" => self.title = text(value),
            "body" => self.body = text(value),
            _ => {}
        }
    }
}

fn text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(text) => Some(text),
        other => Some(other.to_string()),
    }
}

impl HostEntity for Post {
    fn primary_key() -> &'static [&'static str] {
        &["id"]
    }

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new(["title", "body"], ValidatorKind::Required),
            Rule::new(["title"], ValidatorKind::String).param("max", 255_i64),
            Rule::new(["title"], ValidatorKind::Unique),
        ]
    }

    fn has_attribute(&self, name: &str) -> bool {
        matches!(name, "id" | "title" | "body")
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id)),
            "title" => Some(Value::from(self.title.clone())),
            "body" => Some(Value::from(self.body.clone())),
            _ => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.assign(name, value);
        self.dirty.insert(name.to_string());
    }

    fn populate_attribute(&mut self, name: &str, value: Value) {
        self.assign(name, value);
        self.dirty.remove(name);
    }

    fn is_new_record(&self) -> bool {
        self.new_record
    }

    fn mark_persisted(&mut self) {
        self.new_record = false;
        self.dirty.clear();
    }
}

/// `ru` default plus `en-US`, foreign key `post_id`, table `postLang`.
pub fn post_config() -> MultilingualConfig {
    MultilingualConfig::new(["title", "body"], ["ru", "en-US"].into_iter().collect())
        .default_language("ru")
        .lang_foreign_key("post_id")
        .table_name("postLang")
}

pub fn post_behavior() -> Arc<MultilingualBehavior> {
    post_behavior_with(|config| config)
}

pub fn post_behavior_with(
    adjust: impl FnOnce(MultilingualConfig) -> MultilingualConfig,
) -> Arc<MultilingualBehavior> {
    MultilingualBehavior::attach::<Post>(&adjust(post_config()), &LocaleConfig::default())
        .expect("post fixture attaches")
}
