//! Lifecycle integration tests
//!
//! Save/load/delete of a translated host through `MultilingualService` and
//! the in-memory store:
//! - Worked example: partial translation, multilingual reload
//! - Round trip through the all-translations path
//! - Single-translation and all-translations paths agree on the default language
//! - Empty languages are never written; a later value creates exactly one row
//! - Required rules on translations follow `require_translations`
//! - Saving after a non-default single-translation load leaves the default row intact
//! - Prefixed storage columns survive save and both reload paths
//! - Delete cascade follows `force_delete`

use std::collections::BTreeMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;

use poly_config::{LocaleConfig, MultilingualConfig};
use poly_core::{Rule, ValidatorKind, Value};
use poly_db::{
    HostEntity, MemoryStore, MultilingualBehavior, MultilingualService, Query, SyncError,
    TranslationStore,
};

#[derive(Debug, Clone, Default)]
struct Article {
    fields: BTreeMap<String, Value>,
    persisted: bool,
}

impl HostEntity for Article {
    fn primary_key() -> &'static [&'static str] {
        &["id"]
    }

    fn rules() -> Vec<Rule> {
        vec![
            Rule::new(["title", "body"], ValidatorKind::Required),
            Rule::new(["title"], ValidatorKind::String).param("max", 64_i64),
        ]
    }

    fn has_attribute(&self, name: &str) -> bool {
        matches!(name, "id" | "title" | "body")
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.has_attribute(name)
            .then(|| self.fields.get(name).cloned().unwrap_or_default())
    }

    fn set_attribute(&mut self, name: &str, value: Value) {
        self.fields.insert(name.to_string(), value);
    }

    fn is_new_record(&self) -> bool {
        !self.persisted
    }

    fn mark_persisted(&mut self) {
        self.persisted = true;
    }
}

type Service = MultilingualService<Article, MemoryStore<Article>>;

fn config() -> MultilingualConfig {
    MultilingualConfig::new(["title", "body"], ["ru", "en"].into_iter().collect())
        .default_language("ru")
        .lang_foreign_key("article_id")
        .table_name("article_lang")
}

fn behavior(config: &MultilingualConfig) -> Arc<MultilingualBehavior> {
    MultilingualBehavior::attach::<Article>(config, &LocaleConfig::default()).unwrap()
}

fn service_with(config: &MultilingualConfig) -> Service {
    MultilingualService::new(behavior(config), MemoryStore::new())
}

fn create(svc: &mut Service, values: &[(&str, &str)]) -> Value {
    let mut article = svc.create(Article::default());
    article.set_attributes(values.iter().copied()).unwrap();
    svc.save(&mut article).unwrap();
    article.host().primary_key_value().unwrap()
}

fn row_languages(svc: &Service) -> Vec<String> {
    let mut languages: Vec<String> = svc
        .store()
        .rows(svc.behavior().schema())
        .iter()
        .map(|row| row.language.clone())
        .collect();
    languages.sort();
    languages
}

// ---------------------------------------------------------------------------
// Worked example
// ---------------------------------------------------------------------------

#[test]
fn partial_translation_reloads_with_absent_values() {
    let mut svc = service_with(&config());
    let id = create(&mut svc, &[("title", "T"), ("body", "B"), ("title_en", "Te")]);

    let host = &svc.store().hosts()[0];
    assert_eq!(host.attribute("title"), Some(Value::from("T")));
    assert_eq!(host.attribute("body"), Some(Value::from("B")));

    let schema = svc.behavior().schema();
    let ru = svc.store().find_translation(schema, &id, "ru").unwrap().unwrap();
    assert_eq!(ru.get("title"), Some(&Value::from("T")));
    assert_eq!(ru.get("body"), Some(&Value::from("B")));
    let en = svc.store().find_translation(schema, &id, "en").unwrap().unwrap();
    assert_eq!(en.get("title"), Some(&Value::from("Te")));
    assert_eq!(en.get("body"), None);

    let loaded = svc
        .find_one(id, &Query::new().multilingual())
        .unwrap()
        .unwrap();
    assert_eq!(loaded.get("title_en"), Some(Value::from("Te")));
    assert_eq!(loaded.get("body_en"), Some(Value::Null));
}

// ---------------------------------------------------------------------------
// Round trip and fallback
// ---------------------------------------------------------------------------

#[test]
fn every_qualified_value_survives_a_round_trip() {
    let mut svc = service_with(&config());
    let id = create(
        &mut svc,
        &[
            ("title", "Заголовок"),
            ("body", "Текст"),
            ("title_en", "Title"),
            ("body_en", "Text"),
        ],
    );

    let loaded = svc
        .find_one(id, &Query::new().multilingual())
        .unwrap()
        .unwrap();
    assert_eq!(loaded.get("title_ru"), Some(Value::from("Заголовок")));
    assert_eq!(loaded.get("body_ru"), Some(Value::from("Текст")));
    assert_eq!(loaded.get("title_en"), Some(Value::from("Title")));
    assert_eq!(loaded.get("body_en"), Some(Value::from("Text")));
    assert_eq!(loaded.get("title"), Some(Value::from("Заголовок")));
    assert_eq!(loaded.get("body"), Some(Value::from("Текст")));
}

#[test]
fn single_and_all_paths_agree_on_default_language() {
    let mut svc = service_with(&config().current_language("ru"));
    let id = create(&mut svc, &[("title", "T"), ("body", "B"), ("title_en", "Te")]);

    let single = svc
        .find_one(id.clone(), &Query::new().localized(None))
        .unwrap()
        .unwrap();
    let all = svc
        .find_one(id, &Query::new().multilingual())
        .unwrap()
        .unwrap();

    for attribute in ["title", "body"] {
        assert_eq!(single.get(attribute), all.get(attribute));
    }
}

#[test]
fn localized_scope_shows_requested_language() {
    let mut svc = service_with(&config());
    let id = create(&mut svc, &[("title", "T"), ("body", "B"), ("title_en", "Te")]);

    let en = svc
        .find_one(id, &Query::new().multilingual().localized(Some("en-GB")))
        .unwrap()
        .unwrap();
    assert_eq!(en.get("title"), Some(Value::from("Te")));
    assert_eq!(en.get("body"), Some(Value::from("B")));
    assert!(en.relations().translations().is_none());
}

#[rstest]
#[case::lazy(Query::new())]
#[case::localized(Query::new().localized(Some("en")))]
fn saving_a_localized_view_keeps_default_values(#[case] query: Query) {
    let mut svc = service_with(&config().current_language("en"));
    let id = create(&mut svc, &[("title", "T"), ("body", "B"), ("title_en", "Te")]);

    let mut article = svc.find_one(id.clone(), &query).unwrap().unwrap();
    assert_eq!(article.get("title"), Some(Value::from("Te")));
    assert_eq!(article.get("body"), Some(Value::from("B")));
    svc.save(&mut article).unwrap();

    assert_eq!(
        svc.store().hosts()[0].attribute("title"),
        Some(Value::from("T"))
    );
    let schema = svc.behavior().schema();
    let ru = svc.store().find_translation(schema, &id, "ru").unwrap().unwrap();
    assert_eq!(ru.get("title"), Some(&Value::from("T")));
    assert_eq!(ru.get("body"), Some(&Value::from("B")));
    let en = svc.store().find_translation(schema, &id, "en").unwrap().unwrap();
    assert_eq!(en.get("title"), Some(&Value::from("Te")));
    assert_eq!(en.get("body"), None);
}

#[test]
fn edits_in_a_localized_view_go_to_that_language() {
    let mut svc = service_with(&config().current_language("en"));
    let id = create(&mut svc, &[("title", "T"), ("body", "B"), ("title_en", "Te")]);

    let mut article = svc.find_one(id.clone(), &Query::new()).unwrap().unwrap();
    article.set("title", "Title").unwrap();
    svc.save(&mut article).unwrap();

    let reloaded = svc
        .find_one(id, &Query::new().multilingual())
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.get("title_ru"), Some(Value::from("T")));
    assert_eq!(reloaded.get("title_en"), Some(Value::from("Title")));
    assert_eq!(reloaded.get("title"), Some(Value::from("T")));
}

// ---------------------------------------------------------------------------
// Prefixed columns
// ---------------------------------------------------------------------------

#[test]
fn prefixed_columns_are_written_and_read_back() {
    let mut svc = service_with(&config().localized_prefix("l_"));
    let id = create(&mut svc, &[("title", "T"), ("body", "B"), ("title_en", "Te")]);

    let mut table = svc.store().table(svc.behavior().schema());
    table.sort_by_key(|row| row["language"].to_string());
    assert_eq!(table.len(), 2);
    let (en, ru) = (&table[0], &table[1]);
    assert_eq!(en["language"], Value::from("en"));
    assert_eq!(en["article_id"], id);
    assert_eq!(en["l_title"], Value::from("Te"));
    assert_eq!(en["l_body"], Value::Null);
    assert_eq!(ru["l_title"], Value::from("T"));
    assert_eq!(ru["l_body"], Value::from("B"));
    assert!(!ru.contains_key("title"));

    let all = svc
        .find_one(id.clone(), &Query::new().multilingual())
        .unwrap()
        .unwrap();
    assert_eq!(all.get("title_ru"), Some(Value::from("T")));
    assert_eq!(all.get("title_en"), Some(Value::from("Te")));
    assert_eq!(all.get("body_ru"), Some(Value::from("B")));

    let en = svc
        .find_one(id, &Query::new().localized(Some("en")))
        .unwrap()
        .unwrap();
    assert_eq!(en.get("title"), Some(Value::from("Te")));
    assert_eq!(en.get("title_en"), Some(Value::from("Te")));
    assert_eq!(en.get("body"), Some(Value::from("B")));
}

// ---------------------------------------------------------------------------
// Partial translations
// ---------------------------------------------------------------------------

#[test]
fn untouched_languages_get_no_rows_until_filled() {
    let mut svc = service_with(&config());
    let id = create(&mut svc, &[("title", "T"), ("body", "B")]);
    assert_eq!(row_languages(&svc), ["ru"]);

    let mut article = svc.find_one(id, &Query::new()).unwrap().unwrap();
    article.set("body_en", "Be").unwrap();
    svc.save(&mut article).unwrap();
    assert_eq!(row_languages(&svc), ["en", "ru"]);

    svc.save(&mut article).unwrap();
    assert_eq!(row_languages(&svc), ["en", "ru"]);
}

// ---------------------------------------------------------------------------
// Rule propagation
// ---------------------------------------------------------------------------

#[rstest]
#[case(false, true)]
#[case(true, false)]
fn empty_translation_against_required(#[case] require: bool, #[case] saves: bool) {
    let mut svc = service_with(&config().require_translations(require));
    let mut article = svc.create(Article::default());
    article
        .set_attributes([("title", "T"), ("body", "B"), ("title_en", "Te")])
        .unwrap();

    match svc.save(&mut article) {
        Ok(_) => assert!(saves),
        Err(SyncError::Validation(errors)) => {
            assert!(!saves);
            assert_eq!(errors.attributes().collect::<Vec<_>>(), ["body_en"]);
            assert!(svc.store().hosts().is_empty());
        }
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[test]
fn translation_rules_carry_parameters() {
    let mut svc = service_with(&config());
    let mut article = svc.create(Article::default());
    article
        .set_attributes([("title", "T"), ("body", "B")])
        .unwrap();
    article.set("title_en", "x".repeat(65)).unwrap();

    let Err(SyncError::Validation(errors)) = svc.save(&mut article) else {
        panic!("expected validation errors");
    };
    assert!(errors.has("title_en"));
}

// ---------------------------------------------------------------------------
// Delete cascade
// ---------------------------------------------------------------------------

#[rstest]
#[case(true, 0)]
#[case(false, 2)]
fn delete_cascade(#[case] force_delete: bool, #[case] remaining: usize) {
    let mut svc = service_with(&config().force_delete(force_delete));
    let id = create(&mut svc, &[("title", "T"), ("body", "B"), ("title_en", "Te")]);

    let mut article = svc.find_one(id, &Query::new()).unwrap().unwrap();
    svc.delete(&mut article).unwrap();

    assert!(svc.store().hosts().is_empty());
    assert_eq!(svc.store().rows(svc.behavior().schema()).len(), remaining);
}
