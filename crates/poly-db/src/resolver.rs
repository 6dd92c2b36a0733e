//! Load-time relation resolution and the two merge paths.
//!
//! A loaded host carries at most two relations: every translation row
//! (`multilingual()`), or the single row for the current language
//! (`localized()`). The all-translations relation wins when both are present,
//! even when it is empty.

use std::collections::BTreeMap;

use poly_core::{TranslationRecord, Value};

use crate::behavior::MultilingualBehavior;
use crate::host::HostEntity;
use crate::overlay::AttributeOverlay;

/// Eagerly or lazily fetched translation relations of one host instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relations {
    translations: Option<Vec<TranslationRecord>>,
    translation: Option<Option<TranslationRecord>>,
}

/// Default-language values pushed out of the bare names by a single
/// translation in another language.
///
/// While displaced, the bare names show `language` and the stored default
/// values are kept here so a save never writes them into the wrong row.
#[derive(Debug, Clone, PartialEq)]
pub struct Displaced {
    language: String,
    values: BTreeMap<String, Value>,
}

impl Displaced {
    /// Language the bare names currently show.
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Default-language value of `attribute`, if it was displaced.
    #[must_use]
    pub fn value(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// Put the default-language values back on the bare names.
    ///
    /// Whatever the bare names held (including later edits) moves to the
    /// displaced language's qualified slots first.
    pub fn restore<H: HostEntity>(
        self,
        behavior: &MultilingualBehavior,
        host: &mut H,
        overlay: &mut AttributeOverlay,
    ) {
        let translated = behavior.languages().contains(&self.language);
        for (attribute, value) in self.values {
            let shown = if host.has_attribute(&attribute) {
                host.attribute(&attribute)
            } else {
                overlay.get(&attribute).cloned()
            }
            .unwrap_or_default();
            if translated {
                overlay.set(behavior.qualified_name(&attribute, &self.language), shown);
            }
            if host.has_attribute(&attribute) {
                host.populate_attribute(&attribute, value);
            } else {
                overlay.set(attribute.as_str(), value);
            }
        }
        tracing::debug!(
            table = %behavior.schema().table_name,
            language = %self.language,
            "restored default-language values"
        );
    }
}

/// Which merge path a loaded host takes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a> {
    All(&'a [TranslationRecord]),
    Single(Option<&'a TranslationRecord>),
    Unloaded,
}

impl Relations {
    /// Relations with the all-translations rows populated.
    #[must_use]
    pub const fn all(rows: Vec<TranslationRecord>) -> Self {
        Self {
            translations: Some(rows),
            translation: None,
        }
    }

    /// Relations with the single-translation row populated (possibly missing).
    #[must_use]
    pub const fn single(row: Option<TranslationRecord>) -> Self {
        Self {
            translations: None,
            translation: Some(row),
        }
    }

    #[must_use]
    pub fn resolve(&self) -> Resolved<'_> {
        match (&self.translations, &self.translation) {
            (Some(rows), _) => Resolved::All(rows),
            (None, Some(row)) => Resolved::Single(row.as_ref()),
            (None, None) => Resolved::Unloaded,
        }
    }

    /// All-translations rows, if populated.
    #[must_use]
    pub fn translations(&self) -> Option<&[TranslationRecord]> {
        self.translations.as_deref()
    }

    /// Single-translation row, if the relation was populated.
    #[must_use]
    pub fn translation(&self) -> Option<Option<&TranslationRecord>> {
        self.translation.as_ref().map(Option::as_ref)
    }

    pub fn set_translations(&mut self, rows: Vec<TranslationRecord>) {
        self.translations = Some(rows);
    }

    pub fn set_translation(&mut self, row: Option<TranslationRecord>) {
        self.translation = Some(row);
    }

    pub fn clear(&mut self) {
        self.translations = None;
        self.translation = None;
    }
}

/// Index rows by normalized language. A later duplicate replaces an earlier one.
pub fn index_by_language<'a, I>(
    behavior: &MultilingualBehavior,
    rows: I,
) -> BTreeMap<String, &'a TranslationRecord>
where
    I: IntoIterator<Item = &'a TranslationRecord>,
{
    rows.into_iter()
        .map(|row| (behavior.languages().normalize(&row.language), row))
        .collect()
}

/// Fill the overlay from every translation row.
///
/// Each `attribute_language` slot receives the row's value, or `Null` when no
/// row or column exists. Default-language values also land on the bare name.
pub fn merge_all<H: HostEntity>(
    behavior: &MultilingualBehavior,
    host: &mut H,
    overlay: &mut AttributeOverlay,
    rows: &[TranslationRecord],
) {
    let schema = behavior.schema();
    let languages = behavior.languages();
    let indexed = index_by_language(behavior, rows);
    tracing::debug!(
        table = %schema.table_name,
        rows = rows.len(),
        languages = indexed.len(),
        "merging all translations"
    );

    for language in languages.iter() {
        let row = indexed.get(language);
        for attribute in behavior.attributes() {
            let value = row
                .and_then(|row| row.get(&schema.column(attribute)))
                .cloned()
                .unwrap_or_default();
            if languages.is_default(language) {
                overlay.set(attribute.as_str(), value.clone());
            }
            overlay.set(behavior.qualified_name(attribute, language), value);
        }
    }

    mirror_bare_values(behavior, host, overlay);
}

/// Copy the current-language row onto the host's own attributes.
///
/// An empty value replaces the host value only under `force_overwrite` or
/// `require_translations`. The row's qualified slots are filled as well.
/// When the row is not in the default language, the values it replaced are
/// returned so they can be restored before a save.
pub fn merge_single<H: HostEntity>(
    behavior: &MultilingualBehavior,
    host: &mut H,
    overlay: &mut AttributeOverlay,
    row: Option<&TranslationRecord>,
) -> Option<Displaced> {
    let Some(row) = row else {
        tracing::debug!(
            table = %behavior.schema().table_name,
            language = %behavior.current_language(),
            "no translation row for current language"
        );
        return None;
    };

    let schema = behavior.schema();
    let language = behavior.languages().normalize(&row.language);
    let is_default = behavior.languages().is_default(&language);
    let overwrite_empty = behavior.force_overwrite() || behavior.require_translations();
    tracing::debug!(
        table = %schema.table_name,
        language = %language,
        "merging single translation"
    );

    let mut displaced = BTreeMap::new();
    for attribute in behavior.attributes() {
        let value = row
            .get(&schema.column(attribute))
            .cloned()
            .unwrap_or_default();
        if behavior.languages().contains(&language) {
            overlay.set(behavior.qualified_name(attribute, &language), value.clone());
        }
        if value.is_blank() && !overwrite_empty {
            continue;
        }
        let previous = if host.has_attribute(attribute) {
            let previous = host.attribute(attribute);
            host.populate_attribute(attribute, value);
            previous
        } else {
            let previous = overlay.get(attribute).cloned();
            overlay.set(attribute.as_str(), value);
            previous
        };
        if !is_default {
            displaced
                .entry(attribute.clone())
                .or_insert_with(|| previous.unwrap_or_default());
        }
    }

    (!displaced.is_empty()).then_some(Displaced {
        language,
        values: displaced,
    })
}

/// Mirror non-blank bare overlay values onto the host, leaving them clean.
fn mirror_bare_values<H: HostEntity>(
    behavior: &MultilingualBehavior,
    host: &mut H,
    overlay: &AttributeOverlay,
) {
    for attribute in behavior.attributes() {
        let Some(value) = overlay.get(attribute).filter(|v| !v.is_blank()) else {
            continue;
        };
        if host.has_attribute(attribute) {
            host.populate_attribute(attribute, value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Post, post_behavior, post_behavior_with};
    use pretty_assertions::assert_eq;

    fn row(language: &str, title: Option<&str>, body: Option<&str>) -> TranslationRecord {
        let mut row = TranslationRecord::new(Value::Int(1), language);
        if let Some(title) = title {
            row.set("title", Value::from(title));
        }
        if let Some(body) = body {
            row.set("body", Value::from(body));
        }
        row
    }

    #[test]
    fn all_translations_take_precedence() {
        let mut relations = Relations::single(None);
        relations.set_translations(Vec::new());
        assert!(matches!(relations.resolve(), Resolved::All(rows) if rows.is_empty()));
        assert_eq!(Relations::default().resolve(), Resolved::Unloaded);
    }

    #[test]
    fn index_keeps_last_duplicate() {
        let behavior = post_behavior();
        let rows = vec![row("en-US", Some("first"), None), row("en", Some("second"), None)];
        let indexed = index_by_language(&behavior, &rows);
        assert_eq!(indexed.len(), 1);
        assert_eq!(indexed["en"].get("title"), Some(&Value::from("second")));
    }

    #[test]
    fn merge_all_fills_qualified_and_bare_names() {
        let behavior = post_behavior();
        let mut host = Post::stored(1);
        let mut overlay = AttributeOverlay::new();
        let rows = vec![row("ru", Some("T"), Some("B")), row("en", Some("Te"), None)];

        merge_all(&behavior, &mut host, &mut overlay, &rows);

        assert_eq!(overlay.get("title_ru"), Some(&Value::from("T")));
        assert_eq!(overlay.get("title"), Some(&Value::from("T")));
        assert_eq!(overlay.get("title_en"), Some(&Value::from("Te")));
        assert_eq!(overlay.get("body_en"), Some(&Value::Null));
        assert_eq!(host.title.as_deref(), Some("T"));
        assert_eq!(host.body.as_deref(), Some("B"));
        assert!(!host.is_dirty("title"));
    }

    #[test]
    fn merge_single_keeps_host_value_over_empty_translation() {
        let behavior = post_behavior();
        let mut host = Post::stored(1);
        host.populate_attribute("body", Value::from("original"));
        let mut overlay = AttributeOverlay::new();
        let en = row("en", Some("Te"), Some(""));

        let displaced = merge_single(&behavior, &mut host, &mut overlay, Some(&en));

        assert_eq!(host.title.as_deref(), Some("Te"));
        assert_eq!(host.body.as_deref(), Some("original"));
        assert_eq!(overlay.get("title_en"), Some(&Value::from("Te")));
        let displaced = displaced.unwrap();
        assert_eq!(displaced.language(), "en");
        assert_eq!(displaced.value("title"), Some(&Value::Null));
        assert_eq!(displaced.value("body"), None);
    }

    #[test]
    fn default_language_row_displaces_nothing() {
        let behavior = post_behavior();
        let mut host = Post::stored(1);
        let mut overlay = AttributeOverlay::new();
        let ru = row("ru", Some("T"), Some("B"));

        assert_eq!(merge_single(&behavior, &mut host, &mut overlay, Some(&ru)), None);
        assert_eq!(host.title.as_deref(), Some("T"));
    }

    #[test]
    fn restore_moves_shown_values_to_their_language() {
        let behavior = post_behavior();
        let mut host = Post::stored(1);
        host.populate_attribute("title", Value::from("T"));
        host.populate_attribute("body", Value::from("B"));
        let mut overlay = AttributeOverlay::new();
        let en = row("en", Some("Te"), None);

        let displaced = merge_single(&behavior, &mut host, &mut overlay, Some(&en)).unwrap();
        host.set_attribute("title", Value::from("Te2"));
        displaced.restore(&behavior, &mut host, &mut overlay);

        assert_eq!(host.title.as_deref(), Some("T"));
        assert_eq!(host.body.as_deref(), Some("B"));
        assert!(!host.is_dirty("title"));
        assert_eq!(overlay.get("title_en"), Some(&Value::from("Te2")));
    }

    #[test]
    fn merge_single_overwrites_when_forced() {
        let behavior = post_behavior_with(|config| config.force_overwrite(true));
        let mut host = Post::stored(1);
        host.populate_attribute("body", Value::from("original"));
        let mut overlay = AttributeOverlay::new();
        let en = row("en", Some("Te"), None);

        let displaced = merge_single(&behavior, &mut host, &mut overlay, Some(&en)).unwrap();

        assert_eq!(host.body, None);
        assert_eq!(displaced.value("body"), Some(&Value::from("original")));
    }
}
