//! The attached, immutable translation setup for one host type.
//!
//! `MultilingualBehavior::attach` turns a `MultilingualConfig` into the
//! resolved language set, the translation schema, and the full rule set
//! (host rules followed by derived per-language rules). Every check that can
//! fail does so here, once; instances built afterwards share the result.

use std::sync::Arc;

use poly_config::{LocaleConfig, MultilingualConfig};
use poly_core::{
    ConfigurationError, LanguagePolicy, LanguageSet, Rule, TranslationSchema, ValidatorKind,
};

use crate::derive::derive_rules;
use crate::host::HostEntity;

#[derive(Debug, Clone)]
pub struct MultilingualBehavior {
    schema: TranslationSchema,
    languages: LanguageSet,
    current_language: String,
    owner_key: String,
    require_translations: bool,
    force_overwrite: bool,
    force_delete: bool,
    rules: Vec<Rule>,
}

fn required(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty()).map(str::to_string)
}

impl MultilingualBehavior {
    /// Validate `config` against host type `H` and build the shared setup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` when languages or attributes are missing,
    /// the default language is not among the languages, `H` does not have
    /// exactly one primary key field, or the foreign key or table name is
    /// unset.
    pub fn attach<H: HostEntity>(
        config: &MultilingualConfig,
        locale: &LocaleConfig,
    ) -> Result<Arc<Self>, ConfigurationError> {
        let policy = LanguagePolicy::from_abridge(config.abridge);
        let languages = LanguageSet::resolve(
            &config.languages,
            config.default_language.as_deref(),
            locale.ambient_default(),
            policy,
        )?;

        if config.attributes.is_empty() {
            return Err(ConfigurationError::MissingAttributes);
        }

        let primary_key = H::primary_key();
        if primary_key.len() != 1 {
            return Err(ConfigurationError::PrimaryKey {
                found: primary_key.len(),
            });
        }

        let foreign_key = required(config.lang_foreign_key.as_deref())
            .ok_or(ConfigurationError::MissingForeignKey)?;
        let table_name =
            required(config.table_name.as_deref()).ok_or(ConfigurationError::MissingTableName)?;

        let current = config
            .current_language
            .as_deref()
            .filter(|lang| !lang.is_empty())
            .unwrap_or(&locale.app_language);
        let current_language = languages.normalize(current);

        let excluded: Vec<ValidatorKind> = config
            .excluded_validators
            .iter()
            .map(|name| ValidatorKind::parse(name))
            .collect();

        let mut rules = H::rules();
        let derived = derive_rules(
            &rules,
            &config.attributes,
            &languages,
            config.require_translations,
            &excluded,
        );
        let derived_count = derived.len();
        rules.extend(derived);

        tracing::debug!(
            table = %table_name,
            languages = ?languages.codes(),
            default_language = %languages.default_language(),
            current_language = %current_language,
            derived_rules = derived_count,
            "attached multilingual behavior"
        );

        Ok(Arc::new(Self {
            schema: TranslationSchema {
                table_name,
                language_field: config.language_field.clone(),
                foreign_key,
                localized_prefix: config.localized_prefix.clone(),
                attributes: config.attributes.clone(),
            },
            languages,
            current_language,
            owner_key: primary_key[0].to_string(),
            require_translations: config.require_translations,
            force_overwrite: config.force_overwrite,
            force_delete: config.force_delete,
            rules,
        }))
    }

    #[must_use]
    pub const fn schema(&self) -> &TranslationSchema {
        &self.schema
    }

    #[must_use]
    pub const fn languages(&self) -> &LanguageSet {
        &self.languages
    }

    /// Translated host attributes, in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.schema.attributes
    }

    /// Language of the single-translation relation.
    #[must_use]
    pub fn current_language(&self) -> &str {
        &self.current_language
    }

    /// Host primary key field referenced by translation rows.
    #[must_use]
    pub fn owner_key(&self) -> &str {
        &self.owner_key
    }

    #[must_use]
    pub const fn require_translations(&self) -> bool {
        self.require_translations
    }

    #[must_use]
    pub const fn force_overwrite(&self) -> bool {
        self.force_overwrite
    }

    #[must_use]
    pub const fn force_delete(&self) -> bool {
        self.force_delete
    }

    /// Host rules followed by derived per-language rules.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn is_translated(&self, attribute: &str) -> bool {
        self.schema.attributes.iter().any(|a| a == attribute)
    }

    #[must_use]
    pub fn qualified_name(&self, attribute: &str, language: &str) -> String {
        self.languages.qualified_name(attribute, language)
    }

    /// Every `attribute_language` name, all languages included.
    pub fn qualified_names(&self) -> impl Iterator<Item = String> + '_ {
        self.schema.attributes.iter().flat_map(move |attribute| {
            self.languages
                .iter()
                .map(move |language| self.languages.qualified_name(attribute, language))
        })
    }

    /// Whether `name` is a translated attribute or one of its qualified names.
    #[must_use]
    pub fn is_overlay_name(&self, name: &str) -> bool {
        self.is_translated(name) || self.qualified_names().any(|q| q == name)
    }
}
