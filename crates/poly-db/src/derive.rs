//! Projection of host validation rules onto per-language attributes.
//!
//! Runs once at attach time. For a rule covering translated attributes, one
//! derived rule targets every `attribute_language` of the non-default
//! languages:
//!
//! ```text
//! required(title)          -> safe(title_en)       require_translations = false
//!                          -> required(title_en)   require_translations = true
//! string(title, max: 255)  -> string(title_en, max: 255)
//! unique(title)            -> (skipped: excluded validator)
//! ```

use poly_core::{LanguageSet, Rule, ValidatorKind};

/// Derived rules for `rules`, to be appended to the host's own set.
#[must_use]
pub fn derive_rules(
    rules: &[Rule],
    attributes: &[String],
    languages: &LanguageSet,
    require_translations: bool,
    excluded: &[ValidatorKind],
) -> Vec<Rule> {
    let mut derived = Vec::new();

    for rule in rules {
        if excluded.contains(&rule.kind) {
            continue;
        }

        let targets: Vec<String> = attributes
            .iter()
            .filter(|attribute| rule.applies_to(attribute))
            .flat_map(|attribute| {
                languages
                    .translations()
                    .map(move |language| languages.qualified_name(attribute, language))
            })
            .collect();
        if targets.is_empty() {
            continue;
        }

        let projected = if rule.kind == ValidatorKind::Required && !require_translations {
            Rule::new(targets, ValidatorKind::Safe)
        } else {
            let mut projected = rule.retarget(targets);
            if projected.skip_on_empty.is_none() {
                projected.skip_on_empty = Some(!require_translations);
            }
            projected
        };

        tracing::debug!(
            kind = %projected.kind,
            from = %rule.kind,
            targets = ?projected.attributes,
            "derived translation rule"
        );
        derived.push(projected);
    }

    derived
}
