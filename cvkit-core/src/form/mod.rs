/*!
Generic form state and field validation.

A [`FormEngine`] holds the working copy of one record being edited together
with the validation errors known for its fields. Each record type describes its
field set through [`FormRecord`], so fields are addressed by an enum instead of
free-form strings. Validation is opt-in: it runs when a field is written with
[`FormEngine::set_field`] or when the whole form is checked with
[`FormEngine::validate_all`].
*/

pub mod records;
pub mod rules;

use crate::{CvError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

pub use records::{
    education_form, education_rules, experience_form, experience_rules, hobby_form, hobby_rules,
    language_form, language_rules, personal_details_form, personal_details_rules, skill_form,
    skill_rules, validate_document, EducationField, ExperienceField, FieldIssue, HobbyField,
    LanguageField, PersonalDetailsField, SkillField,
};

/// Identifier of one field in a form record
pub trait FormField: Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    /// Name used in serialized documents and string-keyed lookups
    fn name(self) -> &'static str;
}

/// A flat record whose fields are all string-like and statically known
pub trait FormRecord: Clone {
    type Field: FormField;

    /// Label used in error messages, e.g. `"experience"`
    const FORM_NAME: &'static str;

    /// Every field of the record, in display order
    const FIELDS: &'static [Self::Field];

    fn get(&self, field: Self::Field) -> &str;

    fn set(&mut self, field: Self::Field, value: String);

    /// Resolve a field from its serialized name
    fn field_from_name(name: &str) -> Option<Self::Field> {
        Self::FIELDS.iter().copied().find(|field| field.name() == name)
    }
}

/// A pure validation function: `None` when the value is valid, otherwise the
/// user-facing message.
pub type Rule = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Mapping from field to the rule validating it
pub struct RuleSet<F: FormField> {
    rules: BTreeMap<F, Rule>,
}

impl<F: FormField> RuleSet<F> {
    pub fn new() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Attach `rule` to `field`, replacing any previous rule for it
    pub fn with_rule<R>(mut self, field: F, rule: R) -> Self
    where
        R: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.rules.insert(field, Arc::new(rule));
        self
    }

    /// Run the rule for `field`.
    ///
    /// Returns `None` when the field has no rule, `Some(None)` when the value
    /// passes and `Some(Some(message))` when it fails.
    pub fn check(&self, field: F, value: &str) -> Option<Option<String>> {
        self.rules.get(&field).map(|rule| rule(value))
    }

    pub fn has_rule(&self, field: F) -> bool {
        self.rules.contains_key(&field)
    }

    /// Fields carrying a rule, in field order
    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.rules.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<F: FormField> Default for RuleSet<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FormField> Clone for RuleSet<F> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<F: FormField> fmt::Debug for RuleSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.rules.keys()).finish()
    }
}

/// Working state of one form: current values plus known field errors.
///
/// `errors` only carries entries for fields that were written or validated;
/// a missing entry means "no known error", not "valid".
///
/// # Example
/// ```rust
/// use cvkit_core::form::{skill_form, SkillField};
///
/// let mut form = skill_form();
/// form.set_field(SkillField::Name, "   ");
/// assert!(form.error(SkillField::Name).is_some());
///
/// form.set_field(SkillField::Name, "Rust");
/// let skill = form.submit().expect("valid skill");
/// assert_eq!(skill.name, "Rust");
/// ```
pub struct FormEngine<T: FormRecord> {
    initial: T,
    values: T,
    errors: BTreeMap<T::Field, String>,
    rules: RuleSet<T::Field>,
}

impl<T: FormRecord> FormEngine<T> {
    /// Create a form seeded with `initial`. The value is captured so that
    /// [`reset`](Self::reset) can restore it later.
    pub fn new(initial: T, rules: RuleSet<T::Field>) -> Self {
        Self {
            values: initial.clone(),
            initial,
            errors: BTreeMap::new(),
            rules,
        }
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    /// Mutable access to the working copy. Writes made here skip validation.
    pub fn values_mut(&mut self) -> &mut T {
        &mut self.values
    }

    /// Replace the working copy wholesale without validating it
    pub fn replace_values(&mut self, values: T) {
        self.values = values;
    }

    pub fn initial(&self) -> &T {
        &self.initial
    }

    pub fn rules(&self) -> &RuleSet<T::Field> {
        &self.rules
    }

    pub fn errors(&self) -> &BTreeMap<T::Field, String> {
        &self.errors
    }

    pub fn error(&self, field: T::Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Write `value` into `field` and validate that field immediately.
    ///
    /// The value is always written. If the field has no rule its error entry is
    /// left as it was.
    pub fn set_field<S: Into<String>>(&mut self, field: T::Field, value: S) {
        self.values.set(field, value.into());

        if let Some(outcome) = self.rules.check(field, self.values.get(field)) {
            match outcome {
                Some(message) => {
                    self.errors.insert(field, message);
                }
                None => {
                    self.errors.remove(&field);
                }
            }
        }
    }

    /// String-keyed variant of [`set_field`](Self::set_field).
    ///
    /// # Errors
    /// * `CvError::UnknownField` - `name` is not a field of this form; nothing
    ///   is written
    pub fn set_field_by_name<S: Into<String>>(&mut self, name: &str, value: S) -> Result<()> {
        let field = T::field_from_name(name)
            .ok_or_else(|| CvError::unknown_field(T::FORM_NAME, name))?;
        self.set_field(field, value);
        Ok(())
    }

    /// Run every rule against the current values.
    ///
    /// The error map is replaced by the fresh results, so stale entries for
    /// fields that now pass disappear. Returns true iff no rule failed.
    pub fn validate_all(&mut self) -> bool {
        let mut errors = BTreeMap::new();
        for field in self.rules.fields() {
            if let Some(Some(message)) = self.rules.check(field, self.values.get(field)) {
                errors.insert(field, message);
            }
        }

        let valid = errors.is_empty();
        self.errors = errors;
        valid
    }

    /// Restore the values captured at creation and clear all errors
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
    }

    /// Validate everything and, if the form passes, hand back a copy of the
    /// values and reset the form for the next entry.
    pub fn submit(&mut self) -> Option<T> {
        if !self.validate_all() {
            return None;
        }
        let committed = self.values.clone();
        self.reset();
        Some(committed)
    }
}

impl<T: FormRecord + fmt::Debug> fmt::Debug for FormEngine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEngine")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("rules", &self.rules)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Experience, Language, PersonalDetails, Skill};
    use proptest::prelude::*;

    fn filled_experience() -> Experience {
        Experience {
            job_title: "Développeur".to_string(),
            company_name: "Tech Solutions".to_string(),
            start_date: "2020-01-01".to_string(),
            end_date: "2023-12-31".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_new_form_starts_clean() {
        let form = FormEngine::new(filled_experience(), experience_rules());
        assert_eq!(form.values(), &filled_experience());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_set_field_validates_immediately() {
        let mut form = experience_form();

        form.set_field(ExperienceField::JobTitle, "");
        assert_eq!(form.error(ExperienceField::JobTitle), Some("Titre du poste requis"));

        form.set_field(ExperienceField::JobTitle, "Architecte");
        assert_eq!(form.error(ExperienceField::JobTitle), None);
        assert_eq!(form.values().job_title, "Architecte");
    }

    #[test]
    fn test_set_field_without_rule_still_writes() {
        let mut form = experience_form();
        form.set_field(ExperienceField::Description, "Refonte du back-office");

        assert_eq!(form.values().description, "Refonte du back-office");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_set_field_by_name_rejects_unknown_field() {
        let mut form = language_form();
        let before = form.values().clone();

        let result = form.set_field_by_name("salary", "100k");
        assert!(matches!(result, Err(CvError::UnknownField { .. })));
        assert_eq!(form.values(), &before);

        form.set_field_by_name("language", "Espagnol").unwrap();
        assert_eq!(form.values().language, "Espagnol");
    }

    #[test]
    fn test_validate_all_replaces_stale_errors() {
        let mut form = experience_form();
        form.set_field(ExperienceField::CompanyName, "");
        assert!(form.error(ExperienceField::CompanyName).is_some());

        // Fix the value behind the engine's back; only validate_all notices.
        form.values_mut().company_name = "Creative Studio".to_string();
        assert!(form.error(ExperienceField::CompanyName).is_some());

        let valid = form.validate_all();
        assert!(!valid);
        assert!(form.error(ExperienceField::CompanyName).is_none());
        assert!(form.error(ExperienceField::JobTitle).is_some());
        assert!(form.error(ExperienceField::Description).is_none());
    }

    #[test]
    fn test_validate_all_with_no_rules_is_true() {
        let mut form = FormEngine::new(Skill::default(), RuleSet::new());
        assert!(form.validate_all());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_reset_restores_captured_initial() {
        let seed = PersonalDetails {
            full_name: "Sophie Dubois".to_string(),
            ..PersonalDetails::default()
        };
        let mut form = personal_details_form(seed.clone());

        form.set_field(PersonalDetailsField::FullName, "");
        form.set_field(PersonalDetailsField::Email, "nope");
        form.replace_values(PersonalDetails::default());
        form.reset();

        assert_eq!(form.values(), &seed);
        assert!(form.errors().is_empty());
        assert_eq!(form.rules().len(), 5);
    }

    #[test]
    fn test_submit_returns_values_and_resets() {
        let mut form = language_form();
        form.set_field(LanguageField::Language, "Anglais");
        form.set_field(LanguageField::Proficiency, "Avancé");

        let committed = form.submit().unwrap();
        assert_eq!(
            committed,
            Language {
                language: "Anglais".to_string(),
                proficiency: "Avancé".to_string(),
            }
        );
        assert_eq!(form.values(), &Language::default());
    }

    #[test]
    fn test_submit_failure_keeps_values_and_errors() {
        let mut form = language_form();
        form.set_field(LanguageField::Language, "Anglais");

        assert!(form.submit().is_none());
        assert_eq!(form.values().language, "Anglais");
        assert_eq!(form.error(LanguageField::Proficiency), Some("Niveau requis"));
    }

    proptest! {
        #[test]
        fn prop_set_field_error_matches_rule(value in ".{0,24}") {
            let mut form = skill_form();
            form.set_field(SkillField::Name, value.clone());

            let expected = skill_rules().check(SkillField::Name, &value).flatten();
            prop_assert_eq!(form.error(SkillField::Name).map(str::to_string), expected);
        }

        #[test]
        fn prop_validate_all_iff_every_rule_passes(
            title in "[a-zA-Z ]{0,8}",
            company in "[a-zA-Z ]{0,8}",
            start in "[0-9-]{0,10}",
            end in "[0-9-]{0,10}",
        ) {
            let mut form = experience_form();
            form.replace_values(Experience {
                job_title: title.clone(),
                company_name: company.clone(),
                start_date: start.clone(),
                end_date: end.clone(),
                description: String::new(),
            });

            let expected = [&title, &company, &start, &end]
                .iter()
                .all(|value| !value.trim().is_empty());
            prop_assert_eq!(form.validate_all(), expected);
            prop_assert_eq!(form.errors().is_empty(), expected);
        }

        #[test]
        fn prop_reset_ignores_mutation_count(values in proptest::collection::vec(".{0,6}", 0..8)) {
            let mut form = skill_form();
            for value in values {
                form.set_field(SkillField::Name, value);
            }
            form.reset();
            prop_assert_eq!(form.values(), &Skill::default());
            prop_assert!(form.errors().is_empty());
        }
    }
}
