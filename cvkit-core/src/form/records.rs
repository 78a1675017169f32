/*!
Form bindings for every résumé section: field identifiers, rule sets and
ready-made editors.
*/

use super::rules::{email, one_of, phone, required};
use super::{FormEngine, FormField, FormRecord, RuleSet};
use crate::document::{
    Document, Education, Experience, Hobby, Language, PersonalDetails, Skill, PROFICIENCY_LEVELS,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PersonalDetailsField {
    FullName,
    Email,
    Phone,
    Address,
    PhotoUrl,
    PostSeeking,
    Description,
}

impl FormField for PersonalDetailsField {
    fn name(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Address => "address",
            Self::PhotoUrl => "photoUrl",
            Self::PostSeeking => "postSeeking",
            Self::Description => "description",
        }
    }
}

impl FormRecord for PersonalDetails {
    type Field = PersonalDetailsField;
    const FORM_NAME: &'static str = "personal details";
    const FIELDS: &'static [PersonalDetailsField] = &[
        PersonalDetailsField::FullName,
        PersonalDetailsField::Email,
        PersonalDetailsField::Phone,
        PersonalDetailsField::Address,
        PersonalDetailsField::PhotoUrl,
        PersonalDetailsField::PostSeeking,
        PersonalDetailsField::Description,
    ];

    fn get(&self, field: PersonalDetailsField) -> &str {
        match field {
            PersonalDetailsField::FullName => &self.full_name,
            PersonalDetailsField::Email => &self.email,
            PersonalDetailsField::Phone => &self.phone,
            PersonalDetailsField::Address => &self.address,
            PersonalDetailsField::PhotoUrl => &self.photo_url,
            PersonalDetailsField::PostSeeking => &self.post_seeking,
            PersonalDetailsField::Description => &self.description,
        }
    }

    fn set(&mut self, field: PersonalDetailsField, value: String) {
        match field {
            PersonalDetailsField::FullName => self.full_name = value,
            PersonalDetailsField::Email => self.email = value,
            PersonalDetailsField::Phone => self.phone = value,
            PersonalDetailsField::Address => self.address = value,
            PersonalDetailsField::PhotoUrl => self.photo_url = value,
            PersonalDetailsField::PostSeeking => self.post_seeking = value,
            PersonalDetailsField::Description => self.description = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExperienceField {
    JobTitle,
    CompanyName,
    StartDate,
    EndDate,
    Description,
}

impl FormField for ExperienceField {
    fn name(self) -> &'static str {
        match self {
            Self::JobTitle => "jobTitle",
            Self::CompanyName => "companyName",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::Description => "description",
        }
    }
}

impl FormRecord for Experience {
    type Field = ExperienceField;
    const FORM_NAME: &'static str = "experience";
    const FIELDS: &'static [ExperienceField] = &[
        ExperienceField::JobTitle,
        ExperienceField::CompanyName,
        ExperienceField::StartDate,
        ExperienceField::EndDate,
        ExperienceField::Description,
    ];

    fn get(&self, field: ExperienceField) -> &str {
        match field {
            ExperienceField::JobTitle => &self.job_title,
            ExperienceField::CompanyName => &self.company_name,
            ExperienceField::StartDate => &self.start_date,
            ExperienceField::EndDate => &self.end_date,
            ExperienceField::Description => &self.description,
        }
    }

    fn set(&mut self, field: ExperienceField, value: String) {
        match field {
            ExperienceField::JobTitle => self.job_title = value,
            ExperienceField::CompanyName => self.company_name = value,
            ExperienceField::StartDate => self.start_date = value,
            ExperienceField::EndDate => self.end_date = value,
            ExperienceField::Description => self.description = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EducationField {
    School,
    Degree,
    StartDate,
    EndDate,
    Description,
}

impl FormField for EducationField {
    fn name(self) -> &'static str {
        match self {
            Self::School => "school",
            Self::Degree => "degree",
            Self::StartDate => "startDate",
            Self::EndDate => "endDate",
            Self::Description => "description",
        }
    }
}

impl FormRecord for Education {
    type Field = EducationField;
    const FORM_NAME: &'static str = "education";
    const FIELDS: &'static [EducationField] = &[
        EducationField::School,
        EducationField::Degree,
        EducationField::StartDate,
        EducationField::EndDate,
        EducationField::Description,
    ];

    fn get(&self, field: EducationField) -> &str {
        match field {
            EducationField::School => &self.school,
            EducationField::Degree => &self.degree,
            EducationField::StartDate => &self.start_date,
            EducationField::EndDate => &self.end_date,
            EducationField::Description => &self.description,
        }
    }

    fn set(&mut self, field: EducationField, value: String) {
        match field {
            EducationField::School => self.school = value,
            EducationField::Degree => self.degree = value,
            EducationField::StartDate => self.start_date = value,
            EducationField::EndDate => self.end_date = value,
            EducationField::Description => self.description = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LanguageField {
    Language,
    Proficiency,
}

impl FormField for LanguageField {
    fn name(self) -> &'static str {
        match self {
            Self::Language => "language",
            Self::Proficiency => "proficiency",
        }
    }
}

impl FormRecord for Language {
    type Field = LanguageField;
    const FORM_NAME: &'static str = "language";
    const FIELDS: &'static [LanguageField] = &[LanguageField::Language, LanguageField::Proficiency];

    fn get(&self, field: LanguageField) -> &str {
        match field {
            LanguageField::Language => &self.language,
            LanguageField::Proficiency => &self.proficiency,
        }
    }

    fn set(&mut self, field: LanguageField, value: String) {
        match field {
            LanguageField::Language => self.language = value,
            LanguageField::Proficiency => self.proficiency = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkillField {
    Name,
}

impl FormField for SkillField {
    fn name(self) -> &'static str {
        "name"
    }
}

impl FormRecord for Skill {
    type Field = SkillField;
    const FORM_NAME: &'static str = "skill";
    const FIELDS: &'static [SkillField] = &[SkillField::Name];

    fn get(&self, _field: SkillField) -> &str {
        &self.name
    }

    fn set(&mut self, _field: SkillField, value: String) {
        self.name = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HobbyField {
    Name,
}

impl FormField for HobbyField {
    fn name(self) -> &'static str {
        "name"
    }
}

impl FormRecord for Hobby {
    type Field = HobbyField;
    const FORM_NAME: &'static str = "hobby";
    const FIELDS: &'static [HobbyField] = &[HobbyField::Name];

    fn get(&self, _field: HobbyField) -> &str {
        &self.name
    }

    fn set(&mut self, _field: HobbyField, value: String) {
        self.name = value;
    }
}

pub fn personal_details_rules() -> RuleSet<PersonalDetailsField> {
    RuleSet::new()
        .with_rule(PersonalDetailsField::FullName, required("Nom complet"))
        .with_rule(PersonalDetailsField::Email, email)
        .with_rule(PersonalDetailsField::Phone, phone)
        .with_rule(PersonalDetailsField::Address, required("Adresse"))
        .with_rule(PersonalDetailsField::PostSeeking, required("Poste recherché"))
}

pub fn experience_rules() -> RuleSet<ExperienceField> {
    RuleSet::new()
        .with_rule(ExperienceField::JobTitle, required("Titre du poste"))
        .with_rule(ExperienceField::CompanyName, required("Nom de l'entreprise"))
        .with_rule(ExperienceField::StartDate, required("Date de début"))
        .with_rule(ExperienceField::EndDate, required("Date de fin"))
}

pub fn education_rules() -> RuleSet<EducationField> {
    RuleSet::new()
        .with_rule(EducationField::School, required("Nom de l'école"))
        .with_rule(EducationField::Degree, required("Diplôme"))
        .with_rule(EducationField::StartDate, required("Date de début"))
        .with_rule(EducationField::EndDate, required("Date de fin"))
}

pub fn language_rules() -> RuleSet<LanguageField> {
    RuleSet::new()
        .with_rule(LanguageField::Language, required("Langue"))
        .with_rule(
            LanguageField::Proficiency,
            one_of("Niveau", PROFICIENCY_LEVELS),
        )
}

pub fn skill_rules() -> RuleSet<SkillField> {
    RuleSet::new().with_rule(SkillField::Name, required("Compétence"))
}

pub fn hobby_rules() -> RuleSet<HobbyField> {
    RuleSet::new().with_rule(HobbyField::Name, required("Loisir"))
}

/// Personal details editor seeded from the live document
pub fn personal_details_form(initial: PersonalDetails) -> FormEngine<PersonalDetails> {
    FormEngine::new(initial, personal_details_rules())
}

pub fn experience_form() -> FormEngine<Experience> {
    FormEngine::new(Experience::default(), experience_rules())
}

pub fn education_form() -> FormEngine<Education> {
    FormEngine::new(Education::default(), education_rules())
}

pub fn language_form() -> FormEngine<Language> {
    FormEngine::new(Language::default(), language_rules())
}

pub fn skill_form() -> FormEngine<Skill> {
    FormEngine::new(Skill::default(), skill_rules())
}

pub fn hobby_form() -> FormEngine<Hobby> {
    FormEngine::new(Hobby::default(), hobby_rules())
}

/// One failed rule found while checking a whole document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub section: &'static str,
    /// Position in the list section, `None` for personal details
    pub index: Option<usize>,
    pub field: &'static str,
    pub message: String,
}

fn collect_issues<T: FormRecord>(
    section: &'static str,
    index: Option<usize>,
    record: &T,
    rules: &RuleSet<T::Field>,
    issues: &mut Vec<FieldIssue>,
) {
    for field in rules.fields() {
        if let Some(Some(message)) = rules.check(field, record.get(field)) {
            issues.push(FieldIssue {
                section,
                index,
                field: field.name(),
                message,
            });
        }
    }
}

fn collect_list_issues<T: FormRecord>(
    section: &'static str,
    records: &[T],
    rules: &RuleSet<T::Field>,
    issues: &mut Vec<FieldIssue>,
) {
    for (index, record) in records.iter().enumerate() {
        collect_issues(section, Some(index), record, rules, issues);
    }
}

/// Run every section's rule set over a whole document.
///
/// Useful for documents that did not go through the editors, such as imported
/// JSON or template data.
pub fn validate_document(document: &Document) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    collect_issues(
        "personalDetails",
        None,
        &document.personal_details,
        &personal_details_rules(),
        &mut issues,
    );
    collect_list_issues("experiences", &document.experiences, &experience_rules(), &mut issues);
    collect_list_issues("educations", &document.educations, &education_rules(), &mut issues);
    collect_list_issues("languages", &document.languages, &language_rules(), &mut issues);
    collect_list_issues("skills", &document.skills, &skill_rules(), &mut issues);
    collect_list_issues("hobbies", &document.hobbies, &hobby_rules(), &mut issues);
    issues
}
