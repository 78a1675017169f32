/*!
Résumé document aggregate and its section records.

The JSON field names are camelCase so that stored snapshots and JSON exports
keep the layout `{personalDetails, experiences, educations, languages, skills,
hobbies, theme}`.
*/

use serde::{Deserialize, Serialize};

/// Theme applied when nothing else has been chosen
pub const DEFAULT_THEME: &str = "light";

/// Palette offered by the editor. The document itself accepts any string.
pub const THEMES: &[&str] = &[
    "light",
    "dark",
    "cupcake",
    "bumblebee",
    "emerald",
    "corporate",
    "synthwave",
    "retro",
    "cyberpunk",
    "valentine",
    "garden",
    "luxury",
    "dracula",
];

/// Closed set of language proficiency levels
pub const PROFICIENCY_LEVELS: &[&str] = &["Débutant", "Intermédiaire", "Avancé"];

/// Returns true if `theme` is part of the editor palette
pub fn is_known_theme(theme: &str) -> bool {
    THEMES.contains(&theme)
}

/// Identity and contact block at the top of the résumé
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Placeholder only; the image bytes live in [`EditingSession`]
    pub photo_url: String,
    pub post_seeking: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub job_title: String,
    pub company_name: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub school: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Language {
    pub language: String,
    /// One of [`PROFICIENCY_LEVELS`] once validated by the language form
    pub proficiency: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Skill {
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Hobby {
    pub name: String,
}

/// The full résumé: personal details, every list section and the theme.
///
/// List sections keep insertion order and allow duplicates. A `Document` is
/// plain owned data, so cloning it yields an independent deep copy.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    pub personal_details: PersonalDetails,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub languages: Vec<Language>,
    pub skills: Vec<Skill>,
    pub hobbies: Vec<Hobby>,
    pub theme: String,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            personal_details: PersonalDetails::default(),
            experiences: Vec::new(),
            educations: Vec::new(),
            languages: Vec::new(),
            skills: Vec::new(),
            hobbies: Vec::new(),
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

fn remove_at<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}

impl Document {
    /// Create an empty document with the default theme
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_personal_details(&mut self, details: PersonalDetails) {
        self.personal_details = details;
    }

    pub fn update_experiences(&mut self, experiences: Vec<Experience>) {
        self.experiences = experiences;
    }

    pub fn update_educations(&mut self, educations: Vec<Education>) {
        self.educations = educations;
    }

    pub fn update_languages(&mut self, languages: Vec<Language>) {
        self.languages = languages;
    }

    pub fn update_skills(&mut self, skills: Vec<Skill>) {
        self.skills = skills;
    }

    pub fn update_hobbies(&mut self, hobbies: Vec<Hobby>) {
        self.hobbies = hobbies;
    }

    pub fn set_theme<S: Into<String>>(&mut self, theme: S) {
        self.theme = theme.into();
    }

    pub fn add_experience(&mut self, experience: Experience) {
        self.experiences.push(experience);
    }

    pub fn remove_experience(&mut self, index: usize) -> Option<Experience> {
        remove_at(&mut self.experiences, index)
    }

    pub fn add_education(&mut self, education: Education) {
        self.educations.push(education);
    }

    pub fn remove_education(&mut self, index: usize) -> Option<Education> {
        remove_at(&mut self.educations, index)
    }

    pub fn add_language(&mut self, language: Language) {
        self.languages.push(language);
    }

    pub fn remove_language(&mut self, index: usize) -> Option<Language> {
        remove_at(&mut self.languages, index)
    }

    pub fn add_skill(&mut self, skill: Skill) {
        self.skills.push(skill);
    }

    pub fn remove_skill(&mut self, index: usize) -> Option<Skill> {
        remove_at(&mut self.skills, index)
    }

    pub fn add_hobby(&mut self, hobby: Hobby) {
        self.hobbies.push(hobby);
    }

    pub fn remove_hobby(&mut self, index: usize) -> Option<Hobby> {
        remove_at(&mut self.hobbies, index)
    }

    /// Empty every section. The theme is a display preference and survives.
    pub fn reset_all(&mut self) {
        let theme = std::mem::take(&mut self.theme);
        *self = Self {
            theme,
            ..Self::default()
        };
    }

    /// Replace every section, theme included, with a copy of `data`
    pub fn load_snapshot(&mut self, data: &Document) {
        *self = data.clone();
    }

    /// True when no section carries any content
    pub fn is_empty(&self) -> bool {
        self.personal_details == PersonalDetails::default()
            && self.experiences.is_empty()
            && self.educations.is_empty()
            && self.languages.is_empty()
            && self.skills.is_empty()
            && self.hobbies.is_empty()
    }
}

/// Profile picture held by the editor. Never written into a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// The live document being edited together with its session-only state
#[derive(Debug, Clone, Default)]
pub struct EditingSession {
    pub document: Document,
    pub profile_image: Option<ProfileImage>,
}

impl EditingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: Document) -> Self {
        Self {
            document,
            profile_image: None,
        }
    }

    pub fn set_profile_image(&mut self, image: Option<ProfileImage>) {
        self.profile_image = image;
    }

    /// Clear the document sections and the profile image
    pub fn reset_all(&mut self) {
        self.document.reset_all();
        self.profile_image = None;
    }
}
