/*!
Starter templates that pre-fill a document.
*/

use crate::document::{
    Document, Education, Experience, Hobby, Language, PersonalDetails, Skill,
};
use once_cell::sync::Lazy;
use tracing::debug;

/// A named, themed starter document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub theme: &'static str,
    pub personal_details: PersonalDetails,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub languages: Vec<Language>,
    pub skills: Vec<Skill>,
    pub hobbies: Vec<Hobby>,
}

impl Template {
    /// The template as a full document, theme included
    pub fn document(&self) -> Document {
        Document {
            personal_details: self.personal_details.clone(),
            experiences: self.experiences.clone(),
            educations: self.educations.clone(),
            languages: self.languages.clone(),
            skills: self.skills.clone(),
            hobbies: self.hobbies.clone(),
            theme: self.theme.to_string(),
        }
    }
}

fn s(value: &str) -> String {
    value.to_string()
}

fn names<T>(values: &[&str], make: impl Fn(String) -> T) -> Vec<T> {
    values.iter().map(|v| make(s(v))).collect()
}

static TEMPLATES: Lazy<Vec<Template>> = Lazy::new(|| {
    vec![
        Template {
            id: "developer",
            name: "Développeur Web",
            description: "Template idéal pour les développeurs web",
            theme: "corporate",
            personal_details: PersonalDetails {
                full_name: s("Alex Martin"),
                email: s("alex@example.com"),
                phone: s("06 12 34 56 78"),
                address: s("Paris, France"),
                photo_url: String::new(),
                post_seeking: s("Développeur Full Stack"),
                description: s("Développeur passionné avec 5 ans d'expérience..."),
            },
            experiences: vec![Experience {
                job_title: s("Développeur Full Stack Senior"),
                company_name: s("Tech Solutions"),
                start_date: s("2020-01-01"),
                end_date: s("2023-12-31"),
                description: s("Développement d'applications web avec React et Node.js..."),
            }],
            educations: vec![Education {
                school: s("École d'Ingénieurs"),
                degree: s("Master en Informatique"),
                start_date: s("2015-09-01"),
                end_date: s("2018-06-30"),
                description: s("Spécialisation en développement web et mobile"),
            }],
            languages: vec![Language {
                language: s("Anglais"),
                proficiency: s("Avancé"),
            }],
            skills: names(&["React", "TypeScript", "Node.js"], |name| Skill { name }),
            hobbies: names(
                &["Contribution Open Source", "Veille technologique"],
                |name| Hobby { name },
            ),
        },
        Template {
            id: "designer",
            name: "Designer UX/UI",
            description: "Template pour les designers et créatifs",
            theme: "luxury",
            personal_details: PersonalDetails {
                full_name: s("Sophie Dubois"),
                email: s("sophie@example.com"),
                phone: s("06 98 76 54 32"),
                address: s("Lyon, France"),
                photo_url: String::new(),
                post_seeking: s("Designer UX/UI Senior"),
                description: s("Designer créative spécialisée dans l'expérience utilisateur..."),
            },
            experiences: vec![Experience {
                job_title: s("Designer UX/UI"),
                company_name: s("Creative Studio"),
                start_date: s("2019-01-01"),
                end_date: s("2023-12-31"),
                description: s("Conception d'interfaces utilisateur et d'expériences digitales..."),
            }],
            educations: vec![Education {
                school: s("École de Design"),
                degree: s("Master en Design Numérique"),
                start_date: s("2016-09-01"),
                end_date: s("2019-06-30"),
                description: s("Formation en design d'interface et expérience utilisateur"),
            }],
            languages: vec![Language {
                language: s("Anglais"),
                proficiency: s("Avancé"),
            }],
            skills: names(&["Figma", "Adobe XD", "Sketch"], |name| Skill { name }),
            hobbies: names(&["Photographie", "Design graphique"], |name| Hobby { name }),
        },
    ]
});

/// The full template catalog
pub fn templates() -> &'static [Template] {
    &TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|t| t.id == id)
}

/// Replace every section of `document` and its theme with template `id`.
///
/// Returns false, leaving the document untouched, when no template has that id.
pub fn apply_template(id: &str, document: &mut Document) -> bool {
    match find_template(id) {
        Some(template) => {
            document.load_snapshot(&template.document());
            debug!(template = id, theme = template.theme, "Applied template");
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{is_known_theme, PROFICIENCY_LEVELS};

    #[test]
    fn test_catalog_ids() {
        let ids: Vec<_> = templates().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["developer", "designer"]);
    }

    #[test]
    fn test_templates_use_known_values() {
        for template in templates() {
            assert!(is_known_theme(template.theme), "{}", template.id);
            for lang in &template.languages {
                assert!(PROFICIENCY_LEVELS.contains(&lang.proficiency.as_str()));
            }
        }
    }

    #[test]
    fn test_apply_template_replaces_everything() {
        let mut doc = Document::new();
        doc.add_skill(Skill {
            name: "Cobol".to_string(),
        });

        assert!(apply_template("designer", &mut doc));
        assert_eq!(doc.theme, "luxury");
        assert_eq!(doc.personal_details.full_name, "Sophie Dubois");
        let skills: Vec<_> = doc.skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(skills, vec!["Figma", "Adobe XD", "Sketch"]);
    }

    #[test]
    fn test_apply_unknown_template_is_noop() {
        let mut doc = Document::new();
        doc.set_theme("dark");
        let before = doc.clone();

        assert!(!apply_template("astronaut", &mut doc));
        assert_eq!(doc, before);
    }
}
