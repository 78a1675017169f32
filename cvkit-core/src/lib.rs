/*!
# CVKit Core

Data layer of a résumé builder: form editing with field validation, named
snapshots ("versions") persisted in a key-value substrate, and export to JSON,
HTML or PDF.

The crate provides:

- A [`Document`] aggregate holding personal details, list sections and a theme
- A generic [`FormEngine`] with per-field rules for every record type
- A [`VersionStore`] keeping ordered snapshots and a "current version" pointer
- Pluggable key-value substrates ([`MemoryStore`], [`FileStore`])
- Export helpers and a small catalog of starter templates

## Architecture

The version store depends only on the [`KeyValueStore`] port. Adapters decide
where strings end up; the store decides what they mean. Storage failures are
absorbed at the store boundary and surface as empty reads, a `warn` log record
and, with the `metrics` feature, a counter increment.

## Usage

```rust
use cvkit_core::{skill_form, Document, MemoryStore, SkillField, VersionStore};

let mut document = Document::new();
let mut form = skill_form();
form.set_field(SkillField::Name, "Rust");
if let Some(skill) = form.submit() {
    document.add_skill(skill);
}

let store = VersionStore::new(MemoryStore::new());
let saved = store.save_version(&document, Some("Candidature"));
assert_eq!(saved.name(), "Candidature 1");

let mut restored = Document::new();
store.load_version(saved.id(), &mut restored);
assert_eq!(restored, document);
```
*/

pub mod config;
pub mod document;
pub mod error;
pub mod export;
pub mod form;
pub mod observability;
pub mod storage;
pub mod store;
pub mod templates;
pub mod version;

#[cfg(test)]
mod error_tests;

pub use config::{open_version_store, DynKeyValueStore, StoreBackend, StoreConfig};
pub use document::{
    Document, Education, EditingSession, Experience, Hobby, Language, PersonalDetails,
    ProfileImage, Skill,
};
pub use error::{CvError, Result};
pub use export::{ExportArtifact, ExportFormat, Exporter, PageGeometry, PdfRenderer};
pub use form::{
    education_form, experience_form, hobby_form, language_form, personal_details_form,
    skill_form, validate_document, EducationField, ExperienceField, FieldIssue, FormEngine,
    FormField, FormRecord, HobbyField, LanguageField, PersonalDetailsField, RuleSet, SkillField,
};
pub use observability::{init_default_observability, init_tracing, LogFormat};
#[cfg(feature = "file")]
pub use storage::FileStore;
pub use storage::{KeyValueStore, MemoryStore};
pub use store::{StorageKeys, VersionStore};
pub use templates::{apply_template, find_template, templates, Template};
pub use version::{IdGenerator, UuidGenerator, Version};
