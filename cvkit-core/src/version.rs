/*!
Named snapshots of a résumé document.
*/

use crate::document::Document;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Name used when the caller does not provide one
pub const DEFAULT_VERSION_NAME: &str = "Version";

/// Source of opaque, collision-resistant version identifiers
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// A saved copy of the document, immutable once created.
///
/// Serialized as `{id, name, date, data}` where `date` is an ISO-8601 UTC
/// timestamp with millisecond precision.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Version {
    id: String,
    name: String,
    #[serde(serialize_with = "serialize_iso_millis")]
    date: DateTime<Utc>,
    data: Document,
}

fn serialize_iso_millis<S: Serializer>(
    date: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl Version {
    /// Snapshot `data` now under the given id and name.
    ///
    /// The document is cloned, so later edits to `data` never reach the
    /// snapshot.
    pub fn new<S1, S2>(id: S1, name: S2, data: &Document) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            // Truncated so the value survives a round trip through storage
            date: Utc::now().trunc_subsecs(3),
            data: data.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn data(&self) -> &Document {
        &self.data
    }

    pub fn into_data(self) -> Document {
        self.data
    }
}
