/*!
Version store: named snapshots of the résumé with a "current" pointer.

The store keeps three independent entries in its key-value substrate:

| key                  | content                                   |
|----------------------|-------------------------------------------|
| `cv_first_visit`     | `"false"` once the first visit was seen   |
| `cv_versions`        | JSON array of `{id, name, date, data}`    |
| `cv_current_version` | raw id of the active version              |

Storage failures never reach the caller. Reads against a missing, failing or
corrupted substrate yield empty results and writes become no-ops; each absorbed
failure is logged at `warn` and counted.
*/

use crate::document::Document;
use crate::observability;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::version::{IdGenerator, UuidGenerator, Version, DEFAULT_VERSION_NAME};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Prefix applied to every key when none is configured
pub const DEFAULT_KEY_PREFIX: &str = "cv_";

/// Names of the three entries the store keeps in its substrate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub first_visit: String,
    pub versions: String,
    pub current_version: String,
}

impl StorageKeys {
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            first_visit: format!("{prefix}first_visit"),
            versions: format!("{prefix}versions"),
            current_version: format!("{prefix}current_version"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// Durable store of document versions
///
/// Every read-modify-write sequence runs under an internal lock, so a single
/// store can be shared between threads without losing updates. Separate
/// processes writing the same substrate are not coordinated.
///
/// # Example
/// ```rust
/// use cvkit_core::{Document, MemoryStore, VersionStore};
///
/// let store = VersionStore::new(MemoryStore::new());
/// let first = store.save_version(&Document::new(), None);
/// assert_eq!(first.name(), "Version 1");
/// assert_eq!(store.current_version().map(|v| v.id().to_string()), Some(first.id().to_string()));
///
/// store.delete_version(first.id());
/// assert!(store.versions().is_empty());
/// assert!(store.current_version().is_none());
/// ```
pub struct VersionStore<S: KeyValueStore> {
    backend: Option<S>,
    keys: StorageKeys,
    ids: Box<dyn IdGenerator>,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> VersionStore<S> {
    /// Create a store persisting into `backend` with the default keys and
    /// UUID identifiers
    pub fn new(backend: S) -> Self {
        Self::from_parts(Some(backend))
    }

    /// Create a store with no persistence context.
    ///
    /// Reads return empty results, writes are dropped, and
    /// [`is_first_visit`](Self::is_first_visit) always answers true.
    pub fn detached() -> Self {
        Self::from_parts(None)
    }

    fn from_parts(backend: Option<S>) -> Self {
        Self {
            backend,
            keys: StorageKeys::default(),
            ids: Box::new(UuidGenerator),
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_id_generator<G: IdGenerator + 'static>(mut self, ids: G) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn is_detached(&self) -> bool {
        self.backend.is_none()
    }

    /// Report whether this is the first time the substrate is used.
    ///
    /// Consume-once: the first call marks the substrate as visited and returns
    /// true, later calls return false. Without a working substrate the answer
    /// is always true so first-run flows are never blocked.
    pub fn is_first_visit(&self) -> bool {
        let _guard = self.critical_section();

        let Some(backend) = self.backend.as_ref() else {
            return true;
        };

        match backend.get(&self.keys.first_visit) {
            Ok(Some(_)) => false,
            Ok(None) => {
                self.write(&self.keys.first_visit, "false");
                true
            }
            Err(e) => {
                absorb("is_first_visit", &e);
                true
            }
        }
    }

    /// Snapshot `data` as a new version and make it current.
    ///
    /// If the versions list cannot be stored, the version is still returned but
    /// the current pointer is left as it was.
    ///
    /// The name is `"{name} {n}"` where `name` defaults to `"Version"` and `n`
    /// is the number of stored versions plus one. The counter follows the
    /// current list length, so deleting versions lets later saves reuse a
    /// number.
    pub fn save_version(&self, data: &Document, name: Option<&str>) -> Version {
        let _guard = self.critical_section();

        let mut versions = self.load_versions();
        let version = Version::new(
            self.ids.generate(),
            format!(
                "{} {}",
                name.unwrap_or(DEFAULT_VERSION_NAME),
                versions.len() + 1
            ),
            data,
        );

        versions.push(version.clone());
        // The pointer only moves once the list holding the new id is stored
        let Some(list_bytes) = self.store_versions(&versions) else {
            debug!(id = version.id(), "Version not persisted, current pointer kept");
            return version;
        };
        self.write(&self.keys.current_version, version.id());

        observability::record_version_saved(list_bytes);
        debug!(
            id = version.id(),
            name = version.name(),
            count = versions.len(),
            "Saved version"
        );
        version
    }

    /// All stored versions, oldest first
    pub fn versions(&self) -> Vec<Version> {
        self.load_versions()
    }

    /// Look up one version by id
    pub fn version(&self, id: &str) -> Option<Version> {
        self.load_versions().into_iter().find(|v| v.id() == id)
    }

    /// Raw value of the current-version pointer, dangling or not
    pub fn current_version_id(&self) -> Option<String> {
        self.read(&self.keys.current_version)
    }

    /// The version the current pointer refers to.
    ///
    /// A pointer to an id that is no longer stored yields `None`; it is not
    /// repaired here.
    pub fn current_version(&self) -> Option<Version> {
        let current_id = self.current_version_id()?;
        self.version(&current_id)
    }

    /// Point the current pointer at `id`.
    ///
    /// The id is not checked against the stored versions.
    pub fn set_current_version(&self, id: &str) {
        let _guard = self.critical_section();
        self.write(&self.keys.current_version, id);
        debug!(id, "Current version set");
    }

    /// Remove the version with `id`.
    ///
    /// If it was current, the pointer moves to the last remaining version, or
    /// is cleared when none remain. Returns false if no version had that id
    /// or the shortened list could not be stored.
    pub fn delete_version(&self, id: &str) -> bool {
        let _guard = self.critical_section();

        let mut versions = self.load_versions();
        let before = versions.len();
        versions.retain(|v| v.id() != id);
        if versions.len() == before {
            debug!(id, "Delete skipped, no such version");
            return false;
        }

        if self.store_versions(&versions).is_none() {
            return false;
        }

        if self.read(&self.keys.current_version).as_deref() == Some(id) {
            match versions.last() {
                Some(last) => {
                    self.write(&self.keys.current_version, last.id());
                }
                None => self.erase(&self.keys.current_version),
            }
        }

        observability::record_version_deleted();
        debug!(id, remaining = versions.len(), "Deleted version");
        true
    }

    /// Remove every version and the current pointer. The first-visit flag is
    /// kept.
    pub fn clear_all(&self) {
        let _guard = self.critical_section();
        self.erase(&self.keys.versions);
        self.erase(&self.keys.current_version);
        debug!("Cleared all versions");
    }

    /// Copy version `id` into `document` and make it current.
    ///
    /// Returns the loaded version, or `None` (leaving `document` untouched)
    /// when no version has that id.
    pub fn load_version(&self, id: &str, document: &mut Document) -> Option<Version> {
        let _guard = self.critical_section();

        let version = self.load_versions().into_iter().find(|v| v.id() == id)?;
        document.load_snapshot(version.data());
        self.write(&self.keys.current_version, version.id());
        debug!(id, "Loaded version");
        Some(version)
    }

    fn critical_section(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`, so a poisoned lock carries no broken state
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self, key: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                absorb("read", &e);
                None
            }
        }
    }

    /// Returns true when the value reached the substrate
    fn write(&self, key: &str, value: &str) -> bool {
        let Some(backend) = self.backend.as_ref() else {
            return false;
        };
        match backend.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                absorb("write", &e);
                false
            }
        }
    }

    fn erase(&self, key: &str) {
        if let Some(backend) = self.backend.as_ref() {
            if let Err(e) = backend.remove(key) {
                absorb("remove", &e);
            }
        }
    }

    fn load_versions(&self) -> Vec<Version> {
        let Some(raw) = self.read(&self.keys.versions) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(versions) => versions,
            Err(e) => {
                absorb("parse versions", &e);
                Vec::new()
            }
        }
    }

    /// Persist the list, returning the serialized size in bytes, or `None`
    /// when nothing was stored
    fn store_versions(&self, versions: &[Version]) -> Option<usize> {
        match serde_json::to_string(versions) {
            Ok(json) => self.write(&self.keys.versions, &json).then_some(json.len()),
            Err(e) => {
                absorb("serialize versions", &e);
                None
            }
        }
    }
}

impl VersionStore<MemoryStore> {
    /// Store backed by a fresh in-memory substrate
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

fn absorb(operation: &str, error: &dyn std::fmt::Display) {
    observability::record_storage_error();
    warn!(operation, error = %error, "Version store storage failure absorbed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Hobby, Skill};
    use crate::CvError;
    use mockall::mock;
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    /// Predictable ids for assertions
    struct SequentialIds(AtomicUsize);

    impl IdGenerator for SequentialIds {
        fn generate(&self) -> String {
            format!("v{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
        }
    }

    fn sequential_store() -> VersionStore<MemoryStore> {
        VersionStore::in_memory().with_id_generator(SequentialIds(AtomicUsize::new(0)))
    }

    #[test]
    fn test_default_names_follow_list_length() {
        let store = sequential_store();
        let doc = Document::new();

        let first = store.save_version(&doc, None);
        let second = store.save_version(&doc, None);
        assert_eq!(first.name(), "Version 1");
        assert_eq!(second.name(), "Version 2");

        store.delete_version(first.id());
        let third = store.save_version(&doc, None);
        assert_eq!(third.name(), "Version 2");
    }

    #[test]
    fn test_custom_name_still_gets_counter() {
        let store = sequential_store();
        store.save_version(&Document::new(), None);

        let named = store.save_version(&Document::new(), Some("Candidature Airbus"));
        assert_eq!(named.name(), "Candidature Airbus 2");
    }

    #[test]
    fn test_save_makes_version_current() {
        let store = sequential_store();
        let saved = store.save_version(&Document::new(), Some("X"));

        assert_eq!(store.current_version_id().as_deref(), Some("v1"));
        assert_eq!(store.current_version(), Some(saved));
    }

    #[test]
    fn test_saved_data_is_a_deep_copy() {
        let store = sequential_store();
        let mut doc = Document::new();
        doc.add_skill(Skill {
            name: "Rust".to_string(),
        });
        let at_save = doc.clone();

        store.save_version(&doc, Some("X"));
        doc.add_skill(Skill {
            name: "Go".to_string(),
        });
        doc.personal_details.full_name = "Changed".to_string();

        let current = store.current_version().unwrap();
        assert_eq!(current.data(), &at_save);
    }

    #[test]
    fn test_versions_keep_insertion_order() {
        let store = sequential_store();
        for _ in 0..4 {
            store.save_version(&Document::new(), None);
        }
        let ids: Vec<_> = store.versions().iter().map(|v| v.id().to_string()).collect();
        assert_eq!(ids, vec!["v1", "v2", "v3", "v4"]);
    }

    #[test]
    fn test_delete_current_repoints_to_last_remaining() {
        let store = sequential_store();
        let doc = Document::new();
        store.save_version(&doc, None);
        store.save_version(&doc, None);
        store.save_version(&doc, None);

        store.set_current_version("v2");
        assert!(store.delete_version("v2"));
        assert_eq!(store.current_version_id().as_deref(), Some("v3"));

        assert!(store.delete_version("v3"));
        assert_eq!(store.current_version_id().as_deref(), Some("v1"));

        assert!(store.delete_version("v1"));
        assert_eq!(store.current_version_id(), None);
        assert!(store.versions().is_empty());
    }

    #[test]
    fn test_delete_non_current_keeps_pointer() {
        let store = sequential_store();
        store.save_version(&Document::new(), None);
        store.save_version(&Document::new(), None);

        assert!(store.delete_version("v1"));
        assert_eq!(store.current_version_id().as_deref(), Some("v2"));
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let store = sequential_store();
        store.save_version(&Document::new(), None);

        assert!(!store.delete_version("nope"));
        assert_eq!(store.versions().len(), 1);
        assert_eq!(store.current_version_id().as_deref(), Some("v1"));
    }

    #[test]
    fn test_dangling_pointer_is_tolerated() {
        let store = sequential_store();
        store.save_version(&Document::new(), None);

        store.set_current_version("ghost");
        assert_eq!(store.current_version_id().as_deref(), Some("ghost"));
        assert!(store.current_version().is_none());
        // Reading does not repair the pointer
        assert_eq!(store.current_version_id().as_deref(), Some("ghost"));
    }

    #[test]
    fn test_first_visit_is_consumed_once() {
        let store = VersionStore::in_memory();
        assert!(store.is_first_visit());
        assert!(!store.is_first_visit());
        assert!(!store.is_first_visit());
    }

    #[test]
    fn test_first_visit_shared_across_store_instances() {
        let substrate = MemoryStore::new();
        assert!(VersionStore::new(substrate.clone()).is_first_visit());
        assert!(!VersionStore::new(substrate).is_first_visit());
    }

    #[test]
    fn test_clear_all_keeps_first_visit_flag() {
        let substrate = MemoryStore::new();
        let store = VersionStore::new(substrate.clone());
        store.is_first_visit();
        store.save_version(&Document::new(), None);

        store.clear_all();
        assert!(store.versions().is_empty());
        assert!(store.current_version_id().is_none());
        assert_eq!(substrate.get("cv_first_visit").unwrap(), Some("false".to_string()));
        assert!(!store.is_first_visit());
    }

    #[test]
    fn test_detached_store_fails_open() {
        let store = VersionStore::<MemoryStore>::detached();
        assert!(store.is_detached());
        assert!(store.is_first_visit());
        assert!(store.is_first_visit());

        let version = store.save_version(&Document::new(), None);
        assert_eq!(version.name(), "Version 1");
        assert!(store.versions().is_empty());
        assert!(store.current_version().is_none());
        assert!(!store.delete_version(version.id()));
        store.clear_all();
    }

    #[test]
    fn test_malformed_versions_read_as_empty() {
        let substrate = MemoryStore::new();
        substrate.set("cv_versions", "{not json").unwrap();
        substrate.set("cv_current_version", "v1").unwrap();

        let store = VersionStore::new(substrate);
        assert!(store.versions().is_empty());
        assert!(store.current_version().is_none());

        // A save starts a fresh list over the corrupted one
        let saved = store.save_version(&Document::new(), None);
        assert_eq!(saved.name(), "Version 1");
        assert_eq!(store.versions().len(), 1);
    }

    #[test]
    fn test_custom_key_prefix() {
        let substrate = MemoryStore::new();
        let store = VersionStore::new(substrate.clone()).with_keys(StorageKeys::with_prefix("demo_"));
        store.save_version(&Document::new(), None);

        assert!(substrate.get("demo_versions").unwrap().is_some());
        assert!(substrate.get("cv_versions").unwrap().is_none());
    }

    #[test]
    fn test_load_version_copies_into_document() {
        let store = sequential_store();
        let mut saved_doc = Document::new();
        saved_doc.add_hobby(Hobby {
            name: "Photographie".to_string(),
        });
        saved_doc.set_theme("garden");
        store.save_version(&saved_doc, None);
        store.save_version(&Document::new(), None);

        let mut live = Document::new();
        let loaded = store.load_version("v1", &mut live).unwrap();
        assert_eq!(loaded.id(), "v1");
        assert_eq!(live, saved_doc);
        assert_eq!(store.current_version_id().as_deref(), Some("v1"));

        assert!(store.load_version("missing", &mut live).is_none());
        assert_eq!(live, saved_doc);
    }

    mock! {
        Substrate {}
        impl KeyValueStore for Substrate {
            fn get(&self, key: &str) -> crate::Result<Option<String>>;
            fn set(&self, key: &str, value: &str) -> crate::Result<()>;
            fn remove(&self, key: &str) -> crate::Result<()>;
        }
    }

    #[test]
    fn test_failing_substrate_is_absorbed() {
        let mut substrate = MockSubstrate::new();
        substrate
            .expect_get()
            .returning(|_| Err(CvError::storage("quota exceeded")));
        substrate
            .expect_set()
            .returning(|_, _| Err(CvError::storage("quota exceeded")));
        substrate
            .expect_remove()
            .returning(|_| Err(CvError::storage("quota exceeded")));
        let store = VersionStore::new(substrate);

        assert!(store.is_first_visit());
        let version = store.save_version(&Document::new(), Some("X"));
        assert_eq!(version.name(), "X 1");
        assert!(store.versions().is_empty());
        assert!(store.current_version().is_none());
        store.set_current_version(version.id());
        store.clear_all();
    }

    #[test]
    fn test_save_writes_list_then_pointer() {
        let mut substrate = MockSubstrate::new();
        let mut seq = mockall::Sequence::new();
        substrate
            .expect_get()
            .with(eq("cv_versions"))
            .times(1)
            .returning(|_| Ok(None));
        substrate
            .expect_set()
            .withf(|key, value| key.to_string() == "cv_versions" && value.starts_with('['))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        substrate
            .expect_set()
            .withf(|key, value| key.to_string() == "cv_current_version" && value.to_string() == "v1")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let store =
            VersionStore::new(substrate).with_id_generator(SequentialIds(AtomicUsize::new(0)));
        store.save_version(&Document::new(), None);
    }

    #[test]
    fn test_concurrent_saves_are_not_lost() {
        let store = Arc::new(VersionStore::in_memory());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..5 {
                        store.save_version(&Document::new(), None);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let versions = store.versions();
        assert_eq!(versions.len(), 40);
        let mut names: Vec<_> = versions.iter().map(|v| v.name().to_string()).collect();
        names.dedup();
        assert_eq!(names.len(), 40);
        assert_eq!(
            store.current_version_id(),
            versions.last().map(|v| v.id().to_string())
        );
    }

    /// Shares data with a `MemoryStore` but refuses to write the versions list
    struct ListWritesFail(MemoryStore);

    impl KeyValueStore for ListWritesFail {
        fn get(&self, key: &str) -> crate::Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> crate::Result<()> {
            if key == "cv_versions" {
                return Err(CvError::storage("quota exceeded"));
            }
            self.0.set(key, value)
        }

        fn remove(&self, key: &str) -> crate::Result<()> {
            self.0.remove(key)
        }
    }

    #[test]
    fn test_failed_list_write_leaves_pointer_alone() {
        let substrate = MemoryStore::new();
        let store = VersionStore::new(ListWritesFail(substrate.clone()));

        let version = store.save_version(&Document::new(), None);
        assert_eq!(version.name(), "Version 1");
        assert!(store.versions().is_empty());
        assert_eq!(store.current_version_id(), None);

        // An earlier, successfully stored version stays current
        let healthy = VersionStore::new(substrate.clone())
            .with_id_generator(SequentialIds(AtomicUsize::new(0)));
        healthy.save_version(&Document::new(), None);
        store.save_version(&Document::new(), None);
        assert_eq!(store.current_version_id().as_deref(), Some("v1"));
        assert!(store.current_version().is_some());
    }

    #[test]
    fn test_failed_list_write_aborts_delete() {
        let substrate = MemoryStore::new();
        let healthy = VersionStore::new(substrate.clone())
            .with_id_generator(SequentialIds(AtomicUsize::new(0)));
        healthy.save_version(&Document::new(), None);
        healthy.save_version(&Document::new(), None);

        let store = VersionStore::new(ListWritesFail(substrate));
        assert!(!store.delete_version("v2"));
        assert_eq!(store.versions().len(), 2);
        assert_eq!(store.current_version_id().as_deref(), Some("v2"));
    }

    #[test]
    fn test_load_racing_delete_never_leaves_dangling_pointer() {
        for _ in 0..200 {
            let store = Arc::new(sequential_store());
            store.save_version(&Document::new(), None);
            store.save_version(&Document::new(), None);

            let loader = {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    let mut doc = Document::new();
                    store.load_version("v1", &mut doc);
                })
            };
            let deleter = {
                let store = Arc::clone(&store);
                thread::spawn(move || store.delete_version("v1"))
            };
            loader.join().unwrap();
            assert!(deleter.join().unwrap());

            assert_eq!(store.current_version_id().as_deref(), Some("v2"));
            assert!(store.current_version().is_some());
        }
    }
}
