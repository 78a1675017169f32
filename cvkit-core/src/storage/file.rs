/*!
Filesystem storage adapter implementation.
*/

use super::KeyValueStore;
use crate::{CvError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Filesystem storage adapter
///
/// Each key is stored as one UTF-8 file directly under the base directory. The
/// directory is created on first write. Writes go through a temporary file in
/// the same directory and are renamed into place, so a reader never sees a
/// half-written versions list.
///
/// # Example
/// ```rust
/// use cvkit_core::storage::{FileStore, KeyValueStore};
///
/// # let dir = tempfile::tempdir().unwrap();
/// let store = FileStore::new(dir.path().join("cvkit"));
/// store.set("cv_current_version", "0b7c")?;
/// assert_eq!(store.get("cv_current_version")?, Some("0b7c".to_string()));
/// # Ok::<(), cvkit_core::CvError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `base_dir`
    ///
    /// Nothing is touched on disk until the first write.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolve the file backing `key`, rejecting keys that would escape the
    /// base directory
    fn resolve_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(CvError::storage(format!("Invalid storage key: {key:?}")));
        }
        Ok(self.base_dir.join(key))
    }

    /// Ensure the base directory exists, creating it if necessary
    fn ensure_base_dir(&self) -> Result<()> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir).map_err(|e| {
                CvError::storage(format!(
                    "Failed to create directory {}: {}",
                    self.base_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let full_path = self.resolve_path(key)?;

        if !full_path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&full_path).map(Some).map_err(|e| {
            CvError::storage(format!(
                "Failed to read {} from {}: {}",
                key,
                full_path.display(),
                e
            ))
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let full_path = self.resolve_path(key)?;
        self.ensure_base_dir()?;

        let mut temp = NamedTempFile::new_in(&self.base_dir)?;
        temp.write_all(value.as_bytes())?;
        temp.persist(&full_path).map_err(|e| {
            CvError::storage(format!(
                "Failed to write {} to {}: {}",
                key,
                full_path.display(),
                e.error
            ))
        })?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let full_path = self.resolve_path(key)?;

        if full_path.exists() {
            fs::remove_file(&full_path).map_err(|e| {
                CvError::storage(format!(
                    "Failed to delete {} at {}: {}",
                    key,
                    full_path.display(),
                    e
                ))
            })?;
        }

        Ok(())
    }
}
