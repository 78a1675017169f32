//! Configuration for selecting and opening the version store substrate
//!
//! A store is either kept in process memory (useful for tests and dry runs) or
//! written to a directory on the local filesystem, one file per key.

use crate::storage::{KeyValueStore, MemoryStore};
use crate::store::{StorageKeys, VersionStore, DEFAULT_KEY_PREFIX};
use crate::{CvError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// URI selecting the in-memory backend
pub const MEMORY_URI: &str = "memory://";

/// Directory used by the file backend when none is configured
pub const DEFAULT_STORE_DIR: &str = ".cvkit";

/// Type-erased substrate returned by [`open_version_store`]
pub type DynKeyValueStore = Box<dyn KeyValueStore + Send + Sync>;

/// Enumeration of supported storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map, lost on exit
    Memory,
    /// One file per key under `base_path`
    File,
}

/// Configuration structure for the version store substrate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory for the file backend (defaults to `.cvkit`)
    pub base_path: Option<PathBuf>,
    /// Prefix of the three storage keys (defaults to `cv_`)
    pub key_prefix: String,
}

impl StoreConfig {
    /// File backend in the default directory
    pub fn default_file() -> Self {
        StoreConfig {
            backend: StoreBackend::File,
            base_path: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn file<P: Into<PathBuf>>(base_path: P) -> Self {
        StoreConfig {
            base_path: Some(base_path.into()),
            ..Self::default_file()
        }
    }

    pub fn memory() -> Self {
        StoreConfig {
            backend: StoreBackend::Memory,
            base_path: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_key_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Parse a store location
    ///
    /// Supports formats:
    /// - `memory://` for the in-memory backend
    /// - `/local/path` or `./relative/path` for the file backend
    pub fn from_uri(uri: &str) -> Result<StoreConfig> {
        let uri = uri.trim();
        if uri == MEMORY_URI {
            return Ok(StoreConfig::memory());
        }
        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(CvError::validation(format!(
                "Unsupported store scheme '{scheme}://'"
            )));
        }
        if uri.is_empty() {
            return Err(CvError::validation("Store location must not be empty"));
        }
        Ok(StoreConfig::file(uri))
    }

    /// Directory the file backend writes to
    pub fn resolved_base_path(&self) -> PathBuf {
        self.base_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self
            .key_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(CvError::validation(format!(
                "Key prefix '{}' may only contain ASCII letters, digits, '_', '-' and '.'",
                self.key_prefix
            )));
        }

        match self.backend {
            StoreBackend::Memory => Ok(()),
            StoreBackend::File => {
                if !cfg!(feature = "file") {
                    return Err(CvError::validation(
                        "File backend requires the 'file' feature",
                    ));
                }
                if self
                    .base_path
                    .as_ref()
                    .is_some_and(|path| path.as_os_str().is_empty())
                {
                    return Err(CvError::validation("File backend requires a base path"));
                }
                Ok(())
            }
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::default_file()
    }
}

/// Open a version store for `config`
///
/// # Example
/// ```rust
/// use cvkit_core::{open_version_store, Document, StoreConfig};
///
/// let store = open_version_store(&StoreConfig::memory())?;
/// store.save_version(&Document::new(), Some("Brouillon"));
/// assert_eq!(store.versions().len(), 1);
/// # Ok::<(), cvkit_core::CvError>(())
/// ```
pub fn open_version_store(config: &StoreConfig) -> Result<VersionStore<DynKeyValueStore>> {
    config.validate()?;

    let backend: DynKeyValueStore = match config.backend {
        StoreBackend::Memory => Box::new(MemoryStore::new()),
        #[cfg(feature = "file")]
        StoreBackend::File => Box::new(crate::storage::FileStore::new(
            config.resolved_base_path(),
        )),
        #[cfg(not(feature = "file"))]
        StoreBackend::File => {
            return Err(CvError::validation(
                "File backend requires the 'file' feature",
            ))
        }
    };

    tracing::debug!(
        backend = ?config.backend,
        prefix = %config.key_prefix,
        "Opened version store"
    );
    Ok(VersionStore::new(backend).with_keys(StorageKeys::with_prefix(&config.key_prefix)))
}
