//! Local key-value persistence.
//!
//! The UI remembers two values across sessions: the API credential and
//! whether the credential field shows its contents. Both live in a flat TOML
//! string table at `${ACTUALLY_HOME}/storage.toml`.
//!
//! [`Preferences`] wraps any [`KeyValueStore`] and never fails: read or write
//! errors are logged and the caller gets the default value.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

use crate::config::paths;

/// Key holding the API credential.
pub const CREDENTIAL_KEY: &str = "api_key";

/// Key holding the "show credential in plain text" preference.
pub const SHOW_CREDENTIAL_KEY: &str = "show_api_key";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to serialize storage: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// String key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` when the key is absent.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// File-backed store: one TOML table of strings.
///
/// Every `set` rewrites the whole file through a temp file in the same
/// directory followed by a rename.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default `${ACTUALLY_HOME}/storage.toml`.
    pub fn open_default() -> Self {
        Self::new(paths::storage_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_table(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        toml::from_str(&contents).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn write_table(&self, table: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let contents = toml::to_string(table)?;
        let write_err = |source| StorageError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_table()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut table = self.read_table()?;
        table.insert(key.to_string(), value.to_string());
        self.write_table(&table)
    }
}

/// In-memory store, mainly for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed, infallible view over a store.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored credential, or an empty string when absent or unreadable.
    pub fn credential(&self) -> String {
        self.get(CREDENTIAL_KEY).unwrap_or_default()
    }

    /// Persists the credential. Returns whether the write succeeded.
    pub fn set_credential(&self, credential: &str) -> bool {
        self.set(CREDENTIAL_KEY, credential.trim())
    }

    /// Whether the credential field should show plain text. Defaults to hidden.
    pub fn show_credential(&self) -> bool {
        match self.get(SHOW_CREDENTIAL_KEY).as_deref() {
            Some("true") => true,
            Some("false") | None => false,
            Some(other) => {
                tracing::warn!(key = SHOW_CREDENTIAL_KEY, value = other, "ignoring invalid stored flag");
                false
            }
        }
    }

    /// Persists the show-credential flag. Returns whether the write succeeded.
    pub fn set_show_credential(&self, show: bool) -> bool {
        self.set(SHOW_CREDENTIAL_KEY, if show { "true" } else { "false" })
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => {
                tracing::debug!(key, found = value.is_some(), "read preference");
                value
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read preference");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> bool {
        match self.store.set(key, value) {
            Ok(()) => {
                tracing::debug!(key, "stored preference");
                true
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to store preference");
                false
            }
        }
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    /// Store whose every operation fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Read {
                path: PathBuf::from("broken.toml"),
                source: std::io::Error::other("disk on fire"),
            })
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write {
                path: PathBuf::from("broken.toml"),
                source: std::io::Error::other("disk on fire"),
            })
        }
    }

    #[test]
    fn test_file_store_missing_file_reads_as_absent() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.toml"));
        assert_eq!(store.get(CREDENTIAL_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_set_then_get_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.toml");

        FileStore::new(&path).set(CREDENTIAL_KEY, "sk-test").unwrap();
        FileStore::new(&path).set(SHOW_CREDENTIAL_KEY, "true").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(CREDENTIAL_KEY).unwrap().as_deref(), Some("sk-test"));
        assert_eq!(reopened.get(SHOW_CREDENTIAL_KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_file_store_corrupt_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.toml");
        fs::write(&path, "api_key = ").unwrap();

        let err = FileStore::new(&path).get(CREDENTIAL_KEY).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
    }

    #[test]
    fn test_preferences_defaults_when_empty() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.credential(), "");
        assert!(!prefs.show_credential());
    }

    #[test]
    fn test_preferences_round_trip() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        assert!(prefs.set_credential("  sk-abc \n"));
        assert!(prefs.set_show_credential(true));

        assert_eq!(prefs.credential(), "sk-abc");
        assert!(prefs.show_credential());

        assert!(prefs.set_show_credential(false));
        assert!(!prefs.show_credential());
    }

    #[test]
    fn test_preferences_swallow_store_failures() {
        let prefs = Preferences::new(Arc::new(BrokenStore));
        assert_eq!(prefs.credential(), "");
        assert!(!prefs.show_credential());
        assert!(!prefs.set_credential("sk"));
        assert!(!prefs.set_show_credential(true));
    }

    #[test]
    fn test_preferences_invalid_flag_falls_back_to_hidden() {
        let store = MemoryStore::new();
        store.set(SHOW_CREDENTIAL_KEY, "yes please").unwrap();
        let prefs = Preferences::new(Arc::new(store));
        assert!(!prefs.show_credential());
    }
}
