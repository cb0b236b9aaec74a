//! String key-value persistence for the vault envelope.
//!
//! The controller only ever stores JSON strings under a handful of fixed
//! keys, so the store contract is deliberately small: no transactions, no
//! expiry, no listing.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::VaultError;

/// Minimal string store (`get` / `set` / `remove`).
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`VaultError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, VaultError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`VaultError`] if the backing medium cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), VaultError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`VaultError`] if the backing medium cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), VaultError>;
}

/// Check that `key` is usable as a store key (and as a file name).
///
/// # Errors
///
/// Returns `VaultError::Storage` for empty keys, keys starting with `.`, or
/// characters outside `[A-Za-z0-9._-]`.
pub fn validate_key(key: &str) -> Result<(), VaultError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(VaultError::Storage(format!("invalid store key: {key:?}")))
    }
}

// ── In-memory ─────────────────────────────────────────────────────

/// Process-local store, for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        validate_key(key)?;
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), VaultError> {
        validate_key(key)?;
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), VaultError> {
        validate_key(key)?;
        self.entries.remove(key);
        Ok(())
    }
}

// ── File-backed ───────────────────────────────────────────────────

/// One file per key inside a data directory.
///
/// Writes go to `{key}.tmp` and are renamed into place, so a crash never
/// leaves a half-written envelope behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns `VaultError::Io` if the directory cannot be created.
    pub fn open(dir: &Path) -> Result<Self, VaultError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Directory holding the store files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, VaultError> {
        validate_key(key)?;
        Ok(self.dir.join(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, VaultError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), VaultError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!("{key}.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), VaultError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
