//! Durable key/value storage for client-side state.
//!
//! Mirrors the shape of browser `localStorage`: string values under string
//! keys, read with [`Storage::get_item`] and overwritten whole with
//! [`Storage::set_item`]. The cart store keeps its JSON snapshot under
//! [`CART_STORAGE_KEY`].
//!
//! [`FileStorage`] keeps one file per key inside a directory. Writes go to a
//! temporary file that is renamed over the target, so a crash mid-write
//! never leaves a truncated value behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Storage key holding the serialized cart.
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Errors raised by storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backend refused the write.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A durable string key/value store.
pub trait Storage: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value could not be made durable.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// File-backed storage: one file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Directory holding the stored values.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for `key`. Keys are percent-encoded so any string is safe.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");

        let write = || -> io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };

        write().map_err(|source| {
            let _ = fs::remove_file(&tmp);
            StorageError::Io {
                path: path.clone(),
                source,
            }
        })?;

        tracing::debug!(key, path = %path.display(), bytes = value.len(), "Stored item");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.get_item(CART_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.set_item(CART_STORAGE_KEY, "[]").unwrap();
        storage.set_item(CART_STORAGE_KEY, r#"[{"id":1}]"#).unwrap();

        assert_eq!(
            storage.get_item(CART_STORAGE_KEY).unwrap().as_deref(),
            Some(r#"[{"id":1}]"#)
        );
    }

    #[test]
    fn test_key_is_percent_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        let path = storage.path_for(CART_STORAGE_KEY);
        assert_eq!(path.file_name().unwrap(), "%40RocketShoes%3Acart.json");
        assert_eq!(path.parent().unwrap(), dir.path());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        storage.set_item("a", "1").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("a.json")]);
    }

    #[test]
    fn test_open_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state").join("cart");
        let storage = FileStorage::open(&nested).unwrap();
        assert!(storage.dir().is_dir());
    }

    #[test]
    fn test_write_into_removed_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("gone");
        let storage = FileStorage::open(&root).unwrap();
        fs::remove_dir_all(&root).unwrap();

        let err = storage.set_item("a", "1").unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
