//! Atomic file operations with ACID guarantees.
//!
//! Provides a thin layer for safe concurrent access to JSON and TOML
//! documents.

use pepe_core::error::PepeError;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during atomic file operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Lock error: {0}")]
    Lock(String),
}

impl From<StorageError> for PepeError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(e) => e.into(),
            StorageError::Json(e) => e.into(),
            StorageError::TomlDe(e) => e.into(),
            StorageError::TomlSer(e) => e.into(),
            StorageError::Lock(message) => PepeError::data_access(message),
        }
    }
}

/// On-disk encoding of an [`AtomicFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    fn encode<T: Serialize>(self, data: &T) -> Result<String, StorageError> {
        Ok(match self {
            FileFormat::Json => serde_json::to_string_pretty(data)?,
            FileFormat::Toml => toml::to_string_pretty(data)?,
        })
    }

    fn decode<T: DeserializeOwned>(self, content: &str) -> Result<T, StorageError> {
        Ok(match self {
            FileFormat::Json => serde_json::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
        })
    }
}

/// A handle to an atomic document file.
///
/// Provides:
/// - **Atomicity**: Updates are all-or-nothing via tmp file + atomic rename
/// - **Consistency**: Schema validation on load/save
/// - **Isolation**: File locking prevents concurrent modifications
/// - **Durability**: Explicit fsync before rename
#[derive(Debug, Clone)]
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    _phantom: PhantomData<T>,
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf, format: FileFormat) -> Self {
        Self {
            path,
            format,
            _phantom: PhantomData,
        }
    }

    pub fn json(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Json)
    }

    pub fn toml(path: PathBuf) -> Self {
        Self::new(path, FileFormat::Toml)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        self.format.decode(&content).map(Some)
    }

    /// Saves data atomically (tmp file + fsync + rename) under the file lock.
    pub fn save(&self, data: &T) -> Result<(), StorageError> {
        let _lock = FileLock::acquire(&self.path)?;
        self.write_unlocked(data)
    }

    /// Performs a locked read-modify-write.
    ///
    /// The file is reloaded while the lock is held, so changes written by
    /// another process since this one last read it are kept. A missing or
    /// undecodable document is replaced by `fallback`.
    ///
    /// # Returns
    ///
    /// The data as written back.
    pub fn update<F>(&self, fallback: T, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut T),
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = match self.load() {
            Ok(Some(data)) => data,
            Ok(None) => fallback,
            Err(e @ (StorageError::Json(_) | StorageError::TomlDe(_))) => {
                tracing::warn!(
                    target: "storage",
                    "Overwriting unreadable {}: {}",
                    self.path.display(),
                    e
                );
                fallback
            }
            Err(e) => return Err(e),
        };
        f(&mut data);
        self.write_unlocked(&data)?;
        Ok(data)
    }

    fn write_unlocked(&self, data: &T) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let encoded = self.format.encode(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(encoded.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, StorageError> {
        let invalid = |message: &str| {
            StorageError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, message.to_string()))
        };
        let parent = self.path.parent().ok_or_else(|| invalid("Path has no parent directory"))?;
        let file_name = self.path.file_name().ok_or_else(|| invalid("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// A file lock guard that releases the lock when dropped.
///
/// The lock file itself is left in place. Removing it on drop would let a
/// waiter hold a lock on an unlinked inode while a newcomer locks a fresh
/// file at the same path.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, StorageError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| StorageError::Lock(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        name: String,
        count: u32,
    }

    fn counter(count: u32) -> Counter {
        Counter {
            name: "sets".to_string(),
            count,
        }
    }

    #[test]
    fn test_json_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Counter>::json(temp_dir.path().join("data.json"));

        file.save(&counter(42)).unwrap();
        assert_eq!(file.load().unwrap(), Some(counter(42)));
    }

    #[test]
    fn test_toml_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Counter>::toml(temp_dir.path().join("nested/config.toml"));

        file.save(&counter(7)).unwrap();
        let raw = fs::read_to_string(file.path()).unwrap();
        assert!(raw.contains("count = 7"));
        assert_eq!(file.load().unwrap(), Some(counter(7)));
    }

    #[test]
    fn test_missing_and_empty_files_load_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        let file = AtomicFile::<Counter>::json(path.clone());
        assert!(file.load().unwrap().is_none());

        fs::write(&path, "  \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_applies_to_default_then_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Counter>::json(temp_dir.path().join("data.json"));

        let written = file.update(counter(0), |c| c.count += 10).unwrap();
        assert_eq!(written.count, 10);
        file.update(counter(0), |c| c.count += 5).unwrap();
        assert_eq!(file.load().unwrap().unwrap().count, 15);
    }

    #[test]
    fn test_update_rereads_changes_made_through_another_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        let ours = AtomicFile::<Counter>::json(path.clone());
        let theirs = AtomicFile::<Counter>::json(path);

        ours.save(&counter(1)).unwrap();
        theirs.save(&counter(5)).unwrap();

        // The fallback is a stale in-memory copy and must not win.
        let written = ours.update(counter(1), |c| c.count += 1).unwrap();
        assert_eq!(written.count, 6);
        assert_eq!(theirs.load().unwrap().unwrap().count, 6);
    }

    #[test]
    fn test_update_replaces_corrupt_file_with_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();

        let file = AtomicFile::<Counter>::json(path);
        let written = file.update(counter(3), |c| c.count *= 2).unwrap();
        assert_eq!(written.count, 6);
        assert_eq!(file.load().unwrap(), Some(counter(6)));
    }

    #[cfg(unix)]
    #[test]
    fn test_concurrent_updates_are_not_lost() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        AtomicFile::<Counter>::json(path.clone()).save(&counter(0)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let file = AtomicFile::<Counter>::json(path.clone());
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        file.update(counter(0), |c| c.count += 1).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let file = AtomicFile::<Counter>::json(path);
        assert_eq!(file.load().unwrap().unwrap().count, 80);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<Counter>::json(temp_dir.path().join("data.json"));
        file.save(&counter(1)).unwrap();
        assert!(!temp_dir.path().join(".data.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_maps_to_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();
        let err: PepeError = AtomicFile::<Counter>::json(path).load().unwrap_err().into();
        assert!(matches!(err, PepeError::Serialization { .. }));
    }
}
