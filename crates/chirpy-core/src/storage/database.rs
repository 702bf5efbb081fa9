//! JSON file backed storage engine

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::Document;
use crate::error::StorageError;

/// A single JSON document on disk, guarded by a reader-writer lock.
///
/// [`Database::load`] and [`Database::persist`] each lock for one call only.
/// Repositories mutate through [`Database::update`], which holds the write lock
/// across the whole load-mutate-persist sequence so concurrent writers cannot
/// overwrite each other's changes.
#[derive(Debug)]
pub struct Database {
    path: PathBuf,
    lock: RwLock<()>,
}

impl Database {
    /// Create a fresh database at `path`, truncating anything already there
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Self::at(path);
        if let Some(parent) = db.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        db.persist(&Document::new())?;
        tracing::info!(path = %db.path.display(), "created empty database");
        Ok(db)
    }

    /// Open an existing database, creating an empty one if none exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if !path.exists() {
            return Self::create(path);
        }

        let db = Self::at(path);
        // Surface a corrupt file at startup rather than on the first request
        let doc = db.load()?;
        tracing::info!(
            path = %db.path.display(),
            chirps = doc.chirps.len(),
            users = doc.users.len(),
            "opened database"
        );
        Ok(db)
    }

    fn at(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the whole document
    pub fn load(&self) -> Result<Document, StorageError> {
        let _guard = self.read_guard()?;
        self.read_file()
    }

    /// Encode and write the whole document
    pub fn persist(&self, doc: &Document) -> Result<(), StorageError> {
        let _guard = self.write_guard()?;
        self.write_file(doc)
    }

    /// Run `f` against a snapshot of the document while holding the shared lock
    pub fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Document) -> Result<T, E>,
        E: From<StorageError>,
    {
        let _guard = self.read_guard()?;
        let doc = self.read_file()?;
        f(&doc)
    }

    /// Load, mutate, and persist as one exclusive critical section.
    ///
    /// The document is written back only if `f` returns `Ok`; on `Err` the file
    /// is left untouched.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Document) -> Result<T, E>,
        E: From<StorageError>,
    {
        let _guard = self.write_guard()?;
        let mut doc = self.read_file()?;
        doc.reconcile_sequences();
        let value = f(&mut doc)?;
        self.write_file(&doc)?;
        Ok(value)
    }

    fn read_guard(&self) -> Result<RwLockReadGuard<'_, ()>, StorageError> {
        self.lock.read().map_err(|_| StorageError::Poisoned)
    }

    fn write_guard(&self) -> Result<RwLockWriteGuard<'_, ()>, StorageError> {
        self.lock.write().map_err(|_| StorageError::Poisoned)
    }

    fn read_file(&self) -> Result<Document, StorageError> {
        let data = fs::read(&self.path)?;
        serde_json::from_slice(&data).map_err(StorageError::Decode)
    }

    fn write_file(&self, doc: &Document) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(doc).map_err(StorageError::Encode)?;

        // Write beside the target and rename so readers never see a partial file
        let tmp = self.tmp_path();
        if let Err(err) = fs::write(&tmp, &data).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }

        tracing::debug!(bytes = data.len(), "persisted document");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
