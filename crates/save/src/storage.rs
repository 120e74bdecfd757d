//! Where encoded snapshots live.
//!
//! `FileStorage` writes through a temp file and renames it over the target so
//! a crash mid-write leaves the previous snapshot intact. `MemoryStorage`
//! keeps the bytes in a shared buffer; clones see the same slot.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use bevy::prelude::*;

use crate::save_codec::{decode_snapshot, encode_snapshot};
use crate::save_error::SaveError;
use crate::save_types::SaveSnapshot;

pub trait SnapshotStorage: Send + Sync + 'static {
    /// `Ok(None)` when nothing has been saved yet.
    fn read(&self) -> Result<Option<Vec<u8>>, SaveError>;
    fn write(&self, bytes: &[u8]) -> Result<(), SaveError>;
}

#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl SnapshotStorage for FileStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, SaveError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<(), SaveError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.tmp_path();
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(bytes))),
        }
    }

    /// Copy of the stored bytes.
    pub fn bytes(&self) -> Option<Vec<u8>> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl SnapshotStorage for MemoryStorage {
    fn read(&self) -> Result<Option<Vec<u8>>, SaveError> {
        Ok(self.bytes())
    }

    fn write(&self, bytes: &[u8]) -> Result<(), SaveError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.to_vec());
        Ok(())
    }
}

/// The backend used by the save systems.
#[derive(Resource)]
pub struct SaveStorage(pub Box<dyn SnapshotStorage>);

impl SaveStorage {
    pub fn new(storage: impl SnapshotStorage) -> Self {
        Self(Box::new(storage))
    }
}

/// Encodes `snapshot` and hands it to `storage`. Returns the byte count.
pub fn save_snapshot(
    storage: &dyn SnapshotStorage,
    snapshot: &SaveSnapshot,
) -> Result<usize, SaveError> {
    let bytes = encode_snapshot(snapshot);
    storage.write(&bytes)?;
    Ok(bytes.len())
}

pub fn load_snapshot(storage: &dyn SnapshotStorage) -> Result<SaveSnapshot, SaveError> {
    let bytes = storage.read()?.ok_or(SaveError::NoData)?;
    decode_snapshot(&bytes)
}
