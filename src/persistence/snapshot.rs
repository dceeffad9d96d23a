//! Snapshot: save/load full store state to/from disk.

use crate::error::{MatchError, Result};
use crate::persistence::serialization::{self, StoreSnapshot, SNAPSHOT_VERSION};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Manages the on-disk snapshot for a store directory.
pub struct SnapshotManager {
    dir: PathBuf,
}

impl SnapshotManager {
    /// Create a snapshot manager for the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join("store.snapshot")
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join("manifest.json")
    }

    /// Save a store snapshot to disk.
    ///
    /// The record is written to a temp file in the same directory and
    /// renamed over the live file, so a crash mid-save leaves the previous
    /// snapshot intact.
    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let data = serialization::to_bincode(snapshot)?;
        let tmp = self.dir.join("store.snapshot.tmp");
        fs::write(&tmp, &data)?;
        fs::rename(&tmp, self.snapshot_path())?;

        // Human-readable metadata; advisory only, never read back.
        let manifest = serde_json::json!({
            "version": snapshot.version,
            "stored_count": snapshot.texts.len(),
            "dimension": snapshot.dimension,
        });
        let manifest_bytes = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| MatchError::Serialization(e.to_string()))?;
        fs::write(self.manifest_path(), &manifest_bytes)?;

        Ok(())
    }

    /// Load the store snapshot from disk, or return None if no snapshot
    /// exists.
    pub fn load(&self) -> Result<Option<StoreSnapshot>> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(None);
        }

        let data = fs::read(&path)?;
        let snapshot: StoreSnapshot = serialization::from_bincode(&data)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(MatchError::Serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        Ok(Some(snapshot))
    }

    /// Remove the snapshot and manifest from disk. Missing files are not
    /// an error.
    pub fn delete(&self) -> Result<()> {
        for path in [self.snapshot_path(), self.manifest_path()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Check if a snapshot exists.
    pub fn exists(&self) -> bool {
        self.snapshot_path().exists()
    }
}
