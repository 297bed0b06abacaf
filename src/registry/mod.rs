//! JSON-file registry of processed documents.
//!
//! The registry is one JSON object mapping document id to record. It is read
//! fully into memory when opened and rewritten fully on every mutation. Writes
//! go to a temporary file in the same directory which is then renamed over the
//! backing file, so a crash mid-write leaves the previous content intact.
//!
//! There is no cross-process locking: two processes saving at the same time
//! race and the last writer wins.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{DocumentRecord, Domain};

/// In-memory view of the registry.
pub type RecordMap = BTreeMap<String, DocumentRecord>;

/// Errors from registry I/O.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("registry I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize registry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("stored file for '{id}' does not exist: {path}")]
    MissingArtifact { id: String, path: PathBuf },
}

impl RegistryError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Owned store for document records backed by a single JSON file.
#[derive(Debug)]
pub struct Registry {
    path: PathBuf,
    records: RecordMap,
}

impl Registry {
    /// Open the registry at `path`, loading any existing records.
    ///
    /// A missing file is an empty registry; the file is created on first save.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RegistryError> {
        let path = path.into();
        let records = load_records(&path)?;
        info!(
            "Opened registry {} ({} records)",
            path.display(),
            records.len()
        );
        Ok(Self { path, records })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the backing file without touching the in-memory records.
    pub fn load(&self) -> Result<RecordMap, RegistryError> {
        load_records(&self.path)
    }

    /// Overwrite the backing file with `records`.
    pub fn save(&self, records: &RecordMap) -> Result<(), RegistryError> {
        save_records(&self.path, records)
    }

    /// Insert a record and persist the registry.
    ///
    /// An existing record with the same id is replaced and returned. If the
    /// save fails the in-memory state is rolled back.
    pub fn insert(
        &mut self,
        record: DocumentRecord,
    ) -> Result<Option<DocumentRecord>, RegistryError> {
        if !record.stored_path.exists() {
            return Err(RegistryError::MissingArtifact {
                id: record.id.clone(),
                path: record.stored_path.clone(),
            });
        }

        let id = record.id.clone();
        let previous = self.records.insert(id.clone(), record);

        if let Err(e) = self.save(&self.records) {
            match previous {
                Some(prev) => {
                    self.records.insert(id, prev);
                }
                None => {
                    self.records.remove(&id);
                }
            }
            return Err(e);
        }

        if previous.is_some() {
            debug!("Replaced record {}", id);
        } else {
            debug!("Inserted record {}", id);
        }
        Ok(previous)
    }

    /// Remove a record and persist the registry.
    ///
    /// With `delete_file`, the stored upload is deleted too unless another
    /// record still points at it.
    pub fn remove(
        &mut self,
        id: &str,
        delete_file: bool,
    ) -> Result<Option<DocumentRecord>, RegistryError> {
        let Some(removed) = self.records.remove(id) else {
            return Ok(None);
        };

        if let Err(e) = self.save(&self.records) {
            self.records.insert(removed.id.clone(), removed);
            return Err(e);
        }

        if delete_file && !self.is_referenced(&removed.stored_path) {
            match std::fs::remove_file(&removed.stored_path) {
                Ok(()) => debug!("Deleted {}", removed.stored_path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(
                    "Failed to delete {}: {}",
                    removed.stored_path.display(),
                    e
                ),
            }
        }

        Ok(Some(removed))
    }

    pub fn get(&self, id: &str) -> Option<&DocumentRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any record's stored file is `path`.
    pub fn is_referenced(&self, path: &Path) -> bool {
        self.records.values().any(|r| r.stored_path == path)
    }

    /// Records ordered by `created_at` (then id), optionally restricted to a domain.
    pub fn list(&self, filter: Option<Domain>) -> Vec<&DocumentRecord> {
        let mut out: Vec<&DocumentRecord> = self
            .records
            .values()
            .filter(|r| filter.map_or(true, |d| r.domain == d))
            .collect();
        out.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        out
    }

    pub fn records(&self) -> &RecordMap {
        &self.records
    }
}

/// Read and parse a registry file. Missing file means an empty registry.
pub fn load_records(path: &Path) -> Result<RecordMap, RegistryError> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Registry {} not found, starting empty", path.display());
            return Ok(RecordMap::new());
        }
        Err(e) => return Err(RegistryError::io(path, e)),
    };

    let records: RecordMap =
        serde_json::from_slice(&bytes).map_err(|e| RegistryError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if let Some((key, record)) = records.iter().find(|(k, r)| **k != r.id) {
        return Err(RegistryError::Corrupt {
            path: path.to_path_buf(),
            reason: format!("entry '{}' holds record with id '{}'", key, record.id),
        });
    }

    Ok(records)
}

/// Serialize `records` and atomically replace the file at `path`.
pub fn save_records(path: &Path, records: &RecordMap) -> Result<(), RegistryError> {
    let mut json = serde_json::to_vec_pretty(records)?;
    json.push(b'\n');

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| RegistryError::io(&dir, e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| RegistryError::io(&dir, e))?;
    tmp.write_all(&json)
        .map_err(|e| RegistryError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| RegistryError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| RegistryError::io(path, e.error))?;

    debug!("Saved {} records to {}", records.len(), path.display());
    Ok(())
}
