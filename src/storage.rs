//! Storage of uploaded files on disk.
//!
//! Uploads are content-addressed: the stored name combines the sanitized
//! original stem with a prefix of the SHA-256 hash, under a two-level
//! directory keyed by the first two hash characters. The same name is used as
//! the document id, so re-uploading identical bytes maps onto the same record.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::models::DocumentRecord;

/// Number of hash characters kept in ids and stored filenames.
const HASH_PREFIX_LEN: usize = 12;

/// Maximum characters kept from the original filename stem.
const MAX_STEM_CHARS: usize = 60;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to store upload at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file handed to the pipeline.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as provided by the user.
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read an upload from a local file.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self { filename, bytes })
    }
}

/// Result of persisting an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Document id derived from the name and content.
    pub id: String,
    pub path: PathBuf,
    pub content_hash: String,
    pub mime_type: String,
    /// False when an identical file was already on disk.
    pub newly_written: bool,
}

/// Directory of stored uploads.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the upload to its content-addressed location.
    pub fn store(&self, upload: &Upload) -> Result<StoredUpload, StorageError> {
        let content_hash = DocumentRecord::compute_hash(&upload.bytes);
        let mime_type = detect_mime(&upload.bytes, &upload.filename);
        let (stem, original_ext) = split_filename(&upload.filename);
        let extension = match mime_to_extension(&mime_type) {
            "bin" => original_ext.unwrap_or_else(|| "bin".to_string()),
            ext => ext.to_string(),
        };

        let id = document_id(&stem, &content_hash);
        let path = content_storage_path(&self.dir, &content_hash, &id, &extension);

        if path.exists() {
            debug!("Upload already stored at {}", path.display());
            return Ok(StoredUpload {
                id,
                path,
                content_hash,
                mime_type,
                newly_written: false,
            });
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(&path, &upload.bytes).map_err(|e| StorageError::Io {
            path: path.clone(),
            source: e,
        })?;
        debug!("Stored upload {} at {}", upload.filename, path.display());

        Ok(StoredUpload {
            id,
            path,
            content_hash,
            mime_type,
            newly_written: true,
        })
    }

    /// Delete a stored upload that was written by this run.
    pub fn discard(&self, stored: &StoredUpload) {
        if !stored.newly_written {
            return;
        }
        if let Err(e) = std::fs::remove_file(&stored.path) {
            tracing::warn!("Failed to remove {}: {}", stored.path.display(), e);
        }
    }

    /// Path of a stored file relative to the store, with `/` separators.
    pub fn relative_path(&self, path: &Path) -> Option<String> {
        let rel = path.strip_prefix(&self.dir).ok()?;
        let parts: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

/// Construct the storage path for an upload.
///
/// `{dir}/{hash[0..2]}/{id}.{extension}`
pub fn content_storage_path(dir: &Path, content_hash: &str, id: &str, extension: &str) -> PathBuf {
    dir.join(&content_hash[..2])
        .join(format!("{}.{}", id, extension))
}

/// Document id for a filename stem and content hash.
pub fn document_id(stem: &str, content_hash: &str) -> String {
    let prefix_len = HASH_PREFIX_LEN.min(content_hash.len());
    format!("{}-{}", sanitize_stem(stem), &content_hash[..prefix_len])
}

/// Reduce a filename stem to characters safe in paths and URLs.
pub fn sanitize_stem(stem: &str) -> String {
    let mapped: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_STEM_CHARS)
        .collect();

    let trimmed = mapped.trim_matches('_');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a filename into stem and lowercase extension.
fn split_filename(filename: &str) -> (String, Option<String>) {
    let name = Path::new(filename)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            (stem.to_string(), Some(ext.to_ascii_lowercase()))
        }
        _ => (name, None),
    }
}

/// Detect MIME type from content, falling back to the filename extension.
pub fn detect_mime(bytes: &[u8], filename: &str) -> String {
    if let Some(kind) = infer::get(bytes) {
        return kind.mime_type().to_string();
    }
    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Map MIME type to file extension.
pub fn mime_to_extension(mime: &str) -> &'static str {
    match mime {
        "application/pdf" => "pdf",
        "text/plain" => "txt",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/tiff" => "tiff",
        "image/bmp" => "bmp",
        "image/webp" => "webp",
        _ => "bin",
    }
}
