//! Document records stored in the registry.
//!
//! A record is produced once, at the end of a successful processing run, and
//! is never edited afterwards. Re-processing the same upload replaces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use super::Domain;

/// Whether the AI summary/analysis stage produced usable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    #[default]
    Complete,
    /// The analysis call failed and the record was kept without it.
    Unavailable,
}

impl AnalysisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Unavailable => "unavailable",
        }
    }
}

/// One processed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Registry key, derived from the filename stem and content hash.
    pub id: String,
    /// Filename as uploaded.
    pub original_filename: String,
    /// Location of the persisted copy of the upload.
    pub stored_path: PathBuf,
    /// SHA-256 of the uploaded bytes.
    pub content_hash: String,
    /// Detected MIME type of the upload.
    pub mime_type: String,
    /// Number of pages that went through OCR, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Full OCR output.
    pub extracted_text: String,
    pub domain: Domain,
    /// Short AI-generated summary.
    pub summary: String,
    /// Detailed AI-generated analysis.
    pub analysis: String,
    #[serde(default)]
    pub analysis_status: AnalysisStatus,
    /// Model that produced the summary and analysis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// When the document was processed.
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Compute SHA-256 hash of content.
    pub fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    pub fn has_analysis(&self) -> bool {
        self.analysis_status == AnalysisStatus::Complete
    }

    /// First `max_chars` characters of the summary, for list views.
    pub fn summary_excerpt(&self, max_chars: usize) -> String {
        let trimmed = self.summary.trim();
        if trimmed.chars().count() <= max_chars {
            return trimmed.to_string();
        }
        let mut excerpt: String = trimmed.chars().take(max_chars).collect();
        excerpt.push('…');
        excerpt
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// Build a record with plausible field values for tests.
    pub fn record(id: &str, domain: Domain, day: u32) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            original_filename: format!("{}.png", id),
            stored_path: PathBuf::from(format!("/tmp/uploads/{}.png", id)),
            content_hash: DocumentRecord::compute_hash(id.as_bytes()),
            mime_type: "image/png".to_string(),
            page_count: Some(1),
            extracted_text: format!("text of {}", id),
            domain,
            summary: format!("summary of {}", id),
            analysis: format!("analysis of {}", id),
            analysis_status: AnalysisStatus::Complete,
            model: Some("gemini-pro".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        }
    }
}
