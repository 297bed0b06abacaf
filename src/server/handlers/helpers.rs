//! Helpers shared by page and API handlers.

use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::models::{Domain, UnknownDomain};
use crate::pipeline::PipelineError;
use crate::registry::RegistryError;
use crate::storage::Upload;

/// Multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Parse the `domain` query parameter. Empty or `all` means no filter.
pub fn parse_domain_filter(raw: Option<&str>) -> Result<Option<Domain>, UnknownDomain> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

/// Read the `file` field of a multipart form into an [`Upload`].
pub async fn read_upload(multipart: &mut Multipart) -> Result<Upload, String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid upload: {}", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("upload")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| format!("Failed to read upload: {}", e))?;
        return Ok(Upload::new(filename, bytes.to_vec()));
    }
    Err(format!("No '{}' field in upload", FILE_FIELD))
}

/// HTTP status for a processing failure.
pub fn pipeline_error_status(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::EmptyUpload => StatusCode::BAD_REQUEST,
        e if e.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Analysis(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// HTTP status for a registry failure.
pub fn registry_error_status(error: &RegistryError) -> StatusCode {
    match error {
        RegistryError::MissingArtifact { .. } => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
