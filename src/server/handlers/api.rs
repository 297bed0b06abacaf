//! JSON API handlers.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::super::AppState;
use super::helpers::{parse_domain_filter, pipeline_error_status, read_upload, registry_error_status};
use crate::models::{AnalysisStatus, DocumentRecord, Domain};
use crate::reporting::Report;

/// Listing entry without the large text fields.
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub original_filename: String,
    pub domain: Domain,
    pub summary: String,
    pub analysis_status: AnalysisStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&DocumentRecord> for DocumentSummary {
    fn from(doc: &DocumentRecord) -> Self {
        Self {
            id: doc.id.clone(),
            original_filename: doc.original_filename.clone(),
            domain: doc.domain,
            summary: doc.summary.clone(),
            analysis_status: doc.analysis_status,
            created_at: doc.created_at,
        }
    }
}

/// API listing filter.
#[derive(Debug, Deserialize)]
pub struct ApiListParams {
    pub domain: Option<String>,
    pub limit: Option<usize>,
}

fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(serde_json::json!({ "error": message.into() })),
    )
        .into_response()
}

/// List documents, oldest first.
pub async fn api_list_documents(
    State(state): State<AppState>,
    Query(params): Query<ApiListParams>,
) -> Response {
    let domain = match parse_domain_filter(params.domain.as_deref()) {
        Ok(d) => d,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let registry = state.registry.lock().await;
    let summaries: Vec<DocumentSummary> = registry
        .list(domain)
        .into_iter()
        .take(params.limit.unwrap_or(usize::MAX))
        .map(DocumentSummary::from)
        .collect();
    Json(summaries).into_response()
}

/// Full record by id.
pub async fn api_get_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Response {
    match state.registry.lock().await.get(&doc_id) {
        Some(doc) => Json(doc).into_response(),
        None => json_error(StatusCode::NOT_FOUND, format!("document '{}' not found", doc_id)),
    }
}

/// Process a multipart upload and return the new record.
pub async fn api_upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(u) => u,
        Err(msg) => return json_error(StatusCode::BAD_REQUEST, msg),
    };

    match state.process_upload(upload).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => json_error(pipeline_error_status(&e), e.to_string()),
    }
}

/// Remove a record and its stored file.
pub async fn api_delete_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Response {
    let result = state.registry.lock().await.remove(&doc_id, true);
    match result {
        Ok(Some(_)) => StatusCode::NO_CONTENT.into_response(),
        Ok(None) => json_error(StatusCode::NOT_FOUND, format!("document '{}' not found", doc_id)),
        Err(e) => json_error(registry_error_status(&e), e.to_string()),
    }
}

/// Report filter.
#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub domain: Option<String>,
}

/// Counts per domain and per day.
pub async fn api_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Response {
    let domain = match parse_domain_filter(params.domain.as_deref()) {
        Ok(d) => d,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let registry = state.registry.lock().await;
    let report = match domain {
        Some(d) => Report::for_domain(&registry, d),
        None => Report::from_registry(&registry),
    };
    Json(report).into_response()
}
