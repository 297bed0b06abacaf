//! HTML page handlers.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use super::super::templates;
use super::super::AppState;
use super::helpers::{parse_domain_filter, pipeline_error_status, read_upload, registry_error_status};
use crate::models::DocumentRecord;
use crate::reporting::Report;

/// Listing filter.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListParams {
    pub domain: Option<String>,
}

fn error_response(status: StatusCode, title: &str, message: &str) -> Response {
    (status, Html(templates::error_page(title, message))).into_response()
}

/// Document listing, optionally filtered by domain.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Response {
    let domain = match parse_domain_filter(params.domain.as_deref()) {
        Ok(d) => d,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, "Unknown domain", &e.to_string()),
    };

    let (documents, report) = {
        let registry = state.registry.lock().await;
        let documents: Vec<DocumentRecord> = registry
            .list(domain)
            .into_iter()
            .rev()
            .cloned()
            .collect();
        (documents, Report::from_registry(&registry))
    };

    let title = match domain {
        Some(d) => format!("{} documents", d),
        None => "Documents".to_string(),
    };
    Html(templates::base_template(
        &title,
        &templates::document_list(&documents, domain, &report),
    ))
    .into_response()
}

/// Document detail page.
pub async fn document_detail(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Response {
    let doc = state.registry.lock().await.get(&doc_id).cloned();
    let Some(doc) = doc else {
        return error_response(
            StatusCode::NOT_FOUND,
            "Not Found",
            &format!("No document with id '{}'.", doc_id),
        );
    };

    let file_url = state
        .uploads()
        .relative_path(&doc.stored_path)
        .map(|rel| format!("/files/{}", rel));
    let size = tokio::fs::metadata(&doc.stored_path)
        .await
        .ok()
        .map(|m| m.len());

    Html(templates::base_template(
        &doc.original_filename,
        &templates::document_detail(&doc, file_url.as_deref(), size),
    ))
    .into_response()
}

/// Upload form page.
pub async fn upload_form() -> impl IntoResponse {
    Html(templates::base_template("Upload", &templates::upload_form()))
}

/// Handle a form upload and redirect to the new record.
pub async fn upload_document(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let upload = match read_upload(&mut multipart).await {
        Ok(u) => u,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, "Upload failed", &msg),
    };

    match state.process_upload(upload).await {
        Ok(record) => {
            Redirect::to(&format!("/documents/{}", urlencoding::encode(&record.id))).into_response()
        }
        Err(e) => error_response(pipeline_error_status(&e), "Processing failed", &e.to_string()),
    }
}

/// Delete a record and its stored file, then go back to the listing.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(doc_id): Path<String>,
) -> Response {
    let result = state.registry.lock().await.remove(&doc_id, true);
    match result {
        Ok(Some(_)) => Redirect::to("/").into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "Not Found",
            &format!("No document with id '{}'.", doc_id),
        ),
        Err(e) => error_response(registry_error_status(&e), "Delete failed", &e.to_string()),
    }
}

/// Report page.
pub async fn report(State(state): State<AppState>) -> impl IntoResponse {
    let report = Report::from_registry(&*state.registry.lock().await);
    Html(templates::base_template("Report", &templates::report_page(&report)))
}
