//! HTTP request handlers for the web server.

mod api;
mod helpers;
mod pages;
mod static_files;

// Re-export handlers for use by the router
pub use api::{
    api_delete_document, api_get_document, api_list_documents, api_report, api_upload_document,
};
pub use pages::{
    delete_document, document_detail, list_documents, report, upload_document, upload_form,
};
pub use static_files::{serve_css, serve_file};
