//! docshelf - document intake with OCR, domain tagging and AI summaries.
//!
//! Uploaded PDFs and images are stored, run through OCR, tagged with one of a
//! fixed set of domains, summarized by a hosted model and recorded in a JSON
//! registry that can be browsed from the CLI or a small web UI.

pub mod classify;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod registry;
pub mod reporting;
pub mod server;
pub mod storage;
pub mod utils;
