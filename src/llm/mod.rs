//! Hosted AI analysis of extracted text.

mod client;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Domain;

pub use client::{
    AnalysisConfig, FailurePolicy, GeminiClient, API_KEY_VARS, DEFAULT_ANALYSIS_PROMPT,
    DEFAULT_SUMMARY_PROMPT,
};

/// Output of the analysis step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    /// Short summary.
    pub summary: String,
    /// Detailed, sectioned analysis.
    pub analysis: String,
}

/// Errors that can occur during analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Analysis timed out after {0}s")]
    Timeout(u64),

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned no usable text: {0}")]
    EmptyResponse(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Produces a summary and analysis for a document's text.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        text: &str,
        domain: Domain,
        title: &str,
    ) -> Result<Analysis, AnalysisError>;

    /// Model name recorded alongside the results.
    fn model_name(&self) -> Option<String> {
        None
    }
}
