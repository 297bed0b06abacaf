//! Upload processing: store, extract, classify, analyze, register.
//!
//! Work is split in two halves so callers sharing a registry only need it for
//! the final step: [`Pipeline::prepare`] does everything that touches external
//! tools and services, and [`Pipeline::commit`] writes the record. Either half
//! failing removes the upload copy it stored, so nothing half-processed is left
//! behind.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::classify::Classifier;
use crate::config::{Config, ConfigError, Settings};
use crate::llm::{Analysis, AnalysisError, Analyzer, FailurePolicy, GeminiClient};
use crate::models::{AnalysisStatus, DocumentRecord, Domain};
use crate::ocr::{ExtractionError, Extractor, TesseractExtractor};
use crate::registry::{Registry, RegistryError};
use crate::storage::{StorageError, StoredUpload, Upload, UploadStore};

/// Errors from processing an upload.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("uploaded file is empty")]
    EmptyUpload,

    #[error("no text could be extracted from the document")]
    NoText,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("failed to save record: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("background task failed: {0}")]
    Task(String),
}

impl PipelineError {
    /// Whether the failure was caused by the upload itself rather than the
    /// environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyUpload
                | Self::NoText
                | Self::Extraction(ExtractionError::UnsupportedFormat(_))
        )
    }
}

/// Processing stages, reported to progress observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Storing,
    Extracting,
    Classifying,
    Analyzing,
    Saving,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Storing => "storing upload",
            Self::Extracting => "extracting text",
            Self::Classifying => "classifying",
            Self::Analyzing => "generating summary and analysis",
            Self::Saving => "saving record",
        }
    }
}

/// A fully processed upload that has not been registered yet.
#[derive(Debug)]
pub struct Prepared {
    pub record: DocumentRecord,
    stored: StoredUpload,
}

/// Orchestrates one upload from bytes to registry record.
pub struct Pipeline {
    extractor: Arc<dyn Extractor>,
    analyzer: Arc<dyn Analyzer>,
    classifier: Classifier,
    storage: UploadStore,
    policy: FailurePolicy,
    analysis_timeout: Duration,
}

impl Pipeline {
    pub fn new(
        extractor: Arc<dyn Extractor>,
        analyzer: Arc<dyn Analyzer>,
        storage: UploadStore,
    ) -> Self {
        Self {
            extractor,
            analyzer,
            classifier: Classifier::default(),
            storage,
            policy: FailurePolicy::default(),
            analysis_timeout: Duration::from_secs(120),
        }
    }

    /// Build the production pipeline: Tesseract extraction and Gemini analysis.
    ///
    /// Fails before any processing if the API key is missing.
    pub fn from_config(settings: &Settings, config: &Config) -> Result<Self, PipelineError> {
        let extractor = TesseractExtractor::new(config.ocr.clone());
        let analyzer = GeminiClient::new(config.analysis.clone())?;
        Ok(
            Self::new(Arc::new(extractor), Arc::new(analyzer), settings.upload_store())
                .with_classifier(config.classifier()?)
                .with_policy(config.analysis.on_failure)
                .with_analysis_timeout(config.analysis.timeout()),
        )
    }

    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn storage(&self) -> &UploadStore {
        &self.storage
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Process an upload and register the result.
    pub async fn process(
        &self,
        registry: &mut Registry,
        upload: Upload,
    ) -> Result<DocumentRecord, PipelineError> {
        self.process_with_progress(registry, upload, &|_| {}).await
    }

    /// Like [`process`](Self::process), reporting each stage to `progress`.
    pub async fn process_with_progress(
        &self,
        registry: &mut Registry,
        upload: Upload,
        progress: &(dyn Fn(Stage) + Send + Sync),
    ) -> Result<DocumentRecord, PipelineError> {
        let prepared = self.prepare(upload, progress).await?;
        progress(Stage::Saving);
        self.commit(registry, prepared)
    }

    /// Run every stage except registration.
    pub async fn prepare(
        &self,
        upload: Upload,
        progress: &(dyn Fn(Stage) + Send + Sync),
    ) -> Result<Prepared, PipelineError> {
        if upload.bytes.is_empty() {
            return Err(PipelineError::EmptyUpload);
        }

        progress(Stage::Storing);
        let stored = self.storage.store(&upload)?;

        match self.build_record(&upload.filename, &stored, progress).await {
            Ok(record) => Ok(Prepared { record, stored }),
            Err(e) => {
                self.storage.discard(&stored);
                Err(e)
            }
        }
    }

    /// Insert a prepared record, removing its upload copy on failure.
    pub fn commit(
        &self,
        registry: &mut Registry,
        prepared: Prepared,
    ) -> Result<DocumentRecord, PipelineError> {
        let Prepared { record, stored } = prepared;
        match registry.insert(record.clone()) {
            Ok(previous) => {
                if previous.is_some() {
                    info!("Replaced existing record {}", record.id);
                }
                Ok(record)
            }
            Err(e) => {
                if !registry.is_referenced(&stored.path) {
                    self.storage.discard(&stored);
                }
                Err(e.into())
            }
        }
    }

    async fn build_record(
        &self,
        filename: &str,
        stored: &StoredUpload,
        progress: &(dyn Fn(Stage) + Send + Sync),
    ) -> Result<DocumentRecord, PipelineError> {
        progress(Stage::Extracting);
        let extractor = Arc::clone(&self.extractor);
        let path = stored.path.clone();
        let mime_type = stored.mime_type.clone();
        let extraction = tokio::task::spawn_blocking(move || extractor.extract(&path, &mime_type))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))??;

        let text = extraction.text.trim();
        if text.is_empty() {
            return Err(PipelineError::NoText);
        }

        progress(Stage::Classifying);
        let domain = self.classifier.classify(text);
        info!("Classified {} as {}", filename, domain);

        progress(Stage::Analyzing);
        let (analysis, analysis_status) = match self.analyze(text, domain, filename).await {
            Ok(analysis) => (analysis, AnalysisStatus::Complete),
            Err(e) => match self.policy {
                FailurePolicy::Abort => return Err(e.into()),
                FailurePolicy::Degraded => {
                    warn!("Analysis of {} failed, saving without it: {}", filename, e);
                    (
                        Analysis {
                            summary: String::new(),
                            analysis: format!("Analysis unavailable: {}", e),
                        },
                        AnalysisStatus::Unavailable,
                    )
                }
            },
        };

        Ok(DocumentRecord {
            id: stored.id.clone(),
            original_filename: filename.to_string(),
            stored_path: stored.path.clone(),
            content_hash: stored.content_hash.clone(),
            mime_type: stored.mime_type.clone(),
            page_count: extraction.page_count,
            extracted_text: text.to_string(),
            domain,
            summary: analysis.summary,
            analysis: analysis.analysis,
            analysis_status,
            model: self.analyzer.model_name(),
            created_at: Utc::now(),
        })
    }

    async fn analyze(
        &self,
        text: &str,
        domain: Domain,
        title: &str,
    ) -> Result<Analysis, AnalysisError> {
        tokio::time::timeout(self.analysis_timeout, self.analyzer.analyze(text, domain, title))
            .await
            .map_err(|_| AnalysisError::Timeout(self.analysis_timeout.as_secs()))?
    }
}
