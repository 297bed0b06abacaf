//! Gemini `generateContent` client.

mod config;
mod prompts;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use config::{AnalysisConfig, FailurePolicy, API_KEY_VARS};
pub use prompts::{DEFAULT_ANALYSIS_PROMPT, DEFAULT_SUMMARY_PROMPT};

use super::{Analysis, AnalysisError, Analyzer};
use crate::config::ConfigError;
use crate::models::Domain;

/// Client for Google's Generative Language API.
pub struct GeminiClient {
    config: AnalysisConfig,
    api_key: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiClient {
    /// Create a client. Fails if no API key is configured.
    pub fn new(config: AnalysisConfig) -> Result<Self, ConfigError> {
        let api_key = config.require_api_key()?.to_string();
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::Invalid(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    /// Get the config.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Generate the short summary.
    pub async fn generate_summary(
        &self,
        text: &str,
        domain: Domain,
        title: &str,
    ) -> Result<String, AnalysisError> {
        let prompt = prompts::render(
            self.config.get_summary_prompt(),
            title,
            domain.as_str(),
            self.truncate_content(text),
        );
        debug!("Generating summary for: {}", title);
        self.generate(&prompt).await
    }

    /// Generate the detailed analysis.
    pub async fn generate_analysis(
        &self,
        text: &str,
        domain: Domain,
        title: &str,
    ) -> Result<String, AnalysisError> {
        let prompt = prompts::render(
            self.config.get_analysis_prompt(),
            title,
            domain.as_str(),
            self.truncate_content(text),
        );
        debug!("Generating analysis for: {}", title);
        self.generate(&prompt).await
    }

    /// Truncate content to configured maximum (UTF-8 safe).
    fn truncate_content<'a>(&self, text: &'a str) -> &'a str {
        truncate_on_char_boundary(text, self.config.max_content_chars)
    }

    /// Call `generateContent` with a single text prompt.
    async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        );
        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(AnalysisError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        extract_text(parsed)
    }

    fn map_transport_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_timeout() {
            AnalysisError::Timeout(self.config.timeout_secs)
        } else if e.is_decode() {
            AnalysisError::Parse(e.to_string())
        } else {
            AnalysisError::Connection(e.to_string())
        }
    }
}

#[async_trait]
impl Analyzer for GeminiClient {
    async fn analyze(
        &self,
        text: &str,
        domain: Domain,
        title: &str,
    ) -> Result<Analysis, AnalysisError> {
        info!("Analyzing document: {}", title);

        // Sequential on purpose: free tiers allow few concurrent requests.
        let summary = self.generate_summary(text, domain, title).await?;
        let analysis = self.generate_analysis(text, domain, title).await?;

        Ok(Analysis { summary, analysis })
    }

    fn model_name(&self) -> Option<String> {
        Some(self.config.model.clone())
    }
}

/// Pull the candidate text out of a response.
fn extract_text(response: GeminiResponse) -> Result<String, AnalysisError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|f| f.block_reason)
    {
        return Err(AnalysisError::EmptyResponse(format!(
            "prompt blocked ({})",
            reason
        )));
    }

    let candidate = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| AnalysisError::EmptyResponse("no candidates".to_string()))?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    let text = text.trim();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .unwrap_or_else(|| "empty text".to_string());
        return Err(AnalysisError::EmptyResponse(reason));
    }
    Ok(text.to_string())
}

/// Longest prefix of `text` within `max_bytes` that ends on a char boundary.
fn truncate_on_char_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
