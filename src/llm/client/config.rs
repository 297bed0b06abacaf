//! Analysis client configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::prompts::{DEFAULT_ANALYSIS_PROMPT, DEFAULT_SUMMARY_PROMPT};
use crate::config::ConfigError;

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// What the pipeline does when the analysis call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Do not save anything; report the error.
    #[default]
    Abort,
    /// Save the record with the analysis marked unavailable.
    Degraded,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "degraded" | "degrade" => Ok(Self::Degraded),
            other => Err(ConfigError::Invalid(format!(
                "unknown analysis failure policy '{}' (expected abort or degraded)",
                other
            ))),
        }
    }
}

/// Configuration for the Gemini analysis client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Model used for both summary and analysis
    #[serde(default = "default_model")]
    pub model: String,
    /// API key; read from the environment, never written back to config files
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Maximum tokens in each response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Temperature for generation (0.0 - 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum characters of document text sent to the model
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,
    /// Upper bound on the whole analysis step, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub on_failure: FailurePolicy,
    /// Custom summary prompt (uses {title}, {domain} and {content} placeholders)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_prompt: Option<String>,
    /// Custom analysis prompt (uses {title}, {domain} and {content} placeholders)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_prompt: Option<String>,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_content_chars() -> usize {
    30000
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_content_chars: default_max_content_chars(),
            timeout_secs: default_timeout_secs(),
            on_failure: FailurePolicy::default(),
            summary_prompt: None,
            analysis_prompt: None,
        }
    }
}

impl AnalysisConfig {
    /// Check if the config equals the default (for skip_serializing_if).
    pub fn is_default(&self) -> bool {
        let mut other = self.clone();
        other.api_key = None;
        other == Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `GOOGLE_API_KEY` (or `GEMINI_API_KEY`): API key
    /// - `GEMINI_MODEL`: model name
    /// - `GEMINI_ENDPOINT`: API base URL
    /// - `ANALYSIS_TIMEOUT_SECS`: timeout for the analysis step
    /// - `ANALYSIS_ON_FAILURE`: "abort" or "degraded"
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(key) = API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.trim().is_empty())
        {
            self.api_key = Some(key.trim().to_string());
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.is_empty() {
                self.model = model;
            }
        }
        if let Ok(endpoint) = std::env::var("GEMINI_ENDPOINT") {
            if !endpoint.is_empty() {
                self = self.with_endpoint(&endpoint);
            }
        }
        if let Ok(val) = std::env::var("ANALYSIS_TIMEOUT_SECS") {
            match val.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(_) => tracing::warn!("Ignoring invalid ANALYSIS_TIMEOUT_SECS={}", val),
            }
        }
        if let Ok(val) = std::env::var("ANALYSIS_ON_FAILURE") {
            match val.parse::<FailurePolicy>() {
                Ok(policy) => self.on_failure = policy,
                Err(e) => tracing::warn!("Ignoring ANALYSIS_ON_FAILURE: {}", e),
            }
        }
        self
    }

    /// The API key, or a configuration error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingCredential {
                var: API_KEY_VARS[0],
            })
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Get the summary prompt, using custom or default.
    pub fn get_summary_prompt(&self) -> &str {
        self.summary_prompt
            .as_deref()
            .unwrap_or(DEFAULT_SUMMARY_PROMPT)
    }

    /// Get the analysis prompt, using custom or default.
    pub fn get_analysis_prompt(&self) -> &str {
        self.analysis_prompt
            .as_deref()
            .unwrap_or(DEFAULT_ANALYSIS_PROMPT)
    }
}
