//! Configuration management for docshelf using the prefer crate.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::{Classifier, ClassifierConfig};
use crate::llm::AnalysisConfig;
use crate::ocr::OcrConfig;
use crate::registry::{Registry, RegistryError};
use crate::storage::UploadStore;

/// Default registry filename.
pub const DEFAULT_REGISTRY_FILENAME: &str = "document_registry.json";

/// Uploads subdirectory name.
const UPLOADS_SUBDIR: &str = "uploads";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing credential: set {var} (for example in a .env file)")]
    MissingCredential { var: &'static str },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Full path to the registry file.
    pub registry_path: PathBuf,
    /// Directory for stored upload copies.
    pub uploads_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        // Documents dir -> Home dir -> Current dir
        let data_dir = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docshelf");
        Self::with_data_dir(data_dir)
    }
}

impl Settings {
    /// Create settings rooted at a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            registry_path: data_dir.join(DEFAULT_REGISTRY_FILENAME),
            uploads_dir: data_dir.join(UPLOADS_SUBDIR),
            data_dir,
        }
    }

    /// Ensure all directories exist.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        let registry_dir = self.registry_path.parent().unwrap_or(&self.data_dir);
        for (dir, label) in [
            (self.data_dir.as_path(), "data"),
            (self.uploads_dir.as_path(), "uploads"),
            (registry_dir, "registry"),
        ] {
            fs::create_dir_all(dir).map_err(|e| {
                std::io::Error::new(
                    e.kind(),
                    format!("Failed to create {} directory '{}': {}", label, dir.display(), e),
                )
            })?;
        }
        Ok(())
    }

    /// Check if the registry file has been created.
    pub fn registry_exists(&self) -> bool {
        self.registry_path.exists()
    }

    /// Open the registry at the configured path.
    pub fn open_registry(&self) -> Result<Registry, RegistryError> {
        Registry::open(&self.registry_path)
    }

    /// Upload store rooted at the uploads directory.
    pub fn upload_store(&self) -> UploadStore {
        UploadStore::new(&self.uploads_dir)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Registry file, relative to the data directory unless absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_file: Option<String>,
    /// Text extraction settings.
    #[serde(default, skip_serializing_if = "OcrConfig::is_default")]
    pub ocr: OcrConfig,
    /// Hosted analysis settings.
    #[serde(default, skip_serializing_if = "AnalysisConfig::is_default")]
    pub analysis: AnalysisConfig,
    /// Extra classifier keywords.
    #[serde(default, skip_serializing_if = "ClassifierConfig::is_default")]
    pub classifier: ClassifierConfig,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers docshelf config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("docshelf").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config {}: {}", path.display(), e);
                            Self::default_with_env()
                        }
                    }
                } else {
                    Self::default_with_env()
                }
            }
            // No config file found
            Err(_) => Self::default_with_env(),
        }
    }

    /// Create a default config with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        let mut config = Self::default();
        config.analysis = config.analysis.with_env_overrides();
        config
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;

        config.source_path = Some(path.to_path_buf());
        config.analysis = config.analysis.with_env_overrides();
        Ok(config)
    }

    /// Parse config text in the format named by `ext`.
    pub fn parse(contents: &str, ext: &str) -> Result<Self, ConfigError> {
        match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| ConfigError::Invalid(format!("Failed to parse TOML config: {}", e))),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| ConfigError::Invalid(format!("Failed to parse YAML config: {}", e))),
            _ => serde_json::from_str(contents)
                .map_err(|e| ConfigError::Invalid(format!("Failed to parse JSON config: {}", e))),
        }
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved against `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    /// `base_dir` is used to resolve a relative `data_dir`.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            *settings = Settings::with_data_dir(self.resolve_path(data_dir, base_dir));
        }
        if let Some(ref registry_file) = self.registry_file {
            settings.registry_path = self.resolve_path(registry_file, &settings.data_dir);
        }
    }

    /// Build the classifier from defaults plus configured keywords.
    pub fn classifier(&self) -> Result<Classifier, ConfigError> {
        Classifier::from_config(&self.classifier)
            .map_err(|e| ConfigError::Invalid(format!("classifier.keywords: {}", e)))
    }

    /// Serialize to TOML for writing a starter config file.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("Failed to serialize config: {}", e)))
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Data directory override (--data-dir flag or DOCSHELF_DATA_DIR).
    pub data_dir: Option<PathBuf>,
}

/// Look for a config file inside the data directory.
fn find_config_in_data_dir(data_dir: &Path) -> Option<PathBuf> {
    let extensions = ["toml", "yaml", "yml", "json"];
    let basenames = ["docshelf", "config"];

    for basename in basenames {
        for ext in extensions {
            let path = data_dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}

/// Load config from the appropriate source based on options.
async fn load_config(
    options: &LoadOptions,
    data_dir_override: Option<&PathBuf>,
) -> Result<Config, ConfigError> {
    // Priority 1: Explicit --config flag; errors are reported, not swallowed
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path).await;
    }

    // Priority 2: Config inside the data dir
    if let Some(data_dir) = data_dir_override {
        if let Some(config_path) = find_config_in_data_dir(data_dir) {
            tracing::debug!("Found config in data dir: {}", config_path.display());
            return Config::load_from_path(&config_path).await;
        }
    }

    // Priority 3: Auto-discover via prefer
    Ok(Config::load().await)
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(
    options: LoadOptions,
) -> Result<(Settings, Config), ConfigError> {
    let data_dir_override = options.data_dir.as_deref().map(absolute);

    let config = load_config(&options, data_dir_override.as_ref()).await?;

    let mut settings = Settings::default();
    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    config.apply_to_settings(&mut settings, &base_dir);

    // --data-dir takes precedence over the config file
    if let Some(data_dir) = data_dir_override {
        let registry_path = match config.registry_file {
            Some(ref file) => config.resolve_path(file, &data_dir),
            None => data_dir.join(DEFAULT_REGISTRY_FILENAME),
        };
        settings = Settings {
            registry_path,
            ..Settings::with_data_dir(data_dir)
        };
    }

    tracing::debug!(
        "Using data dir {} (registry {})",
        settings.data_dir.display(),
        settings.registry_path.display()
    );
    Ok((settings, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FailurePolicy;
    use crate::models::Domain;
    use tempfile::TempDir;

    #[test]
    fn test_settings_layout() {
        let settings = Settings::with_data_dir(PathBuf::from("/data/shelf"));
        assert_eq!(
            settings.registry_path,
            PathBuf::from("/data/shelf/document_registry.json")
        );
        assert_eq!(settings.uploads_dir, PathBuf::from("/data/shelf/uploads"));
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::parse(
            r#"
data_dir = "./shelf"
registry_file = "records.json"

[ocr]
language = "eng+deu"

[analysis]
model = "gemini-1.5-pro"
on_failure = "degraded"

[classifier.keywords]
Legal = ["subpoena"]
"#,
            "toml",
        )
        .unwrap();

        assert_eq!(config.data_dir.as_deref(), Some("./shelf"));
        assert_eq!(config.ocr.language, "eng+deu");
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.analysis.model, "gemini-1.5-pro");
        assert_eq!(config.analysis.on_failure, FailurePolicy::Degraded);
        assert_eq!(
            config.classifier().unwrap().classify("A subpoena arrived"),
            Domain::Legal
        );
    }

    #[test]
    fn test_parse_yaml_and_json() {
        let yaml = Config::parse("data_dir: /srv/docs\n", "yml").unwrap();
        assert_eq!(yaml.data_dir.as_deref(), Some("/srv/docs"));

        let json = Config::parse(r#"{"registry_file": "r.json"}"#, "json").unwrap();
        assert_eq!(json.registry_file.as_deref(), Some("r.json"));
    }

    #[test]
    fn test_parse_error_is_invalid() {
        let err = Config::parse("data_dir = [", "toml").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_classifier_domain_rejected() {
        let config = Config::parse("[classifier.keywords]\nAstrology = [\"horoscope\"]\n", "toml")
            .unwrap();
        assert!(matches!(config.classifier(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_apply_to_settings_resolves_relative_paths() {
        let config = Config {
            data_dir: Some("shelf".to_string()),
            registry_file: Some("index/records.json".to_string()),
            ..Default::default()
        };
        let mut settings = Settings::default();
        config.apply_to_settings(&mut settings, Path::new("/etc/docshelf"));

        assert_eq!(settings.data_dir, PathBuf::from("/etc/docshelf/shelf"));
        assert_eq!(
            settings.uploads_dir,
            PathBuf::from("/etc/docshelf/shelf/uploads")
        );
        assert_eq!(
            settings.registry_path,
            PathBuf::from("/etc/docshelf/shelf/index/records.json")
        );
    }

    #[test]
    fn test_to_toml_skips_defaults() {
        let toml = Config::default().to_toml().unwrap();
        assert!(!toml.contains("[analysis]"));
        assert!(!toml.contains("api_key"));
    }

    #[tokio::test]
    async fn test_load_settings_with_data_dir_finds_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("docshelf.toml"),
            "registry_file = \"custom.json\"\n[ocr]\ndpi = 150\n",
        )
        .unwrap();

        let (settings, config) = load_settings_with_options(LoadOptions {
            config_path: None,
            data_dir: Some(dir.path().to_path_buf()),
        })
        .await
        .unwrap();

        assert_eq!(settings.data_dir, dir.path());
        assert_eq!(settings.registry_path, dir.path().join("custom.json"));
        assert_eq!(config.ocr.dpi, 150);
        assert_eq!(
            config.source_path.as_deref(),
            Some(dir.path().join("docshelf.toml").as_path())
        );
    }

    #[tokio::test]
    async fn test_explicit_config_errors_are_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "ocr = 3\n").unwrap();

        let result = load_settings_with_options(LoadOptions {
            config_path: Some(path),
            data_dir: Some(dir.path().to_path_buf()),
        })
        .await;
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::with_data_dir(dir.path().join("nested/shelf"));
        settings.ensure_directories().unwrap();
        assert!(settings.uploads_dir.is_dir());
        assert!(!settings.registry_exists());
    }
}
