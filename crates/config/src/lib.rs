//! Configuration loading, validation, and management for reporter.
//!
//! Loads configuration from `reporter.toml` in the project root with
//! environment variable overrides. Validates all settings at startup.
//! Command-line flags are applied on top by the binary.

use reporter_core::{ReasoningEffort, Verbosity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "reporter.toml";

/// The root configuration structure.
///
/// Maps directly to `reporter.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// Remote service settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Request shaping and token limits
    #[serde(default)]
    pub request: RequestConfig,

    /// Completion polling
    #[serde(default)]
    pub polling: PollingConfig,

    /// File selection for the assembled context
    #[serde(default)]
    pub context: ContextConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key (usually supplied through the environment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-HTTP-call timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_request_timeout_secs() -> u64 {
    2160
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    #[serde(default = "default_model")]
    pub model: String,

    /// Requested output cap; bounded by the remaining budget at request time
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: usize,

    /// Input + reasoning + output ceiling per run
    #[serde(default = "default_total_token_budget")]
    pub total_token_budget: usize,

    /// Ceiling for the measured input alone
    #[serde(default = "default_input_token_limit")]
    pub input_token_limit: usize,

    /// Sampling temperature, sent only to models that accept it
    #[serde(default = "default_temperature", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default = "default_reasoning_effort", skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,

    #[serde(default = "default_verbosity", skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,

    /// Continuation handle from an earlier run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_response_id: Option<String>,

    /// Optional `tokenizer.json` for exact token counts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer_path: Option<PathBuf>,
}

fn default_model() -> String {
    "gpt-5".into()
}
fn default_max_output_tokens() -> usize {
    120_000
}
fn default_total_token_budget() -> usize {
    120_000
}
fn default_input_token_limit() -> usize {
    77_777
}
fn default_temperature() -> Option<f32> {
    Some(0.0)
}
fn default_reasoning_effort() -> Option<ReasoningEffort> {
    Some(ReasoningEffort::High)
}
fn default_verbosity() -> Option<Verbosity> {
    Some(Verbosity::High)
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_output_tokens: default_max_output_tokens(),
            total_token_budget: default_total_token_budget(),
            input_token_limit: default_input_token_limit(),
            temperature: default_temperature(),
            reasoning_effort: default_reasoning_effort(),
            verbosity: default_verbosity(),
            previous_response_id: None,
            tokenizer_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Fixed wait between two status checks
    #[serde(default = "default_poll_interval_secs")]
    pub interval_secs: u64,

    /// Wall-clock bound on the whole polling phase
    #[serde(default = "default_poll_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    55
}
fn default_poll_timeout_secs() -> u64 {
    2160
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_poll_interval_secs(),
            timeout_secs: default_poll_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Glob patterns (relative to the root) considered for inclusion
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// Glob patterns excluded from the context; exclusions win
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Lines kept per file, 0 keeps whole files
    #[serde(default)]
    pub max_file_lines: usize,

    /// Cumulative character cap over all file contents, 0 disables it
    #[serde(default)]
    pub max_total_characters: usize,
}

fn default_include_patterns() -> Vec<String> {
    vec!["*".into(), "**/*".into()]
}

fn default_exclude_patterns() -> Vec<String> {
    [
        "**/node_modules/**",
        "**/.git/**",
        "**/target/**",
        "**/__pycache__/**",
        "**/.venv/**",
        "**/dist/**",
        "**/build/**",
        "**/*.egg-info/**",
        "**/.pytest_cache/**",
        "**/.mypy_cache/**",
        "**/.ruff_cache/**",
        "**/coverage/**",
        "Thumbs.db",
        "desktop.ini",
        "**/.DS_Store",
        // Our own artifacts must never feed back into the next prompt
        "current_step.md",
        "current_diff.md",
        "response.md",
        "*.diff",
        "diff.patch",
        CONFIG_FILE_NAME,
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            include_patterns: default_include_patterns(),
            exclude_patterns: default_exclude_patterns(),
            max_file_lines: 0,
            max_total_characters: 0,
        }
    }
}

impl ReporterConfig {
    /// Load configuration from `<root>/reporter.toml` with env var overrides.
    ///
    /// Environment variables:
    /// - `OPENAI_API_KEY`, `REPORTER_API_KEY`: API key (the latter wins)
    /// - `REPORTER_MODEL`: model identifier
    /// - `REPORTER_BASE_URL`: API base URL
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&root.join(CONFIG_FILE_NAME))?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY") {
            self.api.api_key = Some(key);
        }
        if let Some(key) = non_empty("REPORTER_API_KEY") {
            self.api.api_key = Some(key);
        }
        if let Some(model) = non_empty("REPORTER_MODEL") {
            self.request.model = model;
        }
        if let Some(url) = non_empty("REPORTER_BASE_URL") {
            self.api.base_url = url;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("request.model must not be empty".into()));
        }

        if self.request.input_token_limit == 0 {
            return Err(ConfigError::ValidationError(
                "request.input_token_limit must be > 0".into(),
            ));
        }

        if self.request.total_token_budget == 0 {
            return Err(ConfigError::ValidationError(
                "request.total_token_budget must be > 0".into(),
            ));
        }

        if let Some(t) = self.request.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(
                    "request.temperature must be between 0.0 and 2.0".into(),
                ));
            }
        }

        if self.polling.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "polling.interval_secs must be > 0".into(),
            ));
        }

        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError("api.base_url must not be empty".into()));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for reporter_core::Error {
    fn from(err: ConfigError) -> Self {
        reporter_core::Error::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = ReporterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.request.model, "gpt-5");
        assert_eq!(config.request.input_token_limit, 77_777);
        assert_eq!(config.request.total_token_budget, 120_000);
        assert_eq!(config.polling.interval_secs, 55);
        assert_eq!(config.polling.timeout_secs, 2160);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = ReporterConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ReporterConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.request.model, config.request.model);
        assert_eq!(parsed.request.reasoning_effort, Some(ReasoningEffort::High));
        assert_eq!(parsed.context.exclude_patterns, config.context.exclude_patterns);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let toml_str = r#"
[request]
model = "gpt-4o"
reasoning_effort = "low"

[polling]
interval_secs = 5
"#;
        let config: ReporterConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.request.model, "gpt-4o");
        assert_eq!(config.request.reasoning_effort, Some(ReasoningEffort::Low));
        assert_eq!(config.request.max_output_tokens, 120_000);
        assert_eq!(config.polling.interval_secs, 5);
        assert_eq!(config.polling.timeout_secs, 2160);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = ReporterConfig::default();
        config.request.temperature = Some(5.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config = ReporterConfig::default();
        config.request.input_token_limit = 0;
        assert!(config.validate().is_err());

        let mut config = ReporterConfig::default();
        config.request.total_token_budget = 0;
        assert!(config.validate().is_err());

        let mut config = ReporterConfig::default();
        config.polling.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = ReporterConfig::load_from(Path::new("/nonexistent/reporter.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().request.model, "gpt-5");
    }

    #[test]
    fn load_from_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[request]\ninput_token_limit = 100\n").unwrap();
        let config = ReporterConfig::load_from(&path).unwrap();
        assert_eq!(config.request.input_token_limit, 100);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[request\nmodel = ").unwrap();
        let err = ReporterConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn env_overrides_apply_and_reporter_key_wins() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("OPENAI_API_KEY", "sk-openai"),
            ("REPORTER_API_KEY", "sk-reporter"),
            ("REPORTER_MODEL", "o3-mini"),
            ("REPORTER_BASE_URL", ""),
        ]);
        let mut config = ReporterConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.api.api_key.as_deref(), Some("sk-reporter"));
        assert_eq!(config.request.model, "o3-mini");
        assert_eq!(config.api.base_url, "https://api.openai.com/v1");
        assert!(config.has_api_key());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = ReporterConfig::default();
        config.api.api_key = Some("sk-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = ReporterConfig::default_toml();
        assert!(toml_str.contains("gpt-5"));
        assert!(toml_str.contains("77777"));
    }
}
