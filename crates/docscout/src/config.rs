//! Process-wide configuration
//!
//! Loaded once at startup and shared read-only (`Arc<Config>`) by every
//! component. Field names follow the camelCase keys of the config file.

use crate::error::ConfigError;
use crate::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Smallest budget accepted for any size limit
const MIN_BUDGET: usize = 100;

/// Size budgets, feature toggles and network parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Maximum characters returned for a single document (default: 15000)
    pub max_content_length: usize,
    /// Maximum response body size in bytes (default: 5 MiB)
    pub max_response_size: u64,
    /// Maximum characters of a generated summary (default: 3000)
    pub summary_length: usize,
    /// Per-document budget inside a batch report (default: 8000)
    pub batch_max_length: usize,

    /// Summarize automatically when content exceeds the budget
    pub auto_summary_for_large_content: bool,
    /// Prefer cutting at a line boundary when truncating
    pub smart_truncation: bool,
    /// Detect script-rendered shell pages
    pub enable_java_script_detection: bool,
    /// Rotate through several header profiles on each attempt
    pub retry_with_different_headers: bool,
    /// Include page metadata in the shell-page fallback
    pub extract_from_partial_content: bool,

    /// Request timeout in milliseconds (default: 60000)
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
    /// User-Agent of the primary header profile
    pub user_agent: String,
    /// Number of attempt passes (default: 3)
    pub max_retries: u32,
    /// Delay between attempt passes in milliseconds (default: 2000)
    #[serde(rename = "retryDelay")]
    pub retry_delay_ms: u64,

    /// Allow list of URL prefixes (empty allows everything)
    pub allow_prefixes: Vec<String>,
    /// Block list of URL prefixes
    pub block_prefixes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_content_length: 15_000,
            max_response_size: 5 * 1024 * 1024,
            summary_length: 3_000,
            batch_max_length: 8_000,
            auto_summary_for_large_content: true,
            smart_truncation: true,
            enable_java_script_detection: true,
            retry_with_different_headers: true,
            extract_from_partial_content: true,
            timeout_ms: 60_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_retries: 3,
            retry_delay_ms: 2_000,
            allow_prefixes: Vec::new(),
            block_prefixes: Vec::new(),
        }
    }
}

impl Config {
    /// Parse configuration from JSON, filling omitted keys with defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid(
                "maxRetries must be at least 1".to_string(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout must be positive".to_string()));
        }
        for (name, value) in [
            ("maxContentLength", self.max_content_length),
            ("summaryLength", self.summary_length),
            ("batchMaxLength", self.batch_max_length),
        ] {
            if value < MIN_BUDGET {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be at least {MIN_BUDGET}"
                )));
            }
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("userAgent must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
