//! Distillation configuration
//!
//! Defines fetch limits, worker pool sizing, output format and the overall
//! batch deadline. The same structure is accepted as JSON across the C
//! boundary, so every field has a default.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Output representation of the distilled content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Paragraphs of plain text
    #[default]
    #[serde(alias = "text", alias = "plain-text")]
    Plain,
    /// Headings, lists, emphasis and links in markdown syntax
    #[serde(alias = "md", alias = "lightweight-markup")]
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "text" | "plain-text" => Ok(OutputFormat::Plain),
            "markdown" | "md" | "lightweight-markup" => Ok(OutputFormat::Markdown),
            other => Err(ConfigError::InvalidValue {
                field: "format",
                reason: format!("unknown output format '{}'", other),
            }),
        }
    }
}

/// Configuration for a distillation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistillConfig {
    /// Connect/read timeout per request in milliseconds (default: 10000)
    pub fetch_timeout_ms: u64,
    /// Maximum redirects followed per request (default: 5)
    pub max_redirects: usize,
    /// Retries for transient failures (default: 2)
    pub retries: u32,
    /// Base delay for exponential retry backoff in milliseconds (default: 250)
    pub retry_backoff_ms: u64,
    /// Concurrent pipelines in a batch (default: available parallelism)
    pub workers: usize,
    /// Deadline for a whole batch in milliseconds (default: 30000)
    pub batch_deadline_ms: u64,
    /// Output format (default: plain)
    pub format: OutputFormat,
    /// Largest accepted document in bytes (default: 5 MiB)
    pub max_document_bytes: usize,
    /// Shorter normalized text is reported as empty content (default: 20)
    pub min_content_chars: usize,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Consult robots.txt before fetching (default: false)
    pub respect_robots_txt: bool,
}

impl Default for DistillConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            max_redirects: 5,
            retries: 2,
            retry_backoff_ms: 250,
            workers: default_workers(),
            batch_deadline_ms: 30_000,
            format: OutputFormat::Plain,
            max_document_bytes: 5 * 1024 * 1024,
            min_content_chars: 20,
            user_agent: format!("chew/{} (+https://github.com/mmatongo/chew)", crate::VERSION),
            respect_robots_txt: false,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl DistillConfig {
    /// Create a new config builder
    pub fn builder() -> DistillConfigBuilder {
        DistillConfigBuilder::default()
    }

    /// Defaults overlaid with `CHEW_*` environment variables
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_parse("CHEW_FETCH_TIMEOUT_MS") {
            config.fetch_timeout_ms = v;
        }
        if let Some(v) = env_parse("CHEW_MAX_REDIRECTS") {
            config.max_redirects = v;
        }
        if let Some(v) = env_parse("CHEW_RETRIES") {
            config.retries = v;
        }
        if let Some(v) = env_parse("CHEW_RETRY_BACKOFF_MS") {
            config.retry_backoff_ms = v;
        }
        if let Some(v) = env_parse("CHEW_WORKERS") {
            config.workers = v;
        }
        if let Some(v) = env_parse("CHEW_BATCH_DEADLINE_MS") {
            config.batch_deadline_ms = v;
        }
        if let Some(v) = env_parse("CHEW_FORMAT") {
            config.format = v;
        }
        if let Some(v) = env_parse("CHEW_MAX_DOCUMENT_BYTES") {
            config.max_document_bytes = v;
        }
        if let Some(v) = env_parse("CHEW_MIN_CONTENT_CHARS") {
            config.min_content_chars = v;
        }
        if let Ok(v) = env::var("CHEW_USER_AGENT") {
            if !v.trim().is_empty() {
                config.user_agent = v;
            }
        }
        if let Some(v) = env_parse("CHEW_RESPECT_ROBOTS_TXT") {
            config.respect_robots_txt = v;
        }
        config
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout_ms == 0 {
            return Err(invalid("fetch_timeout_ms", "must be at least 1"));
        }
        if self.workers == 0 {
            return Err(invalid("workers", "must be at least 1"));
        }
        if self.batch_deadline_ms == 0 {
            return Err(invalid("batch_deadline_ms", "must be at least 1"));
        }
        if self.max_document_bytes == 0 {
            return Err(invalid("max_document_bytes", "must be at least 1"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        Ok(())
    }

    /// Fetch timeout as a `Duration`
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Batch deadline as a `Duration`
    pub fn batch_deadline(&self) -> Duration {
        Duration::from_millis(self.batch_deadline_ms)
    }

    /// Backoff before retry number `attempt` (0-based), without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

/// Builder for DistillConfig
#[derive(Default)]
pub struct DistillConfigBuilder {
    config: DistillConfig,
}

impl DistillConfigBuilder {
    /// Set the per-request timeout
    pub fn fetch_timeout_ms(mut self, ms: u64) -> Self {
        self.config.fetch_timeout_ms = ms;
        self
    }

    /// Set the redirect limit
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Set the retry count and base backoff
    pub fn retries(mut self, retries: u32, backoff_ms: u64) -> Self {
        self.config.retries = retries;
        self.config.retry_backoff_ms = backoff_ms;
        self
    }

    /// Set the worker pool size
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the overall batch deadline
    pub fn batch_deadline_ms(mut self, ms: u64) -> Self {
        self.config.batch_deadline_ms = ms;
        self
    }

    /// Set the output format
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Set the maximum document size
    pub fn max_document_bytes(mut self, bytes: usize) -> Self {
        self.config.max_document_bytes = bytes;
        self
    }

    /// Set the minimum length of accepted content
    pub fn min_content_chars(mut self, chars: usize) -> Self {
        self.config.min_content_chars = chars;
        self
    }

    /// Set user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Enable/disable robots.txt checks
    pub fn respect_robots_txt(mut self, respect: bool) -> Self {
        self.config.respect_robots_txt = respect;
        self
    }

    /// Build the config
    pub fn build(self) -> DistillConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = DistillConfig::default();
        assert_eq!(config.fetch_timeout_ms, 10_000);
        assert_eq!(config.max_redirects, 5);
        assert_eq!(config.retries, 2);
        assert!(config.workers >= 1);
        assert_eq!(config.format, OutputFormat::Plain);
        assert!(!config.respect_robots_txt);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = DistillConfig::default();
        config.workers = 0;
        assert!(config.validate().is_err());

        config.workers = 2;
        config.fetch_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_doubles() {
        let config = DistillConfig::builder().retries(3, 100).build();
        assert_eq!(config.backoff(0), Duration::from_millis(100));
        assert_eq!(config.backoff(1), Duration::from_millis(200));
        assert_eq!(config.backoff(2), Duration::from_millis(400));
        assert_eq!(config.backoff(200), Duration::from_millis(u64::MAX));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DistillConfig =
            serde_json::from_str(r#"{"format":"markdown","workers":3}"#).unwrap();
        assert_eq!(config.format, OutputFormat::Markdown);
        assert_eq!(config.workers, 3);
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_format_aliases() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Plain);
        assert!("pdf".parse::<OutputFormat>().is_err());
        let format: OutputFormat = serde_json::from_str("\"lightweight-markup\"").unwrap();
        assert_eq!(format, OutputFormat::Markdown);
    }
}
