//! Configuration loading and validation
//!
//! Every knob has a default, so the scraper runs without a config file.
//! A TOML file can override any section; keys are kebab-case.

use crate::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub crawler: CrawlerConfig,
    pub retry: RetryConfig,
}

/// Source site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Scheme + host every relative href is resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Language code appended to every listing request
    pub lang: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Width of the parallel fan-out over talk pages
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,

    /// Fixed delay between sequential listing/entry requests (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

/// Retry policy for transient fetch failures
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempt budget per request (first try included)
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Backoff after attempt `n` is `base-backoff-ms * n`
    #[serde(rename = "base-backoff-ms")]
    pub base_backoff_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.churchofjesuschrist.org".to_string(),
            lang: "eng".to_string(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 10,
            politeness_delay_ms: 500,
            request_timeout_secs: 30,
            user_agent: concat!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) ",
                "AppleWebKit/537.36 (KHTML, like Gecko) ",
                "Chrome/124.0 Safari/537.36"
            )
            .to_string(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff_ms: 2000,
        }
    }
}

/// Loads configuration from a TOML file and validates it
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates a configuration, whether loaded or default
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if config.crawler.max_concurrent_fetches == 0 {
        return Err(ConfigError::Validation(
            "max-concurrent-fetches must be at least 1".to_string(),
        ));
    }
    if config.retry.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "max-attempts must be at least 1".to_string(),
        ));
    }
    if !config.source.base_url.starts_with("http") {
        return Err(ConfigError::Validation(format!(
            "base-url must be an http(s) URL, got {}",
            config.source.base_url
        )));
    }
    Ok(())
}
