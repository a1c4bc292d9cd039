//! Conference-Corpus: a structured text corpus extractor
//!
//! This crate scrapes a hierarchically organized gospel study site into
//! normalized JSON corpora: the general-conference talk archive (with
//! footnotes resolved from the embedded client state), the topic-to-talk
//! mappings, and the Topical Guide / Bible Dictionary glossary collections.

pub mod config;
pub mod decode;
pub mod fetch;
pub mod glossary;
pub mod output;
pub mod scripture;
pub mod talks;
pub mod topics;
pub mod urls;

use thiserror::Error;

/// Main error type for corpus extraction operations
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Fetch failure taxonomy
///
/// Transient failures (server errors, rate limiting, network-level errors)
/// are retried by the fetcher with multiplicative backoff; exhausting the
/// attempt budget surfaces as `Exhausted`. Other client-error statuses are
/// permanent and returned on the first attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transient HTTP {status} from {url}")]
    TransientStatus { url: String, status: u16 },

    #[error("permanent HTTP {status} from {url}")]
    PermanentStatus { url: String, status: u16 },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("giving up on {url} after {attempts} attempts: {last_error}")]
    Exhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl FetchError {
    /// Whether another attempt at the same request could succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::TransientStatus { .. } | FetchError::Network { .. }
        )
    }
}

/// Result type alias for corpus operations
pub type Result<T> = std::result::Result<T, CorpusError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use fetch::Fetcher;
pub use scripture::parse_scripture_uri;
