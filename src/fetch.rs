//! HTTP fetcher with retry/backoff
//!
//! All network traffic goes through [`Fetcher`]. It owns the shared reqwest
//! client and applies the retry policy: server errors (5xx), rate limiting
//! (429), and network-level failures are transient and retried with
//! multiplicative backoff; any other non-success status is permanent and
//! returned immediately. Exhausting the attempt budget is a hard failure —
//! sequential callers propagate it, the parallel crawler records it per item.

use crate::config::Config;
use crate::decode::decode_initial_state;
use crate::FetchError;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// A fetched talk page: raw markup plus the decoded client state, if any
#[derive(Debug)]
pub struct FetchedDocument {
    pub body: String,
    pub state: Option<serde_json::Value>,
}

/// Shared HTTP fetcher
///
/// Cheap to clone; the underlying client is reference-counted, so every
/// crawler worker can hold its own copy.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_attempts: u32,
    base_backoff: Duration,
    politeness_delay: Duration,
}

impl Fetcher {
    /// Builds a fetcher from the crawler and retry configuration
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(&config.crawler.user_agent)
            .timeout(Duration::from_secs(config.crawler.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            max_attempts: config.retry.max_attempts,
            base_backoff: Duration::from_millis(config.retry.base_backoff_ms),
            politeness_delay: Duration::from_millis(config.crawler.politeness_delay_ms),
        })
    }

    /// Fetches a URL's markup, retrying transient failures
    ///
    /// Backoff after attempt `n` is `base_backoff * n`. A permanent
    /// client-error status short-circuits the loop.
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let mut last_error = String::new();

        for attempt in 1..=self.max_attempts {
            match self.try_fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() => {
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt,
                        self.max_attempts,
                        url,
                        e
                    );
                    last_error = e.to_string();
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.base_backoff * attempt).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(FetchError::Exhausted {
            url: url.to_string(),
            attempts: self.max_attempts,
            last_error,
        })
    }

    /// Fetches a talk page and decodes its embedded client state
    ///
    /// State decoding never fails the document: a malformed or missing
    /// payload simply yields `state: None`.
    pub async fn fetch_document(&self, url: &str) -> Result<FetchedDocument, FetchError> {
        let body = self.fetch_html(url).await?;
        let state = decode_initial_state(&body);
        if state.is_none() {
            tracing::debug!("No client state decoded for {}", url);
        }
        Ok(FetchedDocument { body, state })
    }

    /// Fixed politeness delay between sequential requests
    pub async fn pause(&self) {
        tokio::time::sleep(self.politeness_delay).await;
    }

    async fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = match self.client.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                return Err(FetchError::Network {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
        };

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::TransientStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::PermanentStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
