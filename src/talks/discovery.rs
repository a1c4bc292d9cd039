//! Listing-page link discovery
//!
//! The archive index mixes two anchor shapes: direct period pages
//! (`/study/general-conference/1974/04`) and decade aggregators
//! (`/study/general-conference/19741979`) that list a span of periods one
//! level down. Aggregators are expanded with one extra fetch; period pages
//! are then scanned for leaf talk links. Every stage deduplicates, and a
//! failed index fetch yields an empty set rather than an error.

use crate::fetch::Fetcher;
use crate::urls::absolutize;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;

static PERIOD_OR_DECADE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/study/general-conference/(\d{4}/(04|10)|\d{8})").unwrap());
static PERIOD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/study/general-conference/\d{4}/(04|10)").unwrap());
static DECADE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/study/general-conference/\d{8}").unwrap());
static LEAF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/study/general-conference/\d{4}/(04|10)/[^/]+$").unwrap());

/// Walks the listing hierarchy for the conference archive
pub struct LinkDiscovery<'a> {
    fetcher: &'a Fetcher,
    base_url: &'a str,
}

impl<'a> LinkDiscovery<'a> {
    pub fn new(fetcher: &'a Fetcher, base_url: &'a str) -> Self {
        Self { fetcher, base_url }
    }

    /// Discovers all period-page URLs reachable from the top index
    ///
    /// Decade aggregators found on the index are fetched and expanded into
    /// their period links; direct period links are kept as-is.
    pub async fn discover_period_pages(&self, index_url: &str) -> Vec<String> {
        let html = match self.fetcher.fetch_html(index_url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to fetch archive index {}: {}", index_url, e);
                return Vec::new();
            }
        };

        let mut periods = Vec::new();
        let mut seen = HashSet::new();

        for link in matching_links(&html, self.base_url, &PERIOD_OR_DECADE) {
            if DECADE.is_match(&link) {
                self.fetcher.pause().await;
                match self.fetcher.fetch_html(&link).await {
                    Ok(decade_html) => {
                        for period in matching_links(&decade_html, self.base_url, &PERIOD) {
                            if seen.insert(period.clone()) {
                                periods.push(period);
                            }
                        }
                    }
                    Err(e) => tracing::warn!("Failed to expand decade page {}: {}", link, e),
                }
            } else if seen.insert(link.clone()) {
                periods.push(link);
            }
        }

        tracing::info!("Discovered {} period pages", periods.len());
        periods
    }

    /// Discovers leaf talk URLs on one period page
    pub async fn discover_talk_urls(&self, period_url: &str) -> Vec<String> {
        match self.fetcher.fetch_html(period_url).await {
            Ok(html) => matching_links(&html, self.base_url, &LEAF),
            Err(e) => {
                tracing::warn!("Failed to fetch period page {}: {}", period_url, e);
                Vec::new()
            }
        }
    }
}

/// Extracts hrefs matching `pattern` from all anchors, absolutized and
/// deduplicated in first-seen order
fn matching_links(html: &str, base_url: &str, pattern: &Regex) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if pattern.is_match(href) {
                    let absolute = absolutize(base_url, href);
                    if seen.insert(absolute.clone()) {
                        links.push(absolute);
                    }
                }
            }
        }
    }
    links
}
