//! Glossary collection scraper (Topical Guide / Bible Dictionary)
//!
//! Both collections share one shape: an index page whose anchors point at
//! entry pages under a fixed href prefix, and entry pages mixing two
//! paragraph sources — "see / see also" cross-reference blocks and numbered
//! body paragraphs. The two selector sets can overlap, so paragraphs are
//! deduplicated by their anchor identifier. Scraping is sequential with a
//! politeness delay; a failed entry is recorded with an error marker so it
//! stays auditable, and the collection scrape continues.

use crate::fetch::Fetcher;
use crate::scripture::parse_scripture_uri;
use crate::urls::absolutize;
use crate::CorpusError;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An entry link discovered on a collection index page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryLink {
    pub entry: String,
    pub entry_url: String,
}

/// One glossary entry with its extracted paragraphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub entry: String,
    pub entry_url: String,
    pub paragraphs: Vec<EntryParagraph>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One retained entry paragraph
///
/// Cross-reference blocks carry `type: "see"` plus the entries they link
/// to; optional fields are omitted from the JSON output when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryParagraph {
    pub paragraph_number: usize,
    pub text: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scripture_references: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_entries: Option<Vec<LinkedEntry>>,
}

/// A same-collection cross-link inside a "see" block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEntry {
    pub entry: String,
    pub href: String,
}

/// Scrapes one whole glossary collection
///
/// `prefix` filters index anchors (e.g. `/study/scriptures/tg/`); `limit`
/// optionally cuts the collection off after the first N entries.
pub async fn scrape_collection(
    fetcher: &Fetcher,
    label: &str,
    base_url: &str,
    index_url: &str,
    prefix: &str,
    limit: Option<usize>,
) -> Result<Vec<EntryRecord>, CorpusError> {
    let index_html = fetcher.fetch_html(index_url).await?;
    let links = extract_entry_links(&index_html, base_url, prefix, limit);
    let total = links.len();
    tracing::info!("{}: {} entries to scrape", label, total);

    let mut records = Vec::new();
    for (i, link) in links.into_iter().enumerate() {
        fetcher.pause().await;
        match fetcher.fetch_html(&link.entry_url).await {
            Ok(html) => {
                let paragraphs = parse_entry_paragraphs(&html, base_url);
                tracing::info!("{}: {}/{} ok {}", label, i + 1, total, link.entry);
                records.push(EntryRecord {
                    entry: link.entry,
                    entry_url: link.entry_url,
                    paragraphs,
                    error: None,
                });
            }
            Err(e) => {
                tracing::warn!("{}: {}/{} failed {}: {}", label, i + 1, total, link.entry, e);
                records.push(EntryRecord {
                    entry: link.entry,
                    entry_url: link.entry_url,
                    paragraphs: Vec::new(),
                    error: Some(e.to_string()),
                });
            }
        }
    }
    Ok(records)
}

/// Discovers entry links on a collection index page
///
/// Anchors are filtered by href prefix, deduplicated by absolute URL, and
/// kept only when they have visible label text.
pub fn extract_entry_links(
    html: &str,
    base_url: &str,
    prefix: &str,
    limit: Option<usize>,
) -> Vec<EntryLink> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse(&format!("a[href^='{}']", prefix)) {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();
    let mut seen = HashSet::new();
    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(href) => href,
            None => continue,
        };
        let entry_url = absolutize(base_url, href);
        if !seen.insert(entry_url.clone()) {
            continue;
        }
        let entry = element.text().collect::<String>().trim().to_string();
        if !entry.is_empty() {
            links.push(EntryLink { entry, entry_url });
        }
        if let Some(max) = limit {
            if links.len() >= max {
                break;
            }
        }
    }
    links
}

/// Merges the two paragraph source shapes of an entry page
///
/// Cross-reference blocks (`nav.index p.title`, `nav.index p.entry`) come
/// first, then numbered body paragraphs (`p[id^='p']`); a paragraph present
/// in both sets is kept once, keyed by its `id`/`data-aid` anchor.
pub fn parse_entry_paragraphs(html: &str, base_url: &str) -> Vec<EntryParagraph> {
    let document = Html::parse_document(html);
    let article = match Selector::parse("article")
        .ok()
        .and_then(|s| document.select(&s).next())
    {
        Some(article) => article,
        None => return Vec::new(),
    };

    let see_selector = Selector::parse("nav.index p.title, nav.index p.entry");
    let body_selector = Selector::parse("p[id^='p']");
    let (see_selector, body_selector) = match (see_selector, body_selector) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return Vec::new(),
    };

    let mut blocks: Vec<_> = article.select(&see_selector).collect();
    blocks.extend(article.select(&body_selector));

    let scripture_selector = Selector::parse("a[href^='/study/scriptures/']").ok();
    let cross_link_selector = Selector::parse("a[href*='/tg/'], a[href*='/bd/']").ok();

    let mut paragraphs = Vec::new();
    let mut seen_anchors = HashSet::new();

    for block in blocks {
        let anchor = block
            .value()
            .attr("id")
            .or_else(|| block.value().attr("data-aid"))
            .unwrap_or("");
        if !anchor.is_empty() && !seen_anchors.insert(anchor.to_string()) {
            continue;
        }

        let text = block
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .replace('\u{a0}', " ");
        if text.is_empty() {
            continue;
        }

        // Glossary cross-links share the scripture path space but are not
        // citations; keep them out of the reference list.
        let references: Vec<String> = scripture_selector
            .as_ref()
            .map(|s| {
                block
                    .select(s)
                    .filter_map(|a| a.value().attr("href"))
                    .filter(|href| !is_glossary_href(href))
                    .filter_map(parse_scripture_uri)
                    .collect()
            })
            .unwrap_or_default();

        let is_see_block = block.value().classes().any(|c| c == "title");
        let linked = if is_see_block {
            cross_link_selector
                .as_ref()
                .map(|s| {
                    block
                        .select(s)
                        .filter_map(|a| {
                            let href = a.value().attr("href")?;
                            let entry = a.text().collect::<String>().trim().to_string();
                            Some(LinkedEntry {
                                entry,
                                href: absolutize(base_url, href),
                            })
                        })
                        .collect::<Vec<_>>()
                })
                .filter(|links| !links.is_empty())
        } else {
            None
        };

        paragraphs.push(EntryParagraph {
            paragraph_number: paragraphs.len() + 1,
            text,
            kind: is_see_block.then(|| "see".to_string()),
            scripture_references: (!references.is_empty()).then_some(references),
            linked_entries: linked,
        });
    }
    paragraphs
}

fn is_glossary_href(href: &str) -> bool {
    href.contains("/scriptures/tg/") || href.contains("/scriptures/bd/")
}
