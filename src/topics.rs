//! Topic → talks mapping scraper
//!
//! The topic overview page links to one page per topic; each topic page
//! lists talk cards (anchors into the conference archive carrying an `h4`
//! title). Topics are scraped sequentially with the politeness delay, and a
//! failing topic is logged and skipped.

use crate::fetch::Fetcher;
use crate::urls::{absolutize, strip_query};
use crate::{CorpusError, FetchError};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

static YEAR_IN_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d{4})/").unwrap());

/// One topic and the talks filed under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub topic: String,
    pub topic_url: String,
    pub talks: Vec<TalkSummary>,
}

/// A talk card on a topic page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkSummary {
    pub title: String,
    pub url: String,
    pub speaker: String,
    pub year: String,
    pub season: String,
}

/// Scrapes the full topic mapping corpus
pub async fn scrape_topics(fetcher: &Fetcher, base_url: &str) -> Result<Vec<TopicRecord>, CorpusError> {
    let overview_url = format!("{}/study/general-conference/topics?lang=eng", base_url);
    let html = fetcher.fetch_html(&overview_url).await?;
    let topic_urls = extract_topic_links(&html, base_url);
    tracing::info!("Found {} topic pages", topic_urls.len());

    let mut records = Vec::new();
    let total = topic_urls.len();
    for (i, topic_url) in topic_urls.iter().enumerate() {
        match scrape_topic(fetcher, base_url, topic_url).await {
            Ok(record) => {
                tracing::info!(
                    "Topic {}/{}: {} ({} talks)",
                    i + 1,
                    total,
                    record.topic,
                    record.talks.len()
                );
                records.push(record);
            }
            Err(e) => tracing::warn!("Topic {}/{}: failed {}: {}", i + 1, total, topic_url, e),
        }
        fetcher.pause().await;
    }
    Ok(records)
}

async fn scrape_topic(
    fetcher: &Fetcher,
    base_url: &str,
    topic_url: &str,
) -> Result<TopicRecord, FetchError> {
    let html = fetcher.fetch_html(topic_url).await?;
    Ok(parse_topic_page(topic_url, &html, base_url))
}

/// Extracts absolute topic-page URLs from the overview markup
///
/// The overview's self-link is dropped; query strings are stripped; the
/// result is deduplicated and sorted.
pub fn extract_topic_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = BTreeSet::new();

    if let Ok(selector) = Selector::parse(r#"a[href*="/study/general-conference/topics/"]"#) {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                let absolute = absolutize(base_url, strip_query(href));
                if !absolute.trim_end_matches('/').ends_with("/topics") {
                    links.insert(absolute);
                }
            }
        }
    }
    links.into_iter().collect()
}

/// Parses one topic page into its record
pub fn parse_topic_page(topic_url: &str, html: &str, base_url: &str) -> TopicRecord {
    let slug = strip_query(topic_url)
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default();
    let topic = slug_to_title(slug);

    let document = Html::parse_document(html);
    let mut talks = Vec::new();

    let anchor_selector = Selector::parse(r#"a[href*="/study/general-conference/"]"#);
    let title_selector = Selector::parse("h4");
    if let (Ok(anchor_selector), Ok(title_selector)) = (anchor_selector, title_selector) {
        for anchor in document.select(&anchor_selector) {
            let href = match anchor.value().attr("href") {
                Some(href) => href,
                None => continue,
            };
            let url = absolutize(base_url, strip_query(href));

            // Topic cross-links and footnote anchors are not talk cards
            if url.contains("/topics/") {
                continue;
            }
            let title = match anchor.select(&title_selector).next() {
                Some(h4) => h4.text().collect::<String>().trim().to_string(),
                None => continue,
            };

            // The card's remaining text is the speaker line
            let anchor_text = anchor
                .text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let speaker = anchor_text.replace(&title, "").trim().to_string();

            let year = YEAR_IN_PATH
                .captures(&url)
                .map(|c| c[1].to_string())
                .unwrap_or_default();
            let season = if url.contains("/04/") {
                "April"
            } else if url.contains("/10/") {
                "October"
            } else {
                ""
            };

            talks.push(TalkSummary {
                title,
                url,
                speaker,
                year,
                season: season.to_string(),
            });
        }
    }

    TopicRecord {
        topic,
        topic_url: strip_query(topic_url).to_string(),
        talks,
    }
}

/// Converts a URL slug like `aaronic-priesthood` into `Aaronic Priesthood`
fn slug_to_title(slug: &str) -> String {
    strip_query(slug)
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.org";

    #[test]
    fn test_topic_links_deduped_sorted_and_self_link_dropped() {
        let html = r#"
            <a href="/study/general-conference/topics?lang=eng">All topics</a>
            <a href="/study/general-conference/topics/faith?lang=eng">Faith</a>
            <a href="/study/general-conference/topics/faith?lang=eng">Faith again</a>
            <a href="/study/general-conference/topics/charity?lang=eng">Charity</a>
        "#;
        let links = extract_topic_links(html, BASE);
        assert_eq!(
            links,
            vec![
                "https://example.org/study/general-conference/topics/charity",
                "https://example.org/study/general-conference/topics/faith",
            ]
        );
    }

    #[test]
    fn test_parse_topic_page() {
        let html = r#"
            <html><body>
                <a href="/study/general-conference/2019/04/great-talk?lang=eng">
                    <h4>A Great Talk</h4>
                    <p>Jane Example</p>
                </a>
                <a href="/study/general-conference/topics/faith?lang=eng"><h4>Related topic</h4></a>
                <a href="/study/general-conference/2019/04/other?lang=eng">no title card</a>
            </body></html>
        "#;
        let record = parse_topic_page(
            "https://example.org/study/general-conference/topics/aaronic-priesthood?lang=eng",
            html,
            BASE,
        );
        assert_eq!(record.topic, "Aaronic Priesthood");
        assert_eq!(
            record.topic_url,
            "https://example.org/study/general-conference/topics/aaronic-priesthood"
        );
        assert_eq!(record.talks.len(), 1);

        let talk = &record.talks[0];
        assert_eq!(talk.title, "A Great Talk");
        assert_eq!(talk.speaker, "Jane Example");
        assert_eq!(talk.year, "2019");
        assert_eq!(talk.season, "April");
        assert_eq!(
            talk.url,
            "https://example.org/study/general-conference/2019/04/great-talk"
        );
    }

    #[test]
    fn test_season_empty_when_not_in_url() {
        let html = r#"
            <a href="/study/general-conference/speakers/jane?lang=eng"><h4>Profile</h4></a>
        "#;
        let record = parse_topic_page(
            "https://example.org/study/general-conference/topics/faith",
            html,
            BASE,
        );
        assert_eq!(record.talks[0].season, "");
        assert_eq!(record.talks[0].year, "");
    }

    #[test]
    fn test_slug_to_title() {
        assert_eq!(slug_to_title("aaronic-priesthood"), "Aaronic Priesthood");
        assert_eq!(slug_to_title("faith?lang=eng"), "Faith");
        assert_eq!(slug_to_title("hope"), "Hope");
    }
}
