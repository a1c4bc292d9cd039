//! Talk content and metadata extraction
//!
//! Walks the main article region of a talk page: body paragraphs in
//! document order (empty ones skipped, numbering dense and 1-based over the
//! survivors), footnote markers matched against the document's resolved
//! lookup, and header metadata with sentinel defaults for every region the
//! markup might be missing. Extraction never fails; a page with nothing
//! recognizable produces a record full of sentinels and no content.

use crate::talks::{FootnoteDescriptor, ParagraphRecord, TalkRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

static YEAR_IN_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/((?:19|20)\d{2})/").unwrap());

const NO_TITLE: &str = "No Title Found";
const NO_QUOTE: &str = "No Quote Found";
const NO_SPEAKER: &str = "No Speaker Found";
const NO_CALLING: &str = "No Calling Found";
const NO_YEAR: &str = "No Year Found";

/// Extracts a full [`TalkRecord`] from a talk page's markup
///
/// `footnotes` must be the lookup resolved from this same document's
/// decoded state; markers pointing at ids absent from it are ignored.
pub fn extract_talk(
    url: &str,
    html: &str,
    footnotes: &HashMap<String, FootnoteDescriptor>,
) -> TalkRecord {
    let document = Html::parse_document(html);
    let article = select_first(&document, "article#main");

    let title = article
        .and_then(|a| first_text(&a, "h1"))
        .unwrap_or_else(|| NO_TITLE.to_string());

    let header = article.and_then(|a| select_first_in(&a, "header"));
    let quote = header
        .and_then(|h| first_text(&h, "p.kicker"))
        .unwrap_or_else(|| NO_QUOTE.to_string());

    let byline = header.and_then(|h| select_first_in(&h, "div.byline"));
    let speaker = byline
        .and_then(|b| first_text(&b, "p.author-name"))
        .map(|raw| strip_by_prefix(&raw))
        .unwrap_or_else(|| NO_SPEAKER.to_string());
    let calling = byline
        .and_then(|b| first_text(&b, "p.author-role"))
        .unwrap_or_else(|| NO_CALLING.to_string());

    let content = article
        .and_then(|a| select_first_in(&a, "div.body-block"))
        .map(|body| extract_paragraphs(&body, footnotes))
        .unwrap_or_default();

    let year = YEAR_IN_PATH
        .captures(url)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| NO_YEAR.to_string());
    let season = if url.contains("/04/") { "April" } else { "October" };

    TalkRecord {
        title,
        speaker,
        calling,
        year,
        season: season.to_string(),
        url: url.to_string(),
        quote,
        content,
    }
}

/// Emits ordered, densely numbered paragraphs with their linked footnotes
fn extract_paragraphs(
    body: &ElementRef,
    footnotes: &HashMap<String, FootnoteDescriptor>,
) -> Vec<ParagraphRecord> {
    let paragraph_selector = match Selector::parse("p") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    let marker_selector = Selector::parse("a.note-ref[data-scroll-id]").ok();

    let mut paragraphs = Vec::new();
    for paragraph in body.select(&paragraph_selector) {
        let text = paragraph.text().collect::<String>().trim().to_string();
        if text.is_empty() {
            continue;
        }

        // Markers attach in left-to-right document order
        let mut linked = Vec::new();
        if let Some(marker_selector) = &marker_selector {
            for marker in paragraph.select(marker_selector) {
                if let Some(note_id) = marker.value().attr("data-scroll-id") {
                    if let Some(descriptor) = footnotes.get(note_id) {
                        linked.push(descriptor.clone());
                    }
                }
            }
        }

        paragraphs.push(ParagraphRecord {
            paragraph_number: paragraphs.len() + 1,
            text,
            linked_footnotes: linked,
        });
    }
    paragraphs
}

/// Strips a leading "By " from a speaker byline, case-insensitively
fn strip_by_prefix(raw: &str) -> String {
    if raw.to_lowercase().starts_with("by ") {
        raw[3..].trim().to_string()
    } else {
        raw.to_string()
    }
}

fn select_first<'a>(document: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next()
}

fn select_first_in<'a>(element: &ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    element.select(&selector).next()
}

fn first_text(element: &ElementRef, selector: &str) -> Option<String> {
    select_first_in(element, selector)
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.org/study/general-conference/2020/04/sample-talk?lang=eng";

    fn talk_html() -> String {
        r#"
        <html><body><article id="main">
            <header>
                <h1>The Sample Talk</h1>
                <p class="kicker">An opening thought.</p>
                <div class="byline">
                    <p class="author-name">By Jane Example</p>
                    <p class="author-role">Of the Example Quorum</p>
                </div>
            </header>
            <div class="body-block">
                <p>First paragraph.<a class="note-ref" data-scroll-id="note1"><sup>1</sup></a></p>
                <p>   </p>
                <p>Second paragraph with <a class="note-ref" data-scroll-id="missing"><sup>2</sup></a>
                   and <a class="note-ref" data-scroll-id="note2"><sup>3</sup></a>.</p>
                <p></p>
                <p>Third paragraph.</p>
            </div>
        </article></body></html>
        "#
        .to_string()
    }

    fn lookup() -> HashMap<String, FootnoteDescriptor> {
        let mut map = HashMap::new();
        for (id, number) in [("note1", "1"), ("note2", "3")] {
            map.insert(
                id.to_string(),
                FootnoteDescriptor {
                    footnote_id: id.to_string(),
                    footnote_number: number.to_string(),
                    parsed_scripture_references: vec![],
                },
            );
        }
        map
    }

    #[test]
    fn test_metadata_extracted() {
        let talk = extract_talk(URL, &talk_html(), &lookup());
        assert_eq!(talk.title, "The Sample Talk");
        assert_eq!(talk.quote, "An opening thought.");
        assert_eq!(talk.speaker, "Jane Example");
        assert_eq!(talk.calling, "Of the Example Quorum");
        assert_eq!(talk.year, "2020");
        assert_eq!(talk.season, "April");
        assert_eq!(talk.url, URL);
    }

    #[test]
    fn test_paragraph_numbering_dense_over_non_empty() {
        let talk = extract_talk(URL, &talk_html(), &lookup());
        let numbers: Vec<usize> = talk.content.iter().map(|p| p.paragraph_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(talk.content[0].text.starts_with("First"));
        assert!(talk.content[2].text.starts_with("Third"));
    }

    #[test]
    fn test_footnotes_attached_in_text_order() {
        let talk = extract_talk(URL, &talk_html(), &lookup());
        assert_eq!(talk.content[0].linked_footnotes.len(), 1);
        assert_eq!(talk.content[0].linked_footnotes[0].footnote_id, "note1");

        // The "missing" marker is not in this document's lookup and is skipped
        let second = &talk.content[1].linked_footnotes;
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].footnote_id, "note2");

        assert!(talk.content[2].linked_footnotes.is_empty());
    }

    #[test]
    fn test_sentinels_for_missing_regions() {
        let talk = extract_talk(
            "https://example.org/study/general-conference/speakers",
            "<html><body><p>not an article</p></body></html>",
            &HashMap::new(),
        );
        assert_eq!(talk.title, "No Title Found");
        assert_eq!(talk.quote, "No Quote Found");
        assert_eq!(talk.speaker, "No Speaker Found");
        assert_eq!(talk.calling, "No Calling Found");
        assert_eq!(talk.year, "No Year Found");
        assert!(talk.content.is_empty());
    }

    #[test]
    fn test_october_season() {
        let talk = extract_talk(
            "https://example.org/study/general-conference/1995/10/a-talk",
            &talk_html(),
            &HashMap::new(),
        );
        assert_eq!(talk.season, "October");
        assert_eq!(talk.year, "1995");
    }

    #[test]
    fn test_by_prefix_stripped_case_insensitively() {
        assert_eq!(strip_by_prefix("By Jane Example"), "Jane Example");
        assert_eq!(strip_by_prefix("by John Example"), "John Example");
        assert_eq!(strip_by_prefix("President Example"), "President Example");
    }
}
