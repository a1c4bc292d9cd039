//! Conference talk pipeline
//!
//! Discovery walks the archive listing hierarchy down to leaf talk URLs;
//! the crawler fans fetch/decode/resolve/extract out over a bounded worker
//! pool and collects one [`TalkRecord`] per surviving document.

pub mod crawler;
pub mod discovery;
pub mod extract;
pub mod footnotes;

use serde::{Deserialize, Serialize};

/// One extracted conference talk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TalkRecord {
    pub title: String,
    pub speaker: String,
    pub calling: String,
    pub year: String,
    pub season: String,
    pub url: String,
    pub quote: String,
    pub content: Vec<ParagraphRecord>,
}

/// One retained body paragraph
///
/// `paragraph_number` is dense and 1-based over retained paragraphs only;
/// empty-after-trim nodes never consume a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub paragraph_number: usize,
    pub text: String,
    pub linked_footnotes: Vec<FootnoteDescriptor>,
}

/// A footnote resolved from the document's own decoded client state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootnoteDescriptor {
    pub footnote_id: String,
    pub footnote_number: String,
    pub parsed_scripture_references: Vec<String>,
}

pub use crawler::crawl_talks;
pub use discovery::LinkDiscovery;
pub use extract::extract_talk;
pub use footnotes::build_footnote_lookup;
