//! Footnote resolution from decoded client state
//!
//! The decoded state keys per-document content by a language-prefixed path
//! (`/eng/general-conference/2020/04/talk-slug`). This module rebuilds that
//! key from the request URL, walks the nested structure down to the
//! document's footnote map, and normalizes each entry into a
//! [`FootnoteDescriptor`]. Every lookup is optional: any missing key at any
//! depth yields an empty map, never an error.

use crate::scripture::parse_scripture_uri;
use crate::talks::FootnoteDescriptor;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// Builds the footnote-id → descriptor lookup for one document
///
/// The lookup is scoped strictly to the document whose state was decoded;
/// callers must never reuse it across documents.
pub fn build_footnote_lookup(state: &Value, document_url: &str) -> HashMap<String, FootnoteDescriptor> {
    let key = match content_store_key(document_url) {
        Some(key) => key,
        None => return HashMap::new(),
    };

    let footnotes = match state
        .get("reader")
        .and_then(|v| v.get("contentStore"))
        .and_then(|v| v.get(&key))
        .and_then(|v| v.get("content"))
        .and_then(|v| v.get("footnotes"))
        .and_then(|v| v.as_object())
    {
        Some(map) => map,
        None => {
            tracing::debug!("No footnote map in state for key {}", key);
            return HashMap::new();
        }
    };

    let mut lookup = HashMap::new();
    for (note_id, details) in footnotes {
        if !details.is_object() {
            continue;
        }

        let number = details
            .get("marker")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim_end_matches('.')
            .to_string();

        let references = details
            .get("referenceUris")
            .and_then(Value::as_array)
            .map(|uris| {
                uris.iter()
                    .filter_map(|entry| entry.get("href").and_then(Value::as_str))
                    .filter_map(parse_scripture_uri)
                    .collect()
            })
            .unwrap_or_default();

        lookup.insert(
            note_id.clone(),
            FootnoteDescriptor {
                footnote_id: note_id.clone(),
                footnote_number: number,
                parsed_scripture_references: references,
            },
        );
    }
    lookup
}

/// Derives the content-store key for a document URL
///
/// Strips the fixed `/study` prefix and prepends the request's language code
/// (from `?lang=`, default "eng") unless the path already starts with it.
fn content_store_key(document_url: &str) -> Option<String> {
    let parsed = Url::parse(document_url).ok()?;
    let lang = parsed
        .query_pairs()
        .find(|(name, _)| name == "lang")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_else(|| "eng".to_string());

    let path = parsed.path();
    let after_study = path.strip_prefix("/study").unwrap_or(path);

    let lang_prefix = format!("/{}", lang);
    if after_study.starts_with(&lang_prefix) {
        Some(after_study.to_string())
    } else {
        Some(format!("{}{}", lang_prefix, after_study))
    }
}
