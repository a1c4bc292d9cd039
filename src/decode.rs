//! Embedded client-state decoding
//!
//! Talk pages ship footnote detail in a `window.__INITIAL_STATE__` payload:
//! a base64-encoded JSON blob assigned inline in a script tag. The primary
//! extraction strategy is a regex over the raw markup; if the assignment
//! statement is absent, fall back to locating the script element by id.
//! Either way the decode chain is base64 → UTF-8 → JSON, and every failure
//! degrades to "no state" rather than an error.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

static STATE_ASSIGNMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)window\.__INITIAL_STATE__\s*=\s*"(.*?)"\s*;"#).unwrap()
});

/// Extracts and decodes the embedded client state from raw markup
///
/// Returns `None` when the payload is absent or malformed; the caller treats
/// that as "no dynamic data for this document".
pub fn decode_initial_state(html: &str) -> Option<serde_json::Value> {
    if let Some(captures) = STATE_ASSIGNMENT.captures(html) {
        if let Some(state) = decode_chain(&captures[1]) {
            return Some(state);
        }
        tracing::debug!("Inline state assignment found but failed to decode");
    }
    decode_from_script_tag(html)
}

/// Fallback strategy: find the state script element by its id
fn decode_from_script_tag(html: &str) -> Option<serde_json::Value> {
    let selector = Selector::parse("script#__INITIAL_STATE__").ok()?;
    let document = Html::parse_document(html);
    let element = document.select(&selector).next()?;

    let mut encoded = element.text().collect::<String>().trim().to_string();
    if encoded.ends_with(';') {
        encoded.pop();
    }
    decode_chain(&encoded)
}

/// base64 → UTF-8 → JSON; any step failing yields `None`
fn decode_chain(encoded: &str) -> Option<serde_json::Value> {
    let bytes = BASE64.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    serde_json::from_str(&text).ok()
}
