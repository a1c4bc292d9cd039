//! URL helpers shared by the discovery and scraping modules
//!
//! Site hrefs are root-relative; everything downstream wants them absolute
//! against the configured base URL, sometimes with the query stripped.

/// Resolves a root-relative href against the base URL
///
/// Already-absolute hrefs pass through untouched.
pub fn absolutize(base_url: &str, href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", base_url, href)
    }
}

/// Drops the query string, if any
pub fn strip_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
