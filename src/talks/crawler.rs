//! Bounded-concurrency talk crawler
//!
//! Fans fetch → decode → resolve → extract out over independent tasks,
//! bounded by a semaphore. Each task owns its whole pipeline and reports a
//! `None` sentinel on unrecoverable failure, so one bad document never
//! aborts its siblings. Results arrive in completion order; consumers do
//! not rely on any cross-document ordering.

use crate::fetch::Fetcher;
use crate::talks::{build_footnote_lookup, extract_talk, TalkRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Scrapes one talk end to end, isolating failure into `None`
pub async fn scrape_talk(fetcher: &Fetcher, url: &str) -> Option<TalkRecord> {
    let document = match fetcher.fetch_document(url).await {
        Ok(document) => document,
        Err(e) => {
            tracing::warn!("Failed to scrape {}: {}", url, e);
            return None;
        }
    };

    let footnotes = document
        .state
        .as_ref()
        .map(|state| build_footnote_lookup(state, url))
        .unwrap_or_default();

    Some(extract_talk(url, &document.body, &footnotes))
}

/// Crawls all talk URLs with a bounded worker pool
///
/// Sentinel (failed) results are filtered out of the returned corpus.
pub async fn crawl_talks(fetcher: Fetcher, urls: Vec<String>, width: usize) -> Vec<TalkRecord> {
    let total = urls.len();
    let semaphore = Arc::new(Semaphore::new(width.max(1)));
    let (tx, mut rx) = tokio::sync::mpsc::channel::<Option<TalkRecord>>(width.max(1) * 2);

    let progress = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec})")
    {
        progress.set_style(style.progress_chars("=> "));
    }

    for url in urls {
        let fetcher = fetcher.clone();
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            // Semaphore is never closed, so acquire cannot fail
            let _permit = semaphore.acquire().await;
            let result = scrape_talk(&fetcher, &url).await;
            let _ = tx.send(result).await;
        });
    }

    // Drop our copy so the channel closes when every task has reported
    drop(tx);

    let mut talks = Vec::new();
    let mut failed = 0usize;
    while let Some(result) = rx.recv().await {
        match result {
            Some(talk) => talks.push(talk),
            None => failed += 1,
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    tracing::info!(
        "Crawled {} talks ({} extracted, {} failed)",
        total,
        talks.len(),
        failed
    );
    talks
}
