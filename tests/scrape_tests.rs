//! Integration tests for the scrape pipelines
//!
//! These tests use wiremock to stand in for the study site and exercise the
//! fetch/retry policy, the talk crawl end-to-end (including client-state
//! decoding), listing discovery, and the glossary collection scrape.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use conference_corpus::config::{Config, SourceConfig};
use conference_corpus::fetch::Fetcher;
use conference_corpus::glossary::scrape_collection;
use conference_corpus::talks::{crawl_talks, LinkDiscovery};
use conference_corpus::FetchError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test configuration pointed at a mock server, with fast retry timing
fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.source = SourceConfig {
        base_url: base_url.to_string(),
        lang: "eng".to_string(),
    };
    config.crawler.politeness_delay_ms = 0;
    config.retry.max_attempts = 3;
    config.retry.base_backoff_ms = 10;
    config
}

fn fetcher_for(server: &MockServer) -> Fetcher {
    Fetcher::new(&test_config(&server.uri())).expect("fetcher should build")
}

/// Builds a talk page with an embedded client state carrying one footnote
fn talk_page_html(state_key: &str) -> String {
    let state = serde_json::json!({
        "reader": { "contentStore": { state_key: { "content": { "footnotes": {
            "note1": {
                "marker": "1.",
                "referenceUris": [
                    { "href": "/study/scriptures/bofm/mosiah/3?lang=eng&id=p19#p19" }
                ]
            }
        }}}}}
    });
    let encoded = BASE64.encode(state.to_string().as_bytes());

    format!(
        r#"<html><head>
            <script>window.__INITIAL_STATE__ = "{}";</script>
        </head><body><article id="main">
            <header>
                <h1>Good Talk</h1>
                <p class="kicker">A thought.</p>
                <div class="byline">
                    <p class="author-name">By Jane Example</p>
                    <p class="author-role">Of the Example Quorum</p>
                </div>
            </header>
            <div class="body-block">
                <p>Opening words.<a class="note-ref" data-scroll-id="note1"><sup>1</sup></a></p>
                <p></p>
                <p>Closing words.</p>
            </div>
        </article></body></html>"#,
        encoded
    )
}

#[tokio::test]
async fn test_transient_failures_retried_until_success() {
    let server = MockServer::start().await;

    // Two server errors, then a good response on the final attempt
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("recovered"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let body = fetcher
        .fetch_html(&format!("{}/flaky", server.uri()))
        .await
        .expect("final attempt should succeed");
    assert_eq!(body, "recovered");
}

#[tokio::test]
async fn test_retry_exhaustion_surfaces_hard_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let result = fetcher.fetch_html(&format!("{}/down", server.uri())).await;
    assert!(matches!(
        result,
        Err(FetchError::Exhausted { attempts: 3, .. })
    ));
}

#[tokio::test]
async fn test_permanent_client_error_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let result = fetcher.fetch_html(&format!("{}/gone", server.uri())).await;
    assert!(matches!(
        result,
        Err(FetchError::PermanentStatus { status: 404, .. })
    ));
}

#[tokio::test]
async fn test_discovery_expands_decade_aggregators() {
    let server = MockServer::start().await;

    let index_html = r#"
        <a href="/study/general-conference/2021/04?lang=eng">April 2021</a>
        <a href="/study/general-conference/19711979?lang=eng">1971-1979</a>
    "#;
    let decade_html = r#"
        <a href="/study/general-conference/1971/04?lang=eng">April 1971</a>
        <a href="/study/general-conference/1971/10?lang=eng">October 1971</a>
        <a href="/study/general-conference/1971/10?lang=eng">October 1971 again</a>
    "#;

    Mock::given(method("GET"))
        .and(path("/study/general-conference"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/study/general-conference/19711979"))
        .respond_with(ResponseTemplate::new(200).set_body_string(decade_html))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let base = server.uri();
    let discovery = LinkDiscovery::new(&fetcher, &base);
    let periods = discovery
        .discover_period_pages(&format!("{}/study/general-conference?lang=eng", base))
        .await;

    assert_eq!(periods.len(), 3);
    assert!(periods[0].contains("/2021/04"));
    assert!(periods[1].contains("/1971/04"));
    assert!(periods[2].contains("/1971/10"));
}

#[tokio::test]
async fn test_unreachable_index_yields_empty_set() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/study/general-conference"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let base = server.uri();
    let discovery = LinkDiscovery::new(&fetcher, &base);
    let periods = discovery
        .discover_period_pages(&format!("{}/study/general-conference?lang=eng", base))
        .await;
    assert!(periods.is_empty());
}

#[tokio::test]
async fn test_crawl_isolates_failed_documents() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/study/general-conference/2020/04/good-talk"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(talk_page_html("/eng/general-conference/2020/04/good-talk")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/study/general-conference/2020/04/bad-talk"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let urls = vec![
        format!(
            "{}/study/general-conference/2020/04/good-talk?lang=eng",
            server.uri()
        ),
        format!(
            "{}/study/general-conference/2020/04/bad-talk?lang=eng",
            server.uri()
        ),
    ];

    let talks = crawl_talks(fetcher, urls, 4).await;

    // The failed document becomes a sentinel and is excluded; the sibling survives
    assert_eq!(talks.len(), 1);
    let talk = &talks[0];
    assert_eq!(talk.title, "Good Talk");
    assert_eq!(talk.speaker, "Jane Example");
    assert_eq!(talk.year, "2020");
    assert_eq!(talk.season, "April");

    // Footnote resolved from the decoded state, empty paragraph skipped
    assert_eq!(talk.content.len(), 2);
    assert_eq!(talk.content[0].paragraph_number, 1);
    assert_eq!(talk.content[1].paragraph_number, 2);
    let note = &talk.content[0].linked_footnotes[0];
    assert_eq!(note.footnote_number, "1");
    assert_eq!(
        note.parsed_scripture_references,
        vec!["Book of Mormon Mosiah 3:19".to_string()]
    );
    assert!(talk.content[1].linked_footnotes.is_empty());
}

#[tokio::test]
async fn test_glossary_collection_records_per_entry_failure() {
    let server = MockServer::start().await;

    let index_html = r#"
        <a href="/study/scriptures/tg/faith?lang=eng">Faith</a>
        <a href="/study/scriptures/tg/broken?lang=eng">Broken</a>
    "#;
    let entry_html = r#"
        <article>
            <nav class="index">
                <p class="title" id="p1">See also
                    <a href="/study/scriptures/tg/hope?lang=eng">Hope</a>
                </p>
            </nav>
            <p id="p2">Faith precedes the miracle
                <a href="/study/scriptures/ether/12?lang=eng&id=p12#p12">Ether 12:12</a>.
            </p>
        </article>
    "#;

    Mock::given(method("GET"))
        .and(path("/study/scriptures/tg"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/study/scriptures/tg/faith"))
        .respond_with(ResponseTemplate::new(200).set_body_string(entry_html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/study/scriptures/tg/broken"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let base = server.uri();
    let entries = scrape_collection(
        &fetcher,
        "TG",
        &base,
        &format!("{}/study/scriptures/tg?lang=eng", base),
        "/study/scriptures/tg/",
        None,
    )
    .await
    .expect("collection scrape should continue past entry failures");

    assert_eq!(entries.len(), 2);

    let faith = &entries[0];
    assert_eq!(faith.entry, "Faith");
    assert!(faith.error.is_none());
    assert_eq!(faith.paragraphs.len(), 2);
    assert_eq!(faith.paragraphs[0].kind.as_deref(), Some("see"));
    assert_eq!(
        faith.paragraphs[1].scripture_references.as_ref().unwrap(),
        &vec!["Ether 12:12".to_string()]
    );

    // The broken entry is kept with an explicit error marker
    let broken = &entries[1];
    assert_eq!(broken.entry, "Broken");
    assert!(broken.paragraphs.is_empty());
    assert!(broken.error.is_some());
}
