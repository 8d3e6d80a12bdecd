//! Integration tests for rule page fetching and caching.
//!
//! Uses mockito to stand in for the page host and count requests.

mod common;

use common::{RULE_ORIGIN, fetcher_for};
use fisca_editor::fetch::{FetchSettings, RuleFetcher};
use fisca_editor::utils::cache::PageCache;
use fisca_editor::utils::error::EditorError;
use std::sync::Arc;

/// Two fetches of the same URL hit the network once and return the same
/// content allocation.
#[tokio::test]
async fn test_second_fetch_is_served_from_cache() {
    let mut server = mockito::Server::new_async().await;
    let page = server
        .mock("GET", "/a")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body("<p>DESC_B</p>")
        .expect(1)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url(), Arc::new(PageCache::new()));
    let url = format!("{RULE_ORIGIN}/a");

    let first = fetcher.fetch(&url).await.expect("first fetch");
    let second = fetcher.fetch(&url).await.expect("second fetch");

    assert_eq!(&*first, "<p>DESC_B</p>");
    assert!(Arc::ptr_eq(&first, &second));
    page.assert_async().await;
}

/// A pre-seeded entry is returned without any request.
#[tokio::test]
async fn test_preseeded_cache_makes_no_request() {
    let mut server = mockito::Server::new_async().await;
    let page = server
        .mock("GET", "/a")
        .with_status(200)
        .with_body("network copy")
        .expect(0)
        .create_async()
        .await;

    let url = format!("{RULE_ORIGIN}/a");
    let cache = Arc::new(PageCache::with_entries([(url.as_str(), "X")]));
    let fetcher = fetcher_for(&server.url(), cache);

    let content = fetcher.fetch(&url).await.expect("cached fetch");
    assert_eq!(&*content, "X");
    page.assert_async().await;
}

/// Entries are keyed by the caller's URL, not the rewritten request URL.
#[tokio::test]
async fn test_cache_key_is_original_url() {
    let mut server = mockito::Server::new_async().await;
    let _page = server
        .mock("GET", "/kodomo/teate.html")
        .with_status(200)
        .with_body("allowance")
        .create_async()
        .await;

    let cache = Arc::new(PageCache::new());
    let fetcher = fetcher_for(&server.url(), Arc::clone(&cache));
    let url = format!("{RULE_ORIGIN}/kodomo/teate.html");

    fetcher.fetch(&url).await.expect("fetch through relay");
    assert_eq!(cache.urls(), vec![url]);
}

#[tokio::test]
async fn test_non_success_status_is_fetch_error() {
    let mut server = mockito::Server::new_async().await;
    let _page = server
        .mock("GET", "/missing")
        .with_status(404)
        .with_body("not here")
        .create_async()
        .await;

    let cache = Arc::new(PageCache::new());
    let fetcher = fetcher_for(&server.url(), Arc::clone(&cache));
    let url = format!("{RULE_ORIGIN}/missing");

    let err = fetcher.fetch(&url).await.expect_err("404 should fail");
    match &err {
        EditorError::Fetch { url: failed, message, .. } => {
            assert_eq!(failed, &url);
            assert!(message.contains("404"), "message: {message}");
        }
        other => panic!("expected Fetch error, got {other:?}"),
    }
    assert!(cache.is_empty(), "failed fetches must not be cached");
}

#[tokio::test]
async fn test_empty_body_is_fetch_error() {
    let mut server = mockito::Server::new_async().await;
    let _page = server
        .mock("GET", "/empty")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url(), Arc::new(PageCache::new()));

    let err = fetcher
        .fetch(&format!("{RULE_ORIGIN}/empty"))
        .await
        .expect_err("empty body should fail");
    assert!(matches!(err, EditorError::Fetch { .. }));
    assert!(err.to_string().contains("empty"));
}

/// Whitespace is page content, not an absent body.
#[tokio::test]
async fn test_whitespace_body_is_content() {
    let mut server = mockito::Server::new_async().await;
    let _page = server
        .mock("GET", "/blank")
        .with_status(200)
        .with_body("\n  \n")
        .create_async()
        .await;

    let cache = Arc::new(PageCache::new());
    let fetcher = fetcher_for(&server.url(), Arc::clone(&cache));

    let content = fetcher
        .fetch(&format!("{RULE_ORIGIN}/blank"))
        .await
        .expect("whitespace body is accepted");
    assert_eq!(&*content, "\n  \n");
    assert_eq!(cache.len(), 1);
}

/// A failed fetch is retried on the next call rather than remembered.
#[tokio::test]
async fn test_failure_is_not_cached() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("GET", "/flaky")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let fetcher = fetcher_for(&server.url(), Arc::new(PageCache::new()));
    let url = format!("{RULE_ORIGIN}/flaky");

    assert!(fetcher.fetch(&url).await.is_err());
    failing.assert_async().await;
    failing.remove_async().await;

    let recovered = server
        .mock("GET", "/flaky")
        .with_status(200)
        .with_body("back")
        .expect(1)
        .create_async()
        .await;

    let content = fetcher.fetch(&url).await.expect("second attempt");
    assert_eq!(&*content, "back");
    recovered.assert_async().await;
}

/// Without a rewrite the URL is requested as given.
#[tokio::test]
async fn test_plain_url_without_rewrite() {
    let mut server = mockito::Server::new_async().await;
    let page = server
        .mock("GET", "/direct")
        .with_status(200)
        .with_body("direct body")
        .expect(1)
        .create_async()
        .await;

    let fetcher = RuleFetcher::new(Arc::new(PageCache::new()), FetchSettings::default())
        .expect("Failed to create fetcher");

    let content = fetcher
        .fetch(&format!("{}/direct", server.url()))
        .await
        .expect("direct fetch");
    assert_eq!(&*content, "direct body");
    page.assert_async().await;
}
