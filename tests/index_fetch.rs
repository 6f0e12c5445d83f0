//! Integration tests for loading the article index over HTTP and from disk,
//! and for how a load result reaches the feed controller.

use postgrid::card::CardContext;
use postgrid::feed::{
    BatchPolicy, DisplayOp, FeedController, PageContext, PageMode, ViewportGeometry,
    LOAD_ERROR_NOTICE,
};
use postgrid::index::{IndexFetcher, IndexSource, LoadError, MAX_INDEX_SIZE};
use postgrid::location::PageLocation;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INDEX_JSON: &str = r#"[
    {"url": "/blog/one.html", "title": "One", "written": "2025-04-17", "topics": ["rust"]},
    {"url": "/blog/two.html", "title": "Two", "description": "Second post", "topics": ["go", "tools"]},
    {"url": "/blog/three.html", "title": "Three", "written": null, "topics": null}
]"#;

async fn serve(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content/index.json"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn fetcher_for(server: &MockServer) -> IndexFetcher {
    let url = Url::parse(&format!("{}/content/index.json", server.uri())).unwrap();
    IndexFetcher::new(reqwest::Client::new(), IndexSource::Remote(url))
}

fn page() -> PageContext {
    PageContext::new(
        PageLocation::parse("/blog"),
        ViewportGeometry::new(1024.0, 768.0),
    )
}

// ============================================================================
// Remote Index
// ============================================================================

#[tokio::test]
async fn test_fetch_remote_index() {
    let server = serve(
        ResponseTemplate::new(200)
            .set_body_string(INDEX_JSON)
            .insert_header("Content-Type", "application/json"),
    )
    .await;

    let index = fetcher_for(&server).fetch().await.unwrap();
    assert_eq!(index.len(), 3);
    assert_eq!(index[1].title, "Two");
    assert_eq!(index[1].topics(), ["go".to_string(), "tools".to_string()]);
}

#[tokio::test]
async fn test_from_base_url_finds_conventional_location() {
    let server = serve(ResponseTemplate::new(200).set_body_string(INDEX_JSON)).await;

    let source = IndexSource::from_base_url(&server.uri()).unwrap();
    let fetcher = IndexFetcher::new(reqwest::Client::new(), source);
    assert_eq!(fetcher.fetch().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_fetch_404_is_http_status() {
    let server = serve(ResponseTemplate::new(404)).await;

    match fetcher_for(&server).fetch().await {
        Err(LoadError::HttpStatus(404)) => {}
        other => panic!("Expected HttpStatus(404), got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetcher_for(&server).fetch().await;
    assert!(matches!(result, Err(LoadError::HttpStatus(503))));
}

#[tokio::test]
async fn test_fetch_non_array_is_malformed() {
    let server = serve(ResponseTemplate::new(200).set_body_string(r#"{"posts": []}"#)).await;

    let result = fetcher_for(&server).fetch().await;
    assert!(matches!(result, Err(LoadError::Malformed(_))));
}

#[tokio::test]
async fn test_fetch_record_without_title_is_malformed() {
    let server = serve(ResponseTemplate::new(200).set_body_string(r#"[{"url": "/a"}]"#)).await;

    let result = fetcher_for(&server).fetch().await;
    assert!(matches!(result, Err(LoadError::Malformed(_))));
}

#[tokio::test]
async fn test_fetch_oversized_body_is_rejected() {
    let body = vec![b' '; MAX_INDEX_SIZE + 1];
    let server = serve(ResponseTemplate::new(200).set_body_bytes(body)).await;

    let result = fetcher_for(&server).fetch().await;
    assert!(matches!(result, Err(LoadError::TooLarge)));
}

#[tokio::test]
async fn test_fetch_slow_server_times_out() {
    let server = serve(
        ResponseTemplate::new(200)
            .set_body_string(INDEX_JSON)
            .set_delay(Duration::from_millis(500)),
    )
    .await;

    let result = fetcher_for(&server)
        .with_timeout(Duration::from_millis(50))
        .fetch()
        .await;
    assert!(matches!(result, Err(LoadError::Timeout)));
}

// ============================================================================
// File Index
// ============================================================================

#[tokio::test]
async fn test_fetch_file_index() {
    let dir = std::env::temp_dir().join("postgrid_it_file_index");
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("index.json");
    std::fs::write(&file, INDEX_JSON).unwrap();

    let source = IndexSource::parse(file.to_str().unwrap()).unwrap();
    let fetcher = IndexFetcher::new(reqwest::Client::new(), source);
    let index = fetcher.fetch().await.unwrap();
    assert_eq!(index.len(), 3);

    std::fs::remove_dir_all(&dir).ok();
}

// ============================================================================
// Controller Initialization
// ============================================================================

#[tokio::test]
async fn test_initialize_from_server_appends_first_batch() {
    let server = serve(ResponseTemplate::new(200).set_body_string(INDEX_JSON)).await;
    let mut controller =
        FeedController::new(PageMode::FullListing, BatchPolicy::default(), CardContext::default());

    let delta = controller.initialize(&fetcher_for(&server), page()).await;

    assert_eq!(delta.ops().first(), Some(&DisplayOp::LoadingIndicator(true)));
    assert!(delta.contains(&DisplayOp::LoadingIndicator(false)));
    assert_eq!(delta.appended(), 3);
    assert_eq!(controller.available_topics(), ["go", "rust", "tools"]);
}

#[tokio::test]
async fn test_initialize_failure_shows_notice_and_stops() {
    let server = serve(ResponseTemplate::new(500)).await;
    let mut controller =
        FeedController::new(PageMode::FullListing, BatchPolicy::default(), CardContext::default());

    let delta = controller.initialize(&fetcher_for(&server), page()).await;

    assert!(controller.has_failed());
    assert!(delta.contains(&DisplayOp::ShowError(LOAD_ERROR_NOTICE.to_string())));
    assert_eq!(delta.appended(), 0);

    // Nothing happens after a failed load
    assert!(controller.load_more(None).is_empty());
    assert!(controller.toggle_topic("rust").is_empty());
}
