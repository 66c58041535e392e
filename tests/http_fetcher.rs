//! Integration tests for the reqwest-backed fetcher against mock servers.

use std::time::Duration;

use link_crawler::{FailureKind, FetchError, FetchSettings, Fetcher, HttpFetcher};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher(settings: FetchSettings) -> HttpFetcher {
    HttpFetcher::new(&settings).expect("client builds")
}

async fn serve(route: &str, response: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(&mock_server)
        .await;
    mock_server
}

#[tokio::test]
async fn test_fetch_returns_body_and_content_type() {
    let server = serve(
        "/index.html",
        ResponseTemplate::new(200)
            .set_body_raw(r#"<a href="/next">next</a>"#, "text/html; charset=utf-8"),
    )
    .await;
    let url = format!("{}/index.html", server.uri());

    let page = fetcher(FetchSettings::default()).fetch(&url).await.unwrap();

    assert_eq!(page.url, url);
    assert_eq!(page.final_url, url);
    assert_eq!(page.media_type().as_deref(), Some("text/html"));
    assert_eq!(page.body, br#"<a href="/next">next</a>"#.to_vec());
}

#[tokio::test]
async fn test_not_found_is_status_error() {
    let server = serve("/missing", ResponseTemplate::new(404)).await;
    let url = format!("{}/missing", server.uri());

    let err = fetcher(FetchSettings::default()).fetch(&url).await.unwrap_err();

    assert_eq!(err, FetchError::Status(404));
    assert_eq!(err.kind(), FailureKind::Fetch);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = serve(
        "/slow",
        ResponseTemplate::new(200)
            .set_body_string("late")
            .set_delay(Duration::from_secs(3)),
    )
    .await;
    let url = format!("{}/slow", server.uri());
    let settings = FetchSettings {
        timeout: Duration::from_millis(200),
        ..FetchSettings::default()
    };

    let err = fetcher(settings).fetch(&url).await.unwrap_err();

    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn test_oversized_body_is_allocation_failure() {
    let server = serve(
        "/big",
        ResponseTemplate::new(200).set_body_string("x".repeat(4096)),
    )
    .await;
    let url = format!("{}/big", server.uri());
    let settings = FetchSettings {
        max_body_bytes: 1024,
        ..FetchSettings::default()
    };

    let err = fetcher(settings).fetch(&url).await.unwrap_err();

    assert_eq!(err, FetchError::BodyTooLarge { limit: 1024 });
    assert_eq!(err.kind(), FailureKind::Allocation);
}

#[tokio::test]
async fn test_redirect_records_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("moved", "text/plain"))
        .mount(&server)
        .await;

    let page = fetcher(FetchSettings::default())
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap();

    assert_eq!(page.final_url, format!("{}/new", server.uri()));
    assert_eq!(page.body, b"moved".to_vec());
}

#[tokio::test]
async fn test_redirect_loop_is_reported() {
    let server = serve(
        "/loop",
        ResponseTemplate::new(302).insert_header("location", "/loop"),
    )
    .await;

    let err = fetcher(FetchSettings::default())
        .fetch(&format!("{}/loop", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err, FetchError::TooManyRedirects);
}

#[tokio::test]
async fn test_connection_refused_is_fetch_error() {
    // Nothing listens on port 1
    let err = fetcher(FetchSettings::default())
        .fetch("http://127.0.0.1:1/")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::Fetch);
    assert!(matches!(err, FetchError::Connect(_)), "got {err:?}");
}
