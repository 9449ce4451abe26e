use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

use mnv_scorecard::workflows::source::{
    source_router, UrlTextFetcher, FETCH_URL_ROUTE, FETCH_USER_AGENT, MAX_TEXT_CHARS,
};

async fn fetch(url: String) -> (StatusCode, Value) {
    let fetcher = UrlTextFetcher::new(Duration::from_secs(5)).expect("client builds");
    let request = Request::post(FETCH_URL_ROUTE)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "url": url }).to_string()))
        .unwrap();

    let response = source_router(Arc::new(fetcher))
        .oneshot(request)
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn page_text_is_extracted() {
    let mock_server = MockServer::start().await;
    let page = r#"<!doctype html><html><head><title>Plan</title>
        <script>window.track = true;</script></head>
        <body><nav>Menu</nav><main><h1>IPMVP Option C</h1>
        <p>Baseline: 12&nbsp;months of utility bills &amp; weather data.</p></main>
        <footer>Contact us</footer></body></html>"#;

    Mock::given(matchers::method("GET"))
        .and(matchers::path("/plans/option-c"))
        .and(matchers::header("user-agent", FETCH_USER_AGENT))
        .and(matchers::headers(
            "accept",
            vec!["text/html", "application/xhtml+xml", "text/plain", "application/pdf"],
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html; charset=utf-8"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = fetch(format!("{}/plans/option-c", mock_server.uri())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "text": "Plan IPMVP Option C Baseline: 12 months of utility bills & weather data.",
            "contentType": "text/html; charset=utf-8"
        })
    );
}

#[tokio::test]
async fn long_pages_are_truncated() {
    let mock_server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("w".repeat(MAX_TEXT_CHARS * 2), "text/plain"),
        )
        .mount(&mock_server)
        .await;

    let (status, body) = fetch(format!("{}/long.txt", mock_server.uri())).await;

    assert_eq!(status, StatusCode::OK);
    let text = body["text"].as_str().expect("text");
    assert_eq!(text.len(), MAX_TEXT_CHARS + 3);
    assert!(text.ends_with("w..."));
    assert_eq!(body["contentType"], "text/plain");
}

#[tokio::test]
async fn upstream_status_is_mirrored() {
    let mock_server = MockServer::start().await;
    Mock::given(matchers::method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let (status, body) = fetch(format!("{}/missing", mock_server.uri())).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Failed to fetch URL: Not Found" }));
}

#[tokio::test]
async fn connection_failures_are_server_errors() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/plan", listener.local_addr().unwrap());
    drop(listener);

    let (status, body) = fetch(url).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().expect("error message");
    assert!(message.starts_with("Failed to fetch: "), "{message}");
}
