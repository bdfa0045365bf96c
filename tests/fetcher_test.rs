//! Integration tests for the fetcher

mod common;

use std::time::{Duration, Instant};

use newsharvest::crawler::fetcher::Fetcher;
use newsharvest::error::{ErrorCategory, HarvestErrorTrait};
use newsharvest::utils::error::FetchError;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::fetch_config;

fn user_agents(requests: &[wiremock::Request]) -> Vec<String> {
    requests
        .iter()
        .map(|r| {
            r.headers
                .get("user-agent")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

#[tokio::test]
async fn test_fetch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>Hello</body></html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(3, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let body = session
        .fetch(&format!("{}/news", mock_server.uri()))
        .await
        .unwrap();
    assert!(body.contains("Hello"));
    assert_eq!(session.cursor(), 0);
}

#[tokio::test]
async fn test_browser_headers_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .and(header("user-agent", "agent-0"))
        .and(header_exists("accept"))
        .and(header_exists("accept-language"))
        .and(header_exists("referer"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(1, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let result = session.fetch(&format!("{}/news", mock_server.uri())).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_forbidden_rotates_identity_without_backoff() {
    let mock_server = MockServer::start().await;

    // Two rejections, then success
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    // Long backoff: a 403 must not sleep it
    let fetcher = Fetcher::new(&fetch_config(3, 5_000)).unwrap();
    let mut session = fetcher.session().unwrap();

    let started = Instant::now();
    let body = session
        .fetch(&format!("{}/news", mock_server.uri()))
        .await
        .unwrap();
    assert!(body.contains("ok"));
    assert!(started.elapsed() < Duration::from_secs(3));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert_eq!(user_agents(&requests), vec!["agent-0", "agent-1", "agent-2"]);
    assert_eq!(session.cursor(), 2);
}

#[tokio::test]
async fn test_rotation_wraps_around() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(403))
        .expect(4)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(4, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let err = session
        .fetch(&format!("{}/news", mock_server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(
        user_agents(&requests),
        vec!["agent-0", "agent-1", "agent-2", "agent-0"]
    );
}

#[tokio::test]
async fn test_server_error_retry() {
    let mock_server = MockServer::start().await;

    // First two requests fail
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    // Third request succeeds
    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Success</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(3, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let body = session
        .fetch(&format!("{}/news", mock_server.uri()))
        .await
        .unwrap();
    assert!(body.contains("Success"));

    // Non-403 failures keep the identity
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(user_agents(&requests), vec!["agent-0"; 3]);
}

#[tokio::test]
async fn test_retries_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/news"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(2, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let err = session
        .fetch(&format!("{}/news", mock_server.uri()))
        .await
        .unwrap_err();

    match err {
        FetchError::RetriesExhausted { attempts, last, .. } => {
            assert_eq!(attempts, 2);
            assert_eq!(last.status(), Some(503));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(3, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let err = session
        .fetch(&format!("{}/missing", mock_server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_recoverable());
    assert!(matches!(&err, FetchError::RetriesExhausted { last, .. } if last.is_recoverable()));
    assert_eq!(err.category(), ErrorCategory::Network);
}

#[tokio::test]
async fn test_empty_body_is_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/blank"))
        .respond_with(ResponseTemplate::new(200).set_body_string("   \n"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(2, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let err = session
        .fetch(&format!("{}/blank", mock_server.uri()))
        .await
        .unwrap_err();

    match err {
        FetchError::RetriesExhausted { last, .. } => {
            assert!(matches!(*last, FetchError::EmptyBody { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html>late</html>")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(1, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let err = session
        .fetch_with_retry(
            &format!("{}/slow", mock_server.uri()),
            1,
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();

    match err {
        FetchError::RetriesExhausted { attempts, last, .. } => {
            assert_eq!(attempts, 1);
            assert!(matches!(*last, FetchError::Timeout { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_sessions_rotate_independently() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/guarded"))
        .respond_with(ResponseTemplate::new(403))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/guarded"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(3, 10)).unwrap();
    let url = format!("{}/guarded", mock_server.uri());

    let mut first = fetcher.session().unwrap();
    first.fetch(&url).await.unwrap();
    assert_eq!(first.cursor(), 1);

    // A new call starts from the first identity again
    let mut second = fetcher.session().unwrap();
    assert_eq!(second.cursor(), 0);
    second.fetch(&url).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(user_agents(&requests), vec!["agent-0", "agent-1", "agent-0"]);
}

#[tokio::test]
async fn test_charset_from_header() {
    let mock_server = MockServer::start().await;

    // "Café" in windows-1252
    let body = b"<html><body>Caf\xe9</body></html>".to_vec();
    Mock::given(method("GET"))
        .and(path("/latin"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=windows-1252"))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(1, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let body = session
        .fetch(&format!("{}/latin", mock_server.uri()))
        .await
        .unwrap();
    assert!(body.contains("Café"));
}

#[tokio::test]
async fn test_charset_from_meta() {
    let mock_server = MockServer::start().await;

    let body = b"<html><head><meta charset=\"iso-8859-1\"></head><body>Na\xefve</body></html>".to_vec();
    Mock::given(method("GET"))
        .and(path("/meta"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(&fetch_config(1, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let body = session
        .fetch(&format!("{}/meta", mock_server.uri()))
        .await
        .unwrap();
    assert!(body.contains("Naïve"));
}

#[tokio::test]
async fn test_connection_refused_exhausts() {
    // Nothing listens on the reserved port
    let fetcher = Fetcher::new(&fetch_config(2, 10)).unwrap();
    let mut session = fetcher.session().unwrap();

    let err = session.fetch("http://127.0.0.1:9/news").await.unwrap_err();
    match err {
        FetchError::RetriesExhausted { attempts, last, .. } => {
            assert_eq!(attempts, 2);
            assert!(matches!(*last, FetchError::Transport { .. } | FetchError::Timeout { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
