//! Integration tests for the fetch client using wiremock
//!
//! These tests mock upstream services to verify status classification,
//! header merging and transport failure handling.

use genescope_egress::{FetchClient, FetchError, HttpClientConfig};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path, query_param},
};

fn client() -> FetchClient {
    FetchClient::new(&HttpClientConfig::default()).unwrap()
}

#[tokio::test]
async fn test_fetch_success_returns_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/genes"))
        .and(query_param("search", "IL2RA"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"key": "value"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = client()
        .get(
            &format!("{}/genes", mock_server.uri()),
            &[("search", "IL2RA")],
            &HeaderMap::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.url().path(), "/genes");

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["key"], "value");
}

#[tokio::test]
async fn test_caller_headers_override_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/csv"))
        .and(header("content-type", "text/csv"))
        .and(header("x-extra", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("a,b\n1,2\n", "text/csv"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    headers.insert("x-extra", HeaderValue::from_static("1"));

    let response = client()
        .get(&format!("{}/csv", mock_server.uri()), &[], &headers)
        .await
        .unwrap();

    assert_eq!(response.content_type(), Some("text/csv"));
    assert_eq!(&response.bytes().await.unwrap()[..], b"a,b\n1,2\n");
}

#[tokio::test]
async fn test_error_statuses_become_response_errors() {
    for status in [400u16, 404, 500] {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_raw("<html></html>", "text/html"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/anything", mock_server.uri());
        let err = client().get(&url, &[], &HeaderMap::new()).await.unwrap_err();

        match err {
            FetchError::Response {
                status: got,
                url: got_url,
                content_type,
            } => {
                assert_eq!(got, status);
                assert_eq!(got_url, url);
                assert_eq!(content_type.as_deref(), Some("text/html"));
            }
            other => panic!("expected response error for {}, got {:?}", status, other),
        }
    }
}

#[tokio::test]
async fn test_connection_refused_is_client_error() {
    // Grab a free port and close it again so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let err = client()
        .get(&format!("http://127.0.0.1:{}/genes", port), &[], &HeaderMap::new())
        .await
        .unwrap_err();

    assert!(
        matches!(err, FetchError::Client { .. }),
        "expected client error, got {:?}",
        err
    );
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_timeout_is_client_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig {
        timeout_secs: 1,
        ..Default::default()
    };
    let client = FetchClient::new(&config).unwrap();

    let err = client
        .get(&format!("{}/slow", mock_server.uri()), &[], &HeaderMap::new())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Client { .. }));
}

#[tokio::test]
async fn test_undecodable_json_is_unexpected_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&mock_server)
        .await;

    let response = client()
        .get(&format!("{}/broken", mock_server.uri()), &[], &HeaderMap::new())
        .await
        .unwrap();

    let err = response.json::<serde_json::Value>().await.unwrap_err();
    assert!(matches!(err, FetchError::Unexpected { .. }));
}
