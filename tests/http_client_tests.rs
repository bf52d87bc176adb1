//! Integration tests for the HTTP client and configuration.
//!
//! These tests verify configuration validation, default headers, retry
//! handling and the API-level status and version calls.

use netbox_api::clients::{HttpClient, HttpMethod, HttpRequest};
use netbox_api::rest::Query;
use netbox_api::{Api, ApiToken, BaseUrl, ConfigError, HttpError, NetboxConfig};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_requires_base_url() {
    let result = NetboxConfig::builder().build();

    assert!(matches!(
        result,
        Err(ConfigError::MissingRequiredField { field: "base_url" })
    ));
}

#[test]
fn test_config_rejects_zero_workers() {
    let result = NetboxConfig::builder()
        .base_url(BaseUrl::new("https://netbox.example.com").unwrap())
        .max_workers(0)
        .build();

    assert!(matches!(result, Err(ConfigError::InvalidMaxWorkers { value: 0 })));
}

#[test]
fn test_base_url_validation() {
    assert!(matches!(
        BaseUrl::new("ftp://netbox.example.com"),
        Err(ConfigError::InvalidBaseUrl { .. })
    ));
    assert_eq!(
        BaseUrl::new("https://netbox.example.com/netbox/").unwrap().as_ref(),
        "https://netbox.example.com/netbox/api"
    );
    assert_eq!(
        BaseUrl::new("https://netbox.example.com/api/").unwrap().as_ref(),
        "https://netbox.example.com/api"
    );
}

#[test]
fn test_token_is_masked_in_debug_output() {
    let token = ApiToken::new("0123456789abcdef").unwrap();

    assert!(!format!("{token:?}").contains("0123456789abcdef"));
    assert!(matches!(ApiToken::new("  "), Err(ConfigError::EmptyToken)));
}

// ============================================================================
// Requests
// ============================================================================

fn client_for(server: &MockServer, tries: u32) -> HttpClient {
    let config = NetboxConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .token(ApiToken::new("0123456789abcdef").unwrap())
        .tries(tries)
        .build()
        .unwrap();
    HttpClient::new(config).unwrap()
}

#[tokio::test]
async fn test_requests_carry_token_and_json_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/sites/"))
        .and(header("Authorization", "Token 0123456789abcdef"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let request = HttpRequest::builder(HttpMethod::Get, "dcim/sites/")
        .build()
        .unwrap();
    let response = client.request(request).await.unwrap();

    assert!(response.is_ok());
    assert_eq!(response.body, json!({"results": []}));
}

#[tokio::test]
async fn test_rate_limited_request_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/sites/"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/sites/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);
    let request = HttpRequest::builder(HttpMethod::Get, "dcim/sites/")
        .build()
        .unwrap();

    assert!(client.request(request).await.is_ok());
}

#[tokio::test]
async fn test_negative_retry_after_falls_back_to_default_wait() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/sites/"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "-1"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/sites/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = NetboxConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .tries(2)
        .build()
        .unwrap();
    let api = Api::new(config).unwrap();

    let count = api.dcim().endpoint("sites").count(Query::new()).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_single_try_reports_response_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/sites/"))
        .respond_with(
            ResponseTemplate::new(503)
                .insert_header("X-Request-Id", "req-42")
                .set_body_json(json!({"detail": "maintenance"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let request = HttpRequest::builder(HttpMethod::Get, "dcim/sites/")
        .build()
        .unwrap();

    match client.request(request).await {
        Err(HttpError::Response(e)) => {
            assert_eq!(e.code, 503);
            assert_eq!(e.error_reference.as_deref(), Some("req-42"));
            assert!(e.message.contains("maintenance"));
        }
        other => panic!("expected a response error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dcim/sites/"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"detail": "forbidden"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let request = HttpRequest::builder(HttpMethod::Get, "dcim/sites/")
        .build()
        .unwrap();

    let error = client.request(request).await.unwrap_err();
    assert_eq!(error.status(), Some(403));
}

// ============================================================================
// Api
// ============================================================================

#[tokio::test]
async fn test_status_and_version() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "netbox-version": "4.1.3",
            "python-version": "3.12.3"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("API-Version", "4.1")
                .set_body_json(json!({"dcim": format!("{}/api/dcim/", server.uri())})),
        )
        .mount(&server)
        .await;

    let config = NetboxConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .build()
        .unwrap();
    let api = Api::new(config).unwrap();

    assert_eq!(api.status().await.unwrap()["netbox-version"], json!("4.1.3"));
    assert_eq!(api.version().await.unwrap().as_deref(), Some("4.1"));
}
