//! HTTP client for NetBox API communication.
//!
//! This module provides the [`HttpClient`] type for making authenticated
//! requests to the NetBox REST API with automatic retry handling.

use std::collections::HashMap;

use crate::clients::errors::{
    HttpError, HttpResponseError, InvalidHttpRequestError, MaxHttpRetriesExceededError,
};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{BaseUrl, NetboxConfig};
use crate::rest::ModelRegistry;

/// Fixed retry wait time in seconds.
pub const RETRY_WAIT_TIME: u64 = 1;

/// Library version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the NetBox API.
///
/// The client handles:
/// - URL construction from the configured API root
/// - Default headers including User-Agent and the `Token` authorization
/// - Automatic retry logic for 429 and 5xx responses
///
/// The client also carries the [`NetboxConfig`] so that endpoints and records
/// can read pagination settings and the model registry from it.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
/// Endpoints hold it in an `Arc`; records only keep a weak reference.
///
/// # Example
///
/// ```rust,ignore
/// use netbox_api::{BaseUrl, NetboxConfig};
/// use netbox_api::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let config = NetboxConfig::builder()
///     .base_url(BaseUrl::new("https://netbox.example.com")?)
///     .build()?;
/// let client = HttpClient::new(config)?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "dcim/sites/").build()?;
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Client configuration.
    config: NetboxConfig,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client cannot
    /// be created (e.g. TLS initialization failure).
    pub fn new(config: NetboxConfig) -> Result<Self, HttpError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}NetBox API Library v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        if let Some(token) = config.token() {
            default_headers.insert(
                "Authorization".to_string(),
                format!("Token {}", token.as_ref()),
            );
        }

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            config,
            default_headers,
        })
    }

    /// Returns the API root URL for this client.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        self.config.base_url()
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &NetboxConfig {
        &self.config
    }

    /// Returns the model registry used to type records.
    #[must_use]
    pub const fn models(&self) -> &ModelRegistry {
        self.config.models()
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Resolves a request path to a full URL.
    ///
    /// Absolute URLs are returned unchanged; anything else is joined onto
    /// the API root.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            self.base_url().join(path)
        }
    }

    /// Sends an HTTP request to the NetBox API.
    ///
    /// The number of attempts is the larger of the request's `tries` and the
    /// configured `tries`. Only 429 and 5xx responses are retried.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    /// - Max retries exceeded (`MaxRetries`)
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.url_for(&request.path);
        let parsed_url = reqwest::Url::parse(&url)
            .map_err(|_| InvalidHttpRequestError::InvalidUrl { url: url.clone() })?;

        let mut headers = self.default_headers.clone();
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let max_tries = request.tries.max(self.config.tries());
        let mut tries: u32 = 0;
        loop {
            tries += 1;

            let method = match request.http_method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
                HttpMethod::Put => reqwest::Method::PUT,
                HttpMethod::Patch => reqwest::Method::PATCH,
                HttpMethod::Delete => reqwest::Method::DELETE,
                HttpMethod::Options => reqwest::Method::OPTIONS,
            };
            let mut req_builder = self.client.request(method, parsed_url.clone());

            for (key, value) in &headers {
                req_builder = req_builder.header(key, value);
            }

            if !request.query.is_empty() {
                req_builder = req_builder.query(&request.query);
            }

            if let Some(body) = &request.body {
                req_builder = req_builder.body(body.to_string());
            }

            tracing::debug!(method = %request.http_method, url = %url, attempt = tries, "Sending request");
            let res = req_builder.send().await?;

            let code = res.status().as_u16();
            let res_headers = Self::parse_response_headers(res.headers());
            let body_text = res.text().await.unwrap_or_default();

            let body = if body_text.trim().is_empty() {
                serde_json::Value::Null
            } else {
                serde_json::from_str(&body_text)
                    .unwrap_or_else(|_| serde_json::json!({ "raw_body": body_text }))
            };

            let response = HttpResponse::new(code, res_headers, body);

            if response.is_ok() {
                return Ok(response);
            }

            let error_message = Self::serialize_error(&response);
            let error_reference = response.request_id().map(String::from);

            let should_retry = code == 429 || code >= 500;
            if !should_retry {
                return Err(HttpError::Response(HttpResponseError {
                    code,
                    message: error_message,
                    error_reference,
                }));
            }

            if tries >= max_tries {
                if max_tries == 1 {
                    return Err(HttpError::Response(HttpResponseError {
                        code,
                        message: error_message,
                        error_reference,
                    }));
                }
                return Err(HttpError::MaxRetries(MaxHttpRetriesExceededError {
                    code,
                    tries: max_tries,
                    message: error_message,
                    error_reference,
                }));
            }

            let delay = Self::calculate_retry_delay(&response, code);
            tracing::warn!(
                "Retrying {} {} after status {} (attempt {} of {})",
                request.http_method,
                url,
                code,
                tries,
                max_tries
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }

    /// Calculates the retry delay based on response and status code.
    fn calculate_retry_delay(response: &HttpResponse, status: u16) -> std::time::Duration {
        if status == 429 {
            if let Some(delay) = response
                .retry_request_after
                .and_then(|secs| std::time::Duration::try_from_secs_f64(secs).ok())
            {
                return delay;
            }
        }
        std::time::Duration::from_secs(RETRY_WAIT_TIME)
    }

    /// Serializes an error response body for inclusion in an error.
    fn serialize_error(response: &HttpResponse) -> String {
        match &response.body {
            serde_json::Value::Null => "{}".to_string(),
            body => body.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiToken;

    fn create_test_config(token: Option<&str>) -> NetboxConfig {
        let mut builder =
            NetboxConfig::builder().base_url(BaseUrl::new("https://netbox.example.com").unwrap());
        if let Some(token) = token {
            builder = builder.token(ApiToken::new(token).unwrap());
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_client_construction_keeps_base_url() {
        let client = HttpClient::new(create_test_config(None)).unwrap();

        assert_eq!(client.base_url().as_ref(), "https://netbox.example.com/api");
    }

    #[test]
    fn test_user_agent_header_format() {
        let client = HttpClient::new(create_test_config(None)).unwrap();

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.contains("NetBox API Library v"));
        assert!(user_agent.contains("Rust"));
    }

    #[test]
    fn test_token_authorization_header() {
        let client = HttpClient::new(create_test_config(Some("abc123"))).unwrap();

        assert_eq!(
            client.default_headers().get("Authorization"),
            Some(&"Token abc123".to_string())
        );
    }

    #[test]
    fn test_no_authorization_header_without_token() {
        let client = HttpClient::new(create_test_config(None)).unwrap();

        assert!(client.default_headers().get("Authorization").is_none());
    }

    #[test]
    fn test_json_headers() {
        let client = HttpClient::new(create_test_config(None)).unwrap();

        assert_eq!(
            client.default_headers().get("Accept"),
            Some(&"application/json".to_string())
        );
        assert_eq!(
            client.default_headers().get("Content-Type"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn test_url_for_relative_and_absolute_paths() {
        let client = HttpClient::new(create_test_config(None)).unwrap();

        assert_eq!(
            client.url_for("dcim/devices/"),
            "https://netbox.example.com/api/dcim/devices/"
        );
        assert_eq!(
            client.url_for("https://netbox.example.com/api/dcim/devices/?offset=50"),
            "https://netbox.example.com/api/dcim/devices/?offset=50"
        );
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = NetboxConfig::builder()
            .base_url(BaseUrl::new("https://netbox.example.com").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();

        let client = HttpClient::new(config).unwrap();

        let user_agent = client.default_headers().get("User-Agent").unwrap();
        assert!(user_agent.starts_with("MyApp/1.0 | "));
        assert!(user_agent.contains("NetBox API Library"));
    }
}
