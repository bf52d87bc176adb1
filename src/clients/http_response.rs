//! HTTP response types for the NetBox API client.
//!
//! This module provides the [`HttpResponse`] type for accessing API response
//! data and the NetBox-specific headers that come with it.

use std::collections::HashMap;

/// An HTTP response from the NetBox API.
///
/// Header names are stored lowercased; a header may carry several values.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers (headers may have multiple values).
    pub headers: HashMap<String, Vec<String>>,
    /// The parsed response body (`Value::Null` for empty bodies).
    pub body: serde_json::Value,
    /// Seconds to wait before retrying (from `Retry-After` header).
    pub retry_request_after: Option<f64>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing the `Retry-After` header.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: serde_json::Value) -> Self {
        let retry_request_after = headers
            .get("retry-after")
            .and_then(|values| values.first())
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs >= 0.0);

        Self {
            code,
            headers,
            body,
            retry_request_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the `X-Request-Id` header value, if present.
    ///
    /// This ID is useful for debugging and should be included in error reports.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-request-id")
    }

    /// Returns the `API-Version` header value, if present.
    ///
    /// NetBox reports its major.minor version here (e.g. `"4.1"`).
    #[must_use]
    pub fn api_version(&self) -> Option<&str> {
        self.header("api-version")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_ok_returns_true_for_2xx() {
        for code in [200, 201, 204, 299] {
            let response = HttpResponse::new(code, HashMap::new(), json!({}));
            assert!(
                response.is_ok(),
                "Expected is_ok() to be true for code {code}"
            );
        }
    }

    #[test]
    fn test_is_ok_returns_false_for_4xx_and_5xx() {
        for code in [400, 404, 409, 429, 500, 503] {
            let response = HttpResponse::new(code, HashMap::new(), json!({}));
            assert!(!response.is_ok(), "Expected is_ok() false for {code}");
        }
    }

    #[test]
    fn test_request_id_and_api_version() {
        let mut headers = HashMap::new();
        headers.insert("x-request-id".to_string(), vec!["req-42".to_string()]);
        headers.insert("api-version".to_string(), vec!["4.1".to_string()]);

        let response = HttpResponse::new(200, headers, json!({}));
        assert_eq!(response.request_id(), Some("req-42"));
        assert_eq!(response.api_version(), Some("4.1"));
        assert_eq!(response.header("API-Version"), Some("4.1"));
    }

    #[test]
    fn test_missing_headers_are_none() {
        let response = HttpResponse::new(200, HashMap::new(), json!(null));
        assert!(response.request_id().is_none());
        assert!(response.api_version().is_none());
        assert!(response.retry_request_after.is_none());
    }

    #[test]
    fn test_parses_retry_after() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), vec!["2.5".to_string()]);

        let response = HttpResponse::new(429, headers, json!({}));
        assert_eq!(response.retry_request_after, Some(2.5));
    }

    #[test]
    fn test_ignores_unusable_retry_after() {
        for value in ["-1", "NaN", "inf", "Wed, 21 Oct 2015 07:28:00 GMT"] {
            let mut headers = HashMap::new();
            headers.insert("retry-after".to_string(), vec![value.to_string()]);

            let response = HttpResponse::new(429, headers, json!({}));
            assert!(response.retry_request_after.is_none(), "{value}");
        }
    }
}
