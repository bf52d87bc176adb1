//! HTTP-specific error types for the NetBox API client.
//!
//! This module contains error types for HTTP operations, including response
//! errors, retry exhaustion, request validation failures and unexpected
//! response content.
//!
//! # Error Handling
//!
//! - [`HttpResponseError`]: Non-2xx HTTP responses from the API
//! - [`MaxHttpRetriesExceededError`]: When retry attempts are exhausted
//! - [`InvalidHttpRequestError`]: When a request fails validation before sending
//! - [`HttpError`]: Unified error type encompassing all HTTP-related errors
//!
//! # Example
//!
//! ```rust,ignore
//! use netbox_api::clients::{HttpClient, HttpRequest, HttpMethod, HttpError};
//!
//! match client.request(request).await {
//!     Ok(response) => println!("Success: {}", response.body),
//!     Err(HttpError::Response(e)) => {
//!         println!("API error {}: {}", e.code, e.message);
//!     }
//!     Err(HttpError::MaxRetries(e)) => {
//!         println!("Retries exhausted after {} tries", e.tries);
//!     }
//!     Err(other) => println!("Request failed: {other}"),
//! }
//! ```

use thiserror::Error;

/// Error returned when an HTTP request receives a non-successful response.
///
/// The message is the response body as returned by the server (usually a
/// JSON document such as `{"detail": "Not found."}`).
///
/// # Example
///
/// ```rust
/// use netbox_api::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 404,
///     message: r#"{"detail":"Not found."}"#.to_string(),
///     error_reference: Some("abc-123".to_string()),
/// };
///
/// assert!(error.to_string().contains("404"));
/// ```
#[derive(Debug, Error)]
#[error("Request failed with status {code}: {message}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Serialized response body.
    pub message: String,
    /// Reference ID for error reporting (from the `X-Request-Id` header).
    pub error_reference: Option<String>,
}

/// Error returned when maximum retry attempts have been exhausted.
///
/// Raised when a request keeps failing with 429 or 5xx responses after all
/// configured attempts have been made.
#[derive(Debug, Error)]
#[error("Exceeded maximum retry count of {tries}. Last message: {message}")]
pub struct MaxHttpRetriesExceededError {
    /// The HTTP status code of the last response.
    pub code: u16,
    /// The number of tries that were attempted.
    pub tries: u32,
    /// Serialized response body of the last response.
    pub message: String,
    /// Reference ID for error reporting (from the `X-Request-Id` header).
    pub error_reference: Option<String>,
}

/// Error returned when an HTTP request fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST, PUT or PATCH request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },

    /// The request path could not be turned into a URL.
    #[error("Invalid request URL '{url}'.")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Maximum retry attempts exhausted.
    #[error(transparent)]
    MaxRetries(#[from] MaxHttpRetriesExceededError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A successful response had a body of an unexpected shape.
    #[error("Unexpected response content: {message}")]
    Content {
        /// Description of what was expected.
        message: String,
    },
}

impl HttpError {
    /// Returns the HTTP status code carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::MaxRetries(e) => Some(e.code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_response_error_includes_status_code_in_message() {
        let error = HttpResponseError {
            code: 404,
            message: r#"{"detail":"Not found."}"#.to_string(),
            error_reference: None,
        };
        let message = error.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("Not found."));
    }

    #[test]
    fn test_max_retries_error_includes_retry_count() {
        let error = MaxHttpRetriesExceededError {
            code: 429,
            tries: 3,
            message: r#"{"detail":"Request was throttled."}"#.to_string(),
            error_reference: None,
        };
        let message = error.to_string();
        assert!(message.contains('3'));
        assert!(message.contains("Exceeded maximum retry count"));
    }

    #[test]
    fn test_invalid_request_error_missing_body() {
        let error = InvalidHttpRequestError::MissingBody {
            method: "patch".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot use patch without specifying data."
        );
    }

    #[test]
    fn test_http_error_status() {
        let error = HttpError::Response(HttpResponseError {
            code: 409,
            message: String::new(),
            error_reference: None,
        });
        assert_eq!(error.status(), Some(409));

        let error = HttpError::Content {
            message: "expected a list".to_string(),
        };
        assert_eq!(error.status(), None);
    }

    #[test]
    fn test_error_types_implement_std_error() {
        let http_error: &dyn std::error::Error = &HttpResponseError {
            code: 400,
            message: "test".to_string(),
            error_reference: None,
        };
        let _ = http_error;

        let invalid_error: &dyn std::error::Error = &InvalidHttpRequestError::InvalidUrl {
            url: "::".to_string(),
        };
        let _ = invalid_error;
    }
}
