//! Error types for record and endpoint operations.
//!
//! This module contains [`ResourceError`], the error type returned by every
//! operation in the [`rest`](crate::rest) module. It extends the transport
//! level [`HttpError`] with semantic variants.
//!
//! # Error Handling
//!
//! HTTP status codes are mapped to semantic error variants:
//!
//! - **404**: [`ResourceError::NotFound`] - Resource doesn't exist
//! - **400/422**: [`ResourceError::ValidationFailed`] - Field errors from the API
//! - **409 on allocation**: [`ResourceError::AllocationFailed`] - No free
//!   addresses, prefixes or VLANs left
//! - **Other 4xx/5xx**: [`ResourceError::Http`] - Wrapped HTTP error
//!
//! A write that had nothing to send is not an error: `save()` and bulk
//! `update()` return `Ok(false)` for that case. Any error returned by a write
//! means the remote call was attempted and failed.
//!
//! # Example
//!
//! ```rust,ignore
//! use netbox_api::rest::ResourceError;
//!
//! match device.save().await {
//!     Ok(true) => println!("saved"),
//!     Ok(false) => println!("nothing to save"),
//!     Err(ResourceError::ValidationFailed { errors, .. }) => {
//!         for (field, messages) in errors {
//!             println!("{field}: {messages:?}");
//!         }
//!     }
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use std::collections::HashMap;

use crate::clients::{HttpError, HttpResponseError};
use thiserror::Error;

/// Error type for record and endpoint operations.
///
/// # Example
///
/// ```rust
/// use netbox_api::rest::ResourceError;
/// use std::collections::HashMap;
///
/// let error = ResourceError::NotFound {
///     endpoint: "devices".to_string(),
///     id: "123".to_string(),
/// };
/// assert!(error.to_string().contains("devices"));
/// assert!(error.to_string().contains("123"));
///
/// let mut errors = HashMap::new();
/// errors.insert("name".to_string(), vec!["This field is required.".to_string()]);
/// let error = ResourceError::ValidationFailed {
///     errors,
///     request_id: Some("abc-123".to_string()),
/// };
/// assert!(error.to_string().contains("Validation failed"));
/// ```
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource was not found (HTTP 404).
    #[error("{endpoint} with id {id} not found")]
    NotFound {
        /// The endpoint name (e.g., "devices").
        endpoint: String,
        /// The ID that was requested.
        id: String,
    },

    /// The API rejected a create or update request (HTTP 400 or 422).
    #[error("Validation failed: {errors:?}")]
    ValidationFailed {
        /// A map of field names to error messages.
        errors: HashMap<String, Vec<String>>,
        /// The request ID for debugging (from X-Request-Id header).
        request_id: Option<String>,
    },

    /// A detail endpoint could not allocate the requested objects (HTTP 409).
    #[error("Allocation failed on {endpoint}: {message}")]
    AllocationFailed {
        /// The detail endpoint URL.
        endpoint: String,
        /// The server's explanation.
        message: String,
    },

    /// A field is absent from a record, even after fetching its full detail.
    #[error("'{record}' has no attribute '{field}'")]
    AttributeNotFound {
        /// Display text of the record.
        record: String,
        /// The requested field name.
        field: String,
    },

    /// A lookup expected at most one result but the server returned several.
    #[error("get() on {endpoint} returned {count} results; use filter() or narrow the query")]
    AmbiguousLookup {
        /// The endpoint name.
        endpoint: String,
        /// Number of matching records.
        count: u64,
    },

    /// The operation needs a record identity and the record has none.
    #[error("Cannot {operation} a record without an id")]
    MissingIdentity {
        /// The operation being attempted (e.g., "save", "delete").
        operation: &'static str,
    },

    /// The record is not attached to a live endpoint.
    #[error("Record '{record}' has no endpoint to {operation} through")]
    EndpointUnavailable {
        /// Display text of the record.
        record: String,
        /// The operation being attempted.
        operation: &'static str,
    },

    /// The query is not acceptable for the requested operation.
    #[error("Invalid query: {message}")]
    InvalidQuery {
        /// What is wrong with the query.
        message: String,
    },

    /// An HTTP-level error occurred.
    ///
    /// This variant wraps [`HttpError`] for errors that don't map to
    /// a specific resource error type.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ResourceError {
    /// Creates a `ResourceError` from an HTTP response status code.
    ///
    /// Maps HTTP status codes to semantic error variants:
    /// - 404 -> `NotFound`
    /// - 400, 422 -> `ValidationFailed` (parsing errors from body)
    /// - Other -> `Http`
    ///
    /// # Example
    ///
    /// ```rust
    /// use netbox_api::rest::ResourceError;
    /// use serde_json::json;
    ///
    /// let error = ResourceError::from_http_response(
    ///     404,
    ///     &json!({"detail": "Not found."}),
    ///     "devices",
    ///     Some("123"),
    ///     Some("req-123"),
    /// );
    /// assert!(matches!(error, ResourceError::NotFound { .. }));
    /// ```
    #[must_use]
    pub fn from_http_response(
        code: u16,
        body: &serde_json::Value,
        endpoint: &str,
        id: Option<&str>,
        request_id: Option<&str>,
    ) -> Self {
        match code {
            404 => Self::NotFound {
                endpoint: endpoint.to_string(),
                id: id.unwrap_or("unknown").to_string(),
            },
            400 | 422 => Self::ValidationFailed {
                errors: parse_validation_errors(body),
                request_id: request_id.map(ToString::to_string),
            },
            _ => Self::Http(HttpError::Response(HttpResponseError {
                code,
                message: body.to_string(),
                error_reference: request_id.map(ToString::to_string),
            })),
        }
    }

    /// Maps a transport error onto a semantic variant where one applies.
    ///
    /// Response errors are re-parsed through [`from_http_response`](Self::from_http_response);
    /// everything else is wrapped unchanged.
    #[must_use]
    pub fn from_http_error(error: HttpError, endpoint: &str, id: Option<&str>) -> Self {
        match error {
            HttpError::Response(e) => {
                let body = serde_json::from_str(&e.message)
                    .unwrap_or(serde_json::Value::String(e.message.clone()));
                match e.code {
                    404 | 400 | 422 => Self::from_http_response(
                        e.code,
                        &body,
                        endpoint,
                        id,
                        e.error_reference.as_deref(),
                    ),
                    _ => Self::Http(HttpError::Response(e)),
                }
            }
            other => Self::Http(other),
        }
    }

    /// Returns the request ID if available.
    ///
    /// Useful for debugging and error reporting.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { request_id, .. } => request_id.as_deref(),
            Self::Http(HttpError::Response(e)) => e.error_reference.as_deref(),
            Self::Http(HttpError::MaxRetries(e)) => e.error_reference.as_deref(),
            _ => None,
        }
    }
}

/// Parses validation errors from an API response body.
///
/// NetBox returns field errors keyed by field name:
/// ```json
/// {
///   "name": ["This field is required."],
///   "site": ["Related object not found using the provided numeric ID: 9"]
/// }
/// ```
///
/// Bulk requests return one such object per submitted item, and general
/// failures come back as `{"detail": "..."}`.
fn parse_validation_errors(body: &serde_json::Value) -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();

    match body {
        serde_json::Value::Object(map) => {
            for (field, messages) in map {
                result
                    .entry(field.clone())
                    .or_default()
                    .extend(messages_of(messages));
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                for (field, messages) in parse_validation_errors(item) {
                    result.entry(field).or_default().extend(messages);
                }
            }
        }
        serde_json::Value::String(s) => {
            result.insert("detail".to_string(), vec![s.clone()]);
        }
        serde_json::Value::Null => {}
        other => {
            result.insert("detail".to_string(), vec![other.to_string()]);
        }
    }

    result
}

fn messages_of(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(arr) => arr
            .iter()
            .map(|v| v.as_str().map_or_else(|| v.to_string(), ToString::to_string))
            .collect(),
        serde_json::Value::String(s) => vec![s.clone()],
        other => vec![other.to_string()],
    }
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_found_error_formats_message_with_endpoint_and_id() {
        let error = ResourceError::NotFound {
            endpoint: "devices".to_string(),
            id: "123456".to_string(),
        };
        let message = error.to_string();

        assert!(message.contains("devices"));
        assert!(message.contains("123456"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn test_attribute_not_found_message() {
        let error = ResourceError::AttributeNotFound {
            record: "edge-router-1".to_string(),
            field: "serial".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "'edge-router-1' has no attribute 'serial'"
        );
    }

    #[test]
    fn test_http_error_wraps_correctly() {
        let http_error = HttpError::Response(HttpResponseError {
            code: 500,
            message: r#"{"error":"Internal Server Error"}"#.to_string(),
            error_reference: Some("req-xyz".to_string()),
        });

        let resource_error: ResourceError = http_error.into();
        assert!(resource_error.to_string().contains("Internal Server Error"));
        assert_eq!(resource_error.request_id(), Some("req-xyz"));
    }

    #[test]
    fn test_from_http_response_maps_404_to_not_found() {
        let error = ResourceError::from_http_response(
            404,
            &json!({"detail": "Not found."}),
            "devices",
            Some("123"),
            Some("req-123"),
        );

        assert!(matches!(
            error,
            ResourceError::NotFound { endpoint, id } if endpoint == "devices" && id == "123"
        ));
    }

    #[test]
    fn test_from_http_response_maps_400_to_validation_failed() {
        let body = json!({
            "name": ["This field is required."],
            "site": ["Related object not found.", "Invalid pk."]
        });

        let error = ResourceError::from_http_response(400, &body, "devices", None, Some("req-456"));

        if let ResourceError::ValidationFailed { errors, request_id } = error {
            assert_eq!(
                errors.get("name"),
                Some(&vec!["This field is required.".to_string()])
            );
            assert_eq!(errors.get("site").map(Vec::len), Some(2));
            assert_eq!(request_id, Some("req-456".to_string()));
        } else {
            panic!("Expected ValidationFailed variant");
        }
    }

    #[test]
    fn test_from_http_response_maps_other_codes_to_http() {
        let error = ResourceError::from_http_response(
            500,
            &json!({"error": "Internal error"}),
            "devices",
            None,
            Some("req-789"),
        );

        assert!(matches!(error, ResourceError::Http(_)));
    }

    #[test]
    fn test_from_http_error_reparses_response_body() {
        let http_error = HttpError::Response(HttpResponseError {
            code: 400,
            message: r#"{"status": ["Invalid choice."]}"#.to_string(),
            error_reference: None,
        });

        let error = ResourceError::from_http_error(http_error, "devices", Some("1"));
        match error {
            ResourceError::ValidationFailed { errors, .. } => {
                assert_eq!(errors["status"], vec!["Invalid choice.".to_string()]);
            }
            other => panic!("Expected ValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_from_http_error_keeps_conflicts_as_http() {
        let http_error = HttpError::Response(HttpResponseError {
            code: 409,
            message: r#"{"detail": "Unable to delete object."}"#.to_string(),
            error_reference: None,
        });

        let error = ResourceError::from_http_error(http_error, "sites", Some("4"));
        assert!(matches!(error, ResourceError::Http(HttpError::Response(e)) if e.code == 409));
    }

    #[test]
    fn test_parse_validation_errors_bulk_format() {
        let body = json!([
            {"name": ["duplicate name"]},
            {},
            {"name": ["too long"], "slug": ["invalid"]}
        ]);

        let errors = parse_validation_errors(&body);
        assert_eq!(errors["name"].len(), 2);
        assert_eq!(errors["slug"], vec!["invalid".to_string()]);
    }

    #[test]
    fn test_parse_validation_errors_detail_string() {
        let errors = parse_validation_errors(&json!({"detail": "Invalid token"}));
        assert_eq!(errors["detail"], vec!["Invalid token".to_string()]);
    }

    #[test]
    fn test_request_id_extraction() {
        let error = ResourceError::ValidationFailed {
            errors: HashMap::new(),
            request_id: Some("req-abc".to_string()),
        };
        assert_eq!(error.request_id(), Some("req-abc"));

        let error = ResourceError::MissingIdentity { operation: "save" };
        assert_eq!(error.request_id(), None);
    }
}
