//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A validated NetBox API token.
///
/// This newtype ensures the token is non-empty and masks its value
/// in debug output to prevent accidental exposure in logs.
///
/// # Security
///
/// The `Debug` implementation masks the token, displaying only
/// `ApiToken(*****)` instead of the actual value.
///
/// # Example
///
/// ```rust
/// use netbox_api::ApiToken;
///
/// let token = ApiToken::new("0123456789abcdef").unwrap();
/// assert_eq!(format!("{:?}", token), "ApiToken(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Creates a new validated API token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyToken`] if the token is empty.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        Ok(Self(token))
    }
}

impl AsRef<str> for ApiToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(*****)")
    }
}

/// A validated API root URL.
///
/// The URL must use the `http` or `https` scheme and have a host. It is
/// normalized to point at the REST API root: trailing slashes are trimmed
/// and `/api` is appended unless the path already ends with it.
///
/// # Example
///
/// ```rust
/// use netbox_api::BaseUrl;
///
/// let url = BaseUrl::new("https://netbox.example.com/").unwrap();
/// assert_eq!(url.as_ref(), "https://netbox.example.com/api");
///
/// let url = BaseUrl::new("https://example.com/netbox/api").unwrap();
/// assert_eq!(url.as_ref(), "https://example.com/netbox/api");
/// assert_eq!(url.path(), "/netbox/api");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Creates a new validated base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL cannot be parsed,
    /// has no host, or uses a scheme other than `http`/`https`.
    pub fn new(url: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = url.into();
        let trimmed = raw.trim().trim_end_matches('/');

        let parsed = url::Url::parse(trimmed)
            .map_err(|_| ConfigError::InvalidBaseUrl { url: raw.clone() })?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(ConfigError::InvalidBaseUrl { url: raw });
        }

        let normalized = if trimmed.ends_with("/api") {
            trimmed.to_string()
        } else {
            format!("{trimmed}/api")
        };

        Ok(Self(normalized))
    }

    /// Returns the path component of the API root (e.g. `/api`).
    #[must_use]
    pub fn path(&self) -> &str {
        let after_scheme = self.0.find("://").map_or(0, |i| i + 3);
        self.0[after_scheme..]
            .find('/')
            .map_or("", |i| &self.0[after_scheme + i..])
    }

    /// Joins a relative path onto the API root.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(de::Error::custom)
    }
}
