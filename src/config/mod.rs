//! Configuration types for the NetBox API client.
//!
//! This module provides the configuration used to initialize an
//! [`Api`](crate::Api) and its underlying [`HttpClient`](crate::HttpClient).
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`NetboxConfig`]: The main configuration struct holding all client settings
//! - [`NetboxConfigBuilder`]: A builder for constructing [`NetboxConfig`] instances
//! - [`BaseUrl`]: A validated API root URL
//! - [`ApiToken`]: A validated API token with masked debug output
//!
//! # Example
//!
//! ```rust
//! use netbox_api::{ApiToken, BaseUrl, NetboxConfig};
//!
//! let config = NetboxConfig::builder()
//!     .base_url(BaseUrl::new("https://netbox.example.com").unwrap())
//!     .token(ApiToken::new("0123456789abcdef").unwrap())
//!     .threading(true)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url().as_ref(), "https://netbox.example.com/api");
//! assert_eq!(config.max_workers(), 4);
//! ```

mod newtypes;

pub use newtypes::{ApiToken, BaseUrl};

use crate::error::ConfigError;
use crate::rest::ModelRegistry;
use std::time::Duration;

/// Default number of concurrent page requests when threading is enabled.
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Configuration for the NetBox API client.
///
/// # Thread Safety
///
/// `NetboxConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Read-only access
///
/// The token is optional. Without one, requests are sent unauthenticated,
/// which works against instances that allow anonymous reads.
#[derive(Clone, Debug)]
pub struct NetboxConfig {
    base_url: BaseUrl,
    token: Option<ApiToken>,
    threading: bool,
    max_workers: usize,
    page_size: Option<u32>,
    tries: u32,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    models: ModelRegistry,
}

impl NetboxConfig {
    /// Creates a new builder for constructing a `NetboxConfig`.
    #[must_use]
    pub fn builder() -> NetboxConfigBuilder {
        NetboxConfigBuilder::new()
    }

    /// Returns the API root URL.
    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the API token, if configured.
    #[must_use]
    pub const fn token(&self) -> Option<&ApiToken> {
        self.token.as_ref()
    }

    /// Returns whether list requests fetch remaining pages in parallel.
    #[must_use]
    pub const fn threading(&self) -> bool {
        self.threading
    }

    /// Returns the maximum number of page requests in flight at once.
    #[must_use]
    pub const fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Returns the default `limit` sent with list requests, if configured.
    #[must_use]
    pub const fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    /// Returns the number of attempts made for retryable responses.
    #[must_use]
    pub const fn tries(&self) -> u32 {
        self.tries
    }

    /// Returns the per-request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the model registry used to type records.
    #[must_use]
    pub const fn models(&self) -> &ModelRegistry {
        &self.models
    }
}

// Verify NetboxConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<NetboxConfig>();
};

/// Builder for constructing [`NetboxConfig`] instances.
///
/// The only required field is `base_url`.
///
/// # Defaults
///
/// - `token`: `None`
/// - `threading`: `false`
/// - `max_workers`: `4`
/// - `page_size`: `None` (server default)
/// - `tries`: `1`
/// - `timeout`: `None`
/// - `user_agent_prefix`: `None`
/// - `models`: [`ModelRegistry::default()`]
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use netbox_api::{BaseUrl, NetboxConfig};
///
/// let config = NetboxConfig::builder()
///     .base_url(BaseUrl::new("http://localhost:8000").unwrap())
///     .page_size(250)
///     .tries(3)
///     .timeout(Duration::from_secs(30))
///     .user_agent_prefix("inventory-sync/2.1")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.tries(), 3);
/// ```
#[derive(Debug, Default)]
pub struct NetboxConfigBuilder {
    base_url: Option<BaseUrl>,
    token: Option<ApiToken>,
    threading: Option<bool>,
    max_workers: Option<usize>,
    page_size: Option<u32>,
    tries: Option<u32>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
    models: Option<ModelRegistry>,
}

impl NetboxConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API root URL (required).
    #[must_use]
    pub fn base_url(mut self, url: BaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API token.
    #[must_use]
    pub fn token(mut self, token: ApiToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Enables parallel fetching of list pages.
    #[must_use]
    pub const fn threading(mut self, threading: bool) -> Self {
        self.threading = Some(threading);
        self
    }

    /// Sets the maximum number of page requests in flight when threading.
    #[must_use]
    pub const fn max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    /// Sets the default page size for list requests.
    #[must_use]
    pub const fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Sets how many attempts are made for 429 and 5xx responses.
    #[must_use]
    pub const fn tries(mut self, tries: u32) -> Self {
        self.tries = Some(tries);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Replaces the model registry.
    #[must_use]
    pub fn models(mut self, models: ModelRegistry) -> Self {
        self.models = Some(models);
        self
    }

    /// Builds the [`NetboxConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not set,
    /// or [`ConfigError::InvalidMaxWorkers`] if `max_workers` is zero.
    pub fn build(self) -> Result<NetboxConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        let max_workers = self.max_workers.unwrap_or(DEFAULT_MAX_WORKERS);
        if max_workers == 0 {
            return Err(ConfigError::InvalidMaxWorkers { value: max_workers });
        }

        Ok(NetboxConfig {
            base_url,
            token: self.token,
            threading: self.threading.unwrap_or(false),
            max_workers,
            page_size: self.page_size,
            tries: self.tries.unwrap_or(1).max(1),
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
            models: self.models.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> BaseUrl {
        BaseUrl::new("https://netbox.example.com").unwrap()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = NetboxConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = NetboxConfig::builder().base_url(base()).build().unwrap();

        assert!(config.token().is_none());
        assert!(!config.threading());
        assert_eq!(config.max_workers(), DEFAULT_MAX_WORKERS);
        assert!(config.page_size().is_none());
        assert_eq!(config.tries(), 1);
        assert!(config.timeout().is_none());
        assert!(config.user_agent_prefix().is_none());
        assert!(config.models().lookup("dcim", "devices").is_some());
    }

    #[test]
    fn test_builder_rejects_zero_workers() {
        let result = NetboxConfig::builder()
            .base_url(base())
            .max_workers(0)
            .build();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidMaxWorkers { value: 0 })
        ));
    }

    #[test]
    fn test_builder_clamps_tries_to_one() {
        let config = NetboxConfig::builder()
            .base_url(base())
            .tries(0)
            .build()
            .unwrap();

        assert_eq!(config.tries(), 1);
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = NetboxConfig::builder()
            .base_url(base())
            .token(ApiToken::new("abc123").unwrap())
            .threading(true)
            .max_workers(8)
            .page_size(100)
            .tries(3)
            .timeout(Duration::from_secs(10))
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();

        assert_eq!(config.token().map(AsRef::as_ref), Some("abc123"));
        assert!(config.threading());
        assert_eq!(config.max_workers(), 8);
        assert_eq!(config.page_size(), Some(100));
        assert_eq!(config.tries(), 3);
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.user_agent_prefix(), Some("MyApp/1.0"));
    }

    #[test]
    fn test_config_debug_masks_token() {
        let config = NetboxConfig::builder()
            .base_url(base())
            .token(ApiToken::new("very-secret-token").unwrap())
            .build()
            .unwrap();

        let debug_str = format!("{config:?}");
        assert!(debug_str.contains("NetboxConfig"));
        assert!(!debug_str.contains("very-secret-token"));
    }
}
