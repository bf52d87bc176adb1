//! The API entry point and its apps.

use std::sync::Arc;

use serde_json::Value;

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::config::NetboxConfig;
use crate::rest::Endpoint;

/// Entry point to a NetBox instance.
///
/// `Api` owns the [`HttpClient`]. Records hold only a weak reference to it,
/// so record operations that need the network fail with
/// [`ResourceError::EndpointUnavailable`](crate::rest::ResourceError::EndpointUnavailable)
/// once every clone of the `Api` has been dropped.
///
/// # Thread Safety
///
/// `Api` is `Send + Sync` and cheap to clone.
///
/// # Example
///
/// ```rust
/// use netbox_api::{Api, ApiToken, BaseUrl, NetboxConfig};
///
/// let config = NetboxConfig::builder()
///     .base_url(BaseUrl::new("https://netbox.example.com").unwrap())
///     .token(ApiToken::new("0123456789abcdef").unwrap())
///     .build()
///     .unwrap();
///
/// let api = Api::new(config).unwrap();
/// let devices = api.dcim().endpoint("devices");
///
/// assert_eq!(devices.url(), "https://netbox.example.com/api/dcim/devices/");
/// assert_eq!(devices.model().name, "Devices");
/// ```
#[derive(Clone, Debug)]
pub struct Api {
    client: Arc<HttpClient>,
}

// Verify Api is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Api>();
    assert_send_sync::<App>();
};

impl Api {
    /// Creates an API entry point from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the HTTP client cannot be built.
    pub fn new(config: NetboxConfig) -> Result<Self, HttpError> {
        Ok(Self::from_client(Arc::new(HttpClient::new(config)?)))
    }

    /// Creates an API entry point around an existing client.
    #[must_use]
    pub const fn from_client(client: Arc<HttpClient>) -> Self {
        Self { client }
    }

    /// Returns the HTTP client.
    #[must_use]
    pub const fn client(&self) -> &Arc<HttpClient> {
        &self.client
    }

    /// Returns the app with the given name.
    #[must_use]
    pub fn app(&self, name: impl Into<String>) -> App {
        App {
            client: Arc::clone(&self.client),
            name: name.into(),
        }
    }

    /// Returns a plugin app, rooted at `plugins/{name}`.
    #[must_use]
    pub fn plugins(&self, name: &str) -> App {
        self.app(format!("plugins/{}", name.trim_matches('/')))
    }

    /// Returns the `circuits` app.
    #[must_use]
    pub fn circuits(&self) -> App {
        self.app("circuits")
    }

    /// Returns the `core` app.
    #[must_use]
    pub fn core(&self) -> App {
        self.app("core")
    }

    /// Returns the `dcim` app.
    #[must_use]
    pub fn dcim(&self) -> App {
        self.app("dcim")
    }

    /// Returns the `extras` app.
    #[must_use]
    pub fn extras(&self) -> App {
        self.app("extras")
    }

    /// Returns the `ipam` app.
    #[must_use]
    pub fn ipam(&self) -> App {
        self.app("ipam")
    }

    /// Returns the `tenancy` app.
    #[must_use]
    pub fn tenancy(&self) -> App {
        self.app("tenancy")
    }

    /// Returns the `users` app.
    #[must_use]
    pub fn users(&self) -> App {
        self.app("users")
    }

    /// Returns the `virtualization` app.
    #[must_use]
    pub fn virtualization(&self) -> App {
        self.app("virtualization")
    }

    /// Returns the `vpn` app.
    #[must_use]
    pub fn vpn(&self) -> App {
        self.app("vpn")
    }

    /// Returns the `wireless` app.
    #[must_use]
    pub fn wireless(&self) -> App {
        self.app("wireless")
    }

    /// Returns the server status document.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn status(&self) -> Result<Value, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, "status/").build()?;
        Ok(self.client.request(request).await?.body)
    }

    /// Returns the API version the server reports in its `API-Version`
    /// header, or `None` if it sends none.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the request fails.
    pub async fn version(&self) -> Result<Option<String>, HttpError> {
        let request = HttpRequest::builder(HttpMethod::Get, "").build()?;
        let response = self.client.request(request).await?;
        Ok(response.api_version().map(String::from))
    }
}

/// One app of the API, such as `dcim` or `plugins/netbox-bgp`.
#[derive(Clone, Debug)]
pub struct App {
    client: Arc<HttpClient>,
    name: String,
}

impl App {
    /// Returns the app name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns an endpoint of this app. Underscores and dashes are
    /// interchangeable in `name`.
    #[must_use]
    pub fn endpoint(&self, name: &str) -> Endpoint {
        Endpoint::new(Arc::clone(&self.client), self.name.clone(), name)
    }
}
