//! Configuration: base URL store and transport settings.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use std::time::Duration;

// ============================================================================
// Base URL
// ============================================================================

/// Shared, mutable base URL every resource path is resolved against.
///
/// Clones share the same value. Use [`ApiConfig::global`] for a process-wide
/// store, or create one and hand it to the services that should use it.
/// Services read the base URL once, when they are created.
///
/// # Example
///
/// ```
/// use rivet::ApiConfig;
///
/// let config = ApiConfig::default();
/// assert_eq!(config.resolve("/users"), "/users");
///
/// config.set_base_url("https://api.example.com/v1/");
/// assert_eq!(config.resolve("/users"), "https://api.example.com/v1/users");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ApiConfig {
    base_url: Arc<RwLock<String>>,
}

static GLOBAL: LazyLock<ApiConfig> = LazyLock::new(ApiConfig::default);

impl ApiConfig {
    /// Create a store holding `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Arc::new(RwLock::new(base_url.into())),
        }
    }

    /// The process-wide store. Its base URL starts empty.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Replace the base URL.
    pub fn set_base_url(&self, base_url: impl Into<String>) {
        *self
            .base_url
            .write()
            .unwrap_or_else(PoisonError::into_inner) = base_url.into();
    }

    /// Current base URL.
    #[must_use]
    pub fn base_url(&self) -> String {
        self.base_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Join the base URL and a resource path with exactly one `/`.
    #[must_use]
    pub fn resolve(&self, base_path: &str) -> String {
        let base_url = self.base_url();
        let path = base_path.trim_start_matches('/');
        if path.is_empty() {
            return base_url;
        }
        format!("{}/{path}", base_url.trim_end_matches('/'))
    }
}

// ============================================================================
// Transport
// ============================================================================

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout duration.
    pub timeout: Duration,
    /// Connection timeout duration.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
    /// `User-Agent` sent when the request has none.
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            user_agent: Some(concat!("rivet/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl ClientConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
    user_agent: Option<Option<String>>,
}

impl ClientConfigBuilder {
    /// Set the request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Set the default `User-Agent`, or `None` to send none.
    #[must_use]
    pub fn user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = Some(user_agent);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
        }
    }
}
