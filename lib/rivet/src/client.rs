//! HTTP transport built on hyper-util.
//!
//! [`HyperClient`] is a tower service stack: a pooled hyper client at the
//! bottom, the layers added with [`HyperClientBuilder::layer`] on top, all
//! erased behind one cloneable, shareable service.

use std::collections::HashMap;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::util::BoxCloneSyncService;
use tower::{Layer, ServiceExt};
use tower_service::Service;

use crate::{
    Error, Request, Response, Result, TransportKind,
    config::{ClientConfig, ClientConfigBuilder},
    connector::https_connector,
};

#[cfg(feature = "middleware-logging")]
use crate::middleware::LoggingLayer;

/// Type-erased transport stack, the unit middleware layers wrap.
pub type BoxedService = BoxCloneSyncService<Request, Response, Error>;

/// Future returned by the transport services.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

type LayerFn = Box<dyn FnOnce(BoxedService) -> BoxedService + Send>;

// ----------------------------------------------------------------------------
// Bottom of the stack
// ----------------------------------------------------------------------------

/// Sends one request over the pooled hyper client and buffers the answer.
#[derive(Clone)]
struct Transport {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl Transport {
    fn new(config: &ClientConfig) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(config));

        Self {
            client,
            timeout: config.timeout,
            user_agent: config.user_agent.clone(),
        }
    }

    async fn send(self, request: Request) -> Result<Response> {
        let request = to_hyper(request, self.user_agent.as_deref())?;

        let answer = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| {
                Error::transport(
                    TransportKind::Timeout,
                    format!("no response within {:?}", self.timeout),
                )
            })?
            .map_err(|err| Error::transport(classify(&err), err.to_string()))?;

        let (parts, body) = answer.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|err| Error::transport(TransportKind::Connect, err.to_string()))?
            .to_bytes();

        Ok(Response::new(parts.status, fold_headers(&parts.headers), body))
    }
}

impl Service<Request> for Transport {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        Box::pin(self.clone().send(request))
    }
}

/// Multi-value headers become repeated header lines. `user_agent` is added
/// unless the caller set one, whatever its case.
fn to_hyper(request: Request, user_agent: Option<&str>) -> Result<http::Request<Full<Bytes>>> {
    let (method, url, headers, body) = request.into_parts();

    let mut builder = http::Request::builder()
        .method(http::Method::from(method))
        .uri(url.as_str());
    let mut has_user_agent = false;
    for (name, value) in headers.iter() {
        has_user_agent |= name.eq_ignore_ascii_case(http::header::USER_AGENT.as_str());
        for value in value.values() {
            builder = builder.header(name, value);
        }
    }
    if let (Some(user_agent), false) = (user_agent, has_user_agent) {
        builder = builder.header(http::header::USER_AGENT, user_agent);
    }

    builder
        .body(body.map_or_else(Full::default, Full::new))
        .map_err(|err| Error::invalid_request(err.to_string()))
}

/// Lowercase names; repeated headers joined with `", "`. Non-UTF-8 values are dropped.
fn fold_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
    let mut folded: HashMap<String, String> = HashMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let Ok(value) = value.to_str() else {
            continue;
        };
        folded
            .entry(name.as_str().to_owned())
            .and_modify(|joined| {
                joined.push_str(", ");
                joined.push_str(value);
            })
            .or_insert_with(|| value.to_owned());
    }
    folded
}

/// Walk the source chain: a rustls error anywhere means TLS, a timed-out
/// socket means timeout, anything else is a connection failure.
fn classify(err: &(dyn std::error::Error + 'static)) -> TransportKind {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<rustls::Error>() {
            return TransportKind::Tls;
        }
        if let Some(io) = err.downcast_ref::<io::Error>() {
            if io.get_ref().is_some_and(|inner| inner.is::<rustls::Error>()) {
                return TransportKind::Tls;
            }
            if io.kind() == io::ErrorKind::TimedOut {
                return TransportKind::Timeout;
            }
        }
        current = err.source();
    }
    TransportKind::Connect
}

// ----------------------------------------------------------------------------
// Public client
// ----------------------------------------------------------------------------

/// Pooled HTTP/1.1 and HTTP/2 transport with rustls and tower middleware.
///
/// Returns every response whatever its status: resource services decide how
/// to treat non-2xx answers. Clones share the connection pool.
///
/// ```ignore
/// use rivet::HyperClient;
/// use std::time::Duration;
///
/// let client = HyperClient::builder()
///     .timeout(Duration::from_secs(10))
///     .with_logging()
///     .build();
/// ```
#[derive(Clone)]
pub struct HyperClient {
    stack: BoxedService,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// Default configuration, no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Custom configuration, no middleware.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            stack: BoxCloneSyncService::new(Transport::new(&config)),
            config,
        }
    }

    /// Start a [`HyperClientBuilder`].
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// The transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl rivet_core::HttpClient for HyperClient {
    async fn execute(&self, request: Request) -> Result<Response> {
        self.stack.clone().oneshot(request).await
    }
}

impl Service<Request> for HyperClient {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.stack.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        self.stack.call(request)
    }
}

/// Builder for [`HyperClient`]: transport settings plus tower layers.
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    layers: Vec<LayerFn>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Whole-exchange timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// TCP connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Idle connections kept per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// How long an idle connection stays pooled.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Default `User-Agent`, or `None` to send none.
    #[must_use]
    pub fn user_agent(mut self, user_agent: Option<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Add a tower layer. The first layer added is the outermost, so it is
    /// the first to see each request.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + 'static,
        L::Service: Service<Request, Response = Response, Error = Error> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.layers
            .push(Box::new(move |inner| BoxCloneSyncService::new(layer.layer(inner))));
        self
    }

    /// Same as [`Self::layer`].
    #[must_use]
    pub fn with<L>(self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + 'static,
        L::Service: Service<Request, Response = Response, Error = Error> + Clone + Send + Sync + 'static,
        <L::Service as Service<Request>>::Future: Send + 'static,
    {
        self.layer(layer)
    }

    /// Log every exchange at info level.
    #[cfg(feature = "middleware-logging")]
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log every exchange at debug level, request headers included.
    #[cfg(feature = "middleware-logging")]
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the client.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let bottom = BoxCloneSyncService::new(Transport::new(&config));
        let stack = self.layers.into_iter().rev().fold(bottom, |inner, wrap| wrap(inner));

        HyperClient { stack, config }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rivet_core::{Headers, Method};
    use url::Url;

    use super::*;

    fn request() -> rivet_core::RequestBuilder {
        let url = Url::parse("http://localhost/users").expect("valid url");
        Request::builder(Method::Get, url)
    }

    #[test]
    fn builder_settings_reach_the_config() {
        let client = HyperClient::builder()
            .timeout(Duration::from_secs(60))
            .pool_idle_per_host(16)
            .build();

        assert_eq!(client.config().timeout, Duration::from_secs(60));
        assert_eq!(client.config().pool_idle_per_host, 16);
        assert_eq!(HyperClient::new().config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn multi_value_headers_are_repeated() {
        let mut headers = Headers::new();
        headers.insert("Accept", ["application/json", "text/plain"]);

        let hyper_request =
            to_hyper(request().headers(&headers).build(), Some("rivet/test")).expect("valid request");
        let accept: Vec<_> = hyper_request
            .headers()
            .get_all("accept")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect();

        assert_eq!(accept, ["application/json", "text/plain"]);
        assert_eq!(hyper_request.headers()["user-agent"], "rivet/test");
    }

    #[test]
    fn caller_user_agent_wins() {
        let built = request().header("user-AGENT", "custom/1.0").build();

        let hyper_request = to_hyper(built, Some("rivet/test")).expect("valid request");
        assert_eq!(hyper_request.headers().get_all("user-agent").iter().count(), 1);
        assert_eq!(hyper_request.headers()["user-agent"], "custom/1.0");
    }

    #[test]
    fn no_default_user_agent_when_disabled() {
        let hyper_request = to_hyper(request().build(), None).expect("valid request");
        assert!(!hyper_request.headers().contains_key("user-agent"));
    }

    #[test]
    fn repeated_response_headers_are_folded() {
        let mut headers = http::HeaderMap::new();
        headers.append("set-cookie", http::HeaderValue::from_static("a=1"));
        headers.append("set-cookie", http::HeaderValue::from_static("b=2"));

        let folded = fold_headers(&headers);
        assert_eq!(folded.get("set-cookie").map(String::as_str), Some("a=1, b=2"));
    }

    #[test]
    fn failures_are_classified_from_the_source_chain() {
        let tls = io::Error::other(rustls::Error::General("bad certificate".into()));
        assert_eq!(classify(&tls), TransportKind::Tls);

        let timed_out = io::Error::new(io::ErrorKind::TimedOut, "connect timed out");
        assert_eq!(classify(&timed_out), TransportKind::Timeout);

        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert_eq!(classify(&refused), TransportKind::Connect);
    }
}
