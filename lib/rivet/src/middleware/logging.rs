//! Exchange logging with `tracing`.
//!
//! Each request runs inside a `resource_request` span carrying the resource
//! operation and model the request was tagged with, so transport events line
//! up with the service call that caused them:
//!
//! ```text
//! INFO resource_request{operation="create" model="/users" method=POST url=https://api.example.com/users}: answered status=201 elapsed_ms=38
//! ```

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tower::{Layer, Service};
use tracing::{Instrument, Span, debug, info, info_span, warn};

use crate::{Error, Request, Response, Result};

/// Layer that logs every exchange.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Verbosity of [`LoggingLayer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Adds request headers and body sizes, at debug level.
    Debug,
    /// Status and elapsed time of each answer.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Info-level logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug-level logging.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service produced by [`LoggingLayer`].
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Service<Request> for Logging<S>
where
    S: Service<Request, Response = Response, Error = Error>,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let span = exchange_span(&request);
        if self.level == LogLevel::Debug {
            span.in_scope(|| {
                debug!(
                    headers = ?request.headers(),
                    body_len = request.body().map_or(0, bytes::Bytes::len),
                    "sending"
                );
            });
        }

        let level = self.level;
        let answer = self.inner.call(request);
        Box::pin(
            async move {
                let started = Instant::now();
                let result = answer.await;
                report(level, &result, started.elapsed());
                result
            }
            .instrument(span),
        )
    }
}

fn exchange_span(request: &Request) -> Span {
    let (operation, model) = request
        .operation()
        .map_or(("none", "none"), |operation| (operation.name, operation.model));
    info_span!(
        "resource_request",
        operation,
        model,
        method = %request.method(),
        url = %request.url(),
    )
}

fn report(level: LogLevel, result: &Result<Response>, elapsed: Duration) {
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(response) if response.is_success() => match level {
            LogLevel::Debug => debug!(
                status = response.status(),
                body_len = response.body().len(),
                elapsed_ms,
                "answered"
            ),
            LogLevel::Info => info!(status = response.status(), elapsed_ms, "answered"),
        },
        Ok(response) => warn!(status = response.status(), elapsed_ms, "answered with an error status"),
        Err(err) => warn!(error = %err, elapsed_ms, "no answer"),
    }
}
