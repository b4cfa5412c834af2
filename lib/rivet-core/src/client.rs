//! Transport abstraction.
//!
//! Resource services never open sockets themselves: they hand a fully built
//! [`Request`] to an [`HttpClient`] and get a buffered [`Response`] back.
//! Implement the trait to plug in another HTTP stack or a test double.

use std::future::Future;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Core HTTP transport trait.
///
/// Implementations return any response the server sent, whatever its status;
/// callers decide how to treat non-2xx answers.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be delivered:
    /// - Network errors
    /// - TLS errors
    /// - Timeouts
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}
