//! Tower middleware for the HTTP transport.
//!
//! Layers wrap the transport service of [`HyperClient`](crate::HyperClient)
//! and see every request a resource service sends. Add them with
//! [`HyperClientBuilder::layer`](crate::HyperClientBuilder::layer); the first
//! layer added is the first to see the request.
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `middleware-logging` | `.with_logging()` / `.with_debug_logging()` helpers |
//!
//! ```ignore
//! use rivet::HyperClient;
//! use rivet::middleware::LoggingLayer;
//!
//! let client = HyperClient::builder()
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

pub use tower::{Layer, ServiceBuilder};
