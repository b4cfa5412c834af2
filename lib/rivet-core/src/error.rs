//! Errors returned by resource operations.
//!
//! rivet never translates, retries, or recovers from a failure: whatever
//! goes wrong while building, sending, or reading a resource request comes
//! back through the returned future as an [`Error`].

use bytes::Bytes;
use derive_more::{Display, Error, From};
use http::StatusCode;

/// What broke below HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TransportKind {
    /// The connection could not be opened or was dropped.
    #[display("connection")]
    Connect,
    /// TLS handshake or certificate failure.
    #[display("TLS")]
    Tls,
    /// No response within the configured timeout.
    #[display("timeout")]
    Timeout,
}

/// Failure of a resource operation.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a non-2xx status. The body is kept as sent.
    #[display("server answered {status}")]
    #[from(skip)]
    Http {
        /// Response status.
        #[error(not(source))]
        status: StatusCode,
        /// Raw response body, possibly empty.
        #[error(not(source))]
        body: Bytes,
    },

    /// The exchange failed before a status line was read.
    #[display("{kind} error: {message}")]
    #[from(skip)]
    Transport {
        /// Failure family.
        #[error(not(source))]
        kind: TransportKind,
        /// Transport diagnostic.
        #[error(not(source))]
        message: String,
    },

    /// A write targeted a record that has no identifier yet.
    #[display("cannot address a {model} record without identifier")]
    #[from(skip)]
    MissingId {
        /// Base path of the model.
        #[error(not(source))]
        model: &'static str,
    },

    /// No base URL is configured, so the endpoint is a bare path.
    #[display("base URL is not set, cannot reach `{path}`")]
    #[from(skip)]
    BaseUrlUnset {
        /// The relative endpoint that could not be resolved.
        #[error(not(source))]
        path: String,
    },

    /// An endpoint URL did not parse.
    #[display("invalid URL `{url}`: {source}")]
    #[from(skip)]
    InvalidUrl {
        /// The rejected URL.
        #[error(not(source))]
        url: String,
        /// Parser diagnostic.
        source: url::ParseError,
    },

    /// The request could not be assembled.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// A request body could not be encoded as JSON.
    #[display("cannot encode body: {_0}")]
    #[from]
    Encode(serde_json::Error),

    /// A response body did not match the expected shape.
    #[display("cannot decode `{path}`: {message}")]
    #[from(skip)]
    Decode {
        /// JSON path of the first mismatch (e.g. `data[2].name`).
        #[error(not(source))]
        path: String,
        /// Decoder diagnostic.
        #[error(not(source))]
        message: String,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_path_to_error::Error<serde_json::Error>> for Error {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Self::Decode {
            path: err.path().to_string(),
            message: err.into_inner().to_string(),
        }
    }
}

impl Error {
    /// Transport failure of the given kind.
    #[must_use]
    pub fn transport(kind: TransportKind, message: impl Into<String>) -> Self {
        Self::Transport {
            kind,
            message: message.into(),
        }
    }

    /// Request that could not be assembled.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Status of an [`Error::Http`], as a number.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    /// 4xx answer.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if status.is_client_error())
    }

    /// 5xx answer.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Http { status, .. } if status.is_server_error())
    }

    /// The resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status, .. } if *status == StatusCode::NOT_FOUND)
    }

    /// The transport gave up waiting.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                kind: TransportKind::Timeout,
                ..
            }
        )
    }

    /// The server could not be reached.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                kind: TransportKind::Connect,
                ..
            }
        )
    }

    /// Body of an [`Error::Http`].
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Decode the body of an [`Error::Http`] into the server's error payload.
    ///
    /// `None` for other errors and for empty bodies.
    ///
    /// ```ignore
    /// #[derive(Deserialize)]
    /// struct Problem { detail: String }
    ///
    /// if let Err(err) = users.get(&42).await {
    ///     if let Some(Ok(problem)) = err.decode_body::<Problem>() {
    ///         tracing::warn!(detail = problem.detail, "lookup refused");
    ///     }
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body()
            .filter(|body| !body.iter().all(u8::is_ascii_whitespace))
            .map(|body| crate::decode_json(body))
    }
}
