//! HTTP verbs used by resource operations.

use derive_more::Display;

/// HTTP request method.
///
/// Only the verbs a resource endpoint answers to are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// `GET`: list, fetch one, search.
    #[display("GET")]
    Get,
    /// `POST`: create, upload.
    #[display("POST")]
    Post,
    /// `PUT`: full update.
    #[display("PUT")]
    Put,
    /// `PATCH`: partial update, batch patch via search.
    #[display("PATCH")]
    Patch,
    /// `DELETE`: remove, batch delete via search.
    #[display("DELETE")]
    Delete,
}

impl Method {
    /// Returns `true` when requests with this verb usually carry a body.
    #[must_use]
    pub const fn accepts_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Returns `true` if the method modifies server state.
    #[must_use]
    pub const fn is_write(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

impl TryFrom<http::Method> for Method {
    type Error = crate::Error;

    fn try_from(method: http::Method) -> Result<Self, Self::Error> {
        match method {
            http::Method::GET => Ok(Self::Get),
            http::Method::POST => Ok(Self::Post),
            http::Method::PUT => Ok(Self::Put),
            http::Method::PATCH => Ok(Self::Patch),
            http::Method::DELETE => Ok(Self::Delete),
            other => Err(crate::Error::invalid_request(format!(
                "unsupported HTTP method: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Put.to_string(), "PUT");
        assert_eq!(Method::Patch.to_string(), "PATCH");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn method_body_and_write() {
        assert!(!Method::Get.accepts_body());
        assert!(!Method::Delete.accepts_body());
        assert!(Method::Patch.accepts_body());

        assert!(!Method::Get.is_write());
        assert!(Method::Delete.is_write());
    }

    #[test]
    fn method_http_conversion() {
        assert_eq!(http::Method::from(Method::Patch), http::Method::PATCH);
        assert_eq!(
            Method::try_from(http::Method::DELETE).expect("DELETE"),
            Method::Delete
        );
        assert!(Method::try_from(http::Method::HEAD).is_err());
    }
}
