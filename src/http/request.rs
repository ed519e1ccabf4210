use std::borrow::Cow;

/// The request line of a client request.
///
/// Only the first line of a request is ever looked at. Headers and body are
/// read off the socket but ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The method token as sent (e.g. "GET"). Logged, never interpreted.
    pub method: String,
    /// The request target, verbatim bytes (e.g. "/index.html"). Untrusted and
    /// not necessarily UTF-8.
    pub target: Vec<u8>,
    /// Protocol version (e.g. "HTTP/1.1"), if the client sent one.
    pub version: Option<String>,
}

impl Request {
    pub fn new(
        method: impl Into<String>,
        target: impl Into<Vec<u8>>,
        version: Option<String>,
    ) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            version,
        }
    }

    /// The target for display, with invalid UTF-8 replaced.
    pub fn target_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.target)
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or("-")
    }
}
