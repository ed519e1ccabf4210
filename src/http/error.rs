//! Per-connection error types.
//!
//! A `Rejection` is answered with an error status line. A `ServeError` means
//! the connection is unusable and is dropped without (further) response.
//! Neither ever leaves the task handling the connection.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::http::files::PathError;
use crate::http::mime::ContentTypeError;
use crate::http::parser::ParseError;
use crate::http::response::StatusCode;

/// A request the server refuses to serve.
#[derive(Debug)]
pub enum Rejection {
    Malformed(ParseError),
    ContentType(ContentTypeError),
    Path(PathError),
    FileUnavailable { path: PathBuf, source: io::Error },
}

impl Rejection {
    /// The status sent to the client for this rejection.
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::Malformed(_) | Rejection::ContentType(_) | Rejection::Path(_) => {
                StatusCode::BadRequest
            }
            Rejection::FileUnavailable { .. } => StatusCode::NotFound,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Malformed(e) => write!(f, "malformed request: {}", e),
            Rejection::ContentType(e) => write!(f, "{}", e),
            Rejection::Path(e) => write!(f, "{}", e),
            Rejection::FileUnavailable { path, source } => {
                write!(f, "failed to open {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for Rejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Rejection::Malformed(e) => Some(e),
            Rejection::ContentType(e) => Some(e),
            Rejection::Path(e) => Some(e),
            Rejection::FileUnavailable { source, .. } => Some(source),
        }
    }
}

impl From<ParseError> for Rejection {
    fn from(e: ParseError) -> Self {
        Rejection::Malformed(e)
    }
}

impl From<ContentTypeError> for Rejection {
    fn from(e: ContentTypeError) -> Self {
        Rejection::ContentType(e)
    }
}

impl From<PathError> for Rejection {
    fn from(e: PathError) -> Self {
        Rejection::Path(e)
    }
}

/// Transport failure on a connection.
#[derive(Debug)]
pub enum ServeError {
    /// Reading from or writing to the peer failed.
    Io(io::Error),
    /// The peer sent no complete request line in time.
    ReadTimeout,
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeError::Io(e) => write!(f, "I/O error: {}", e),
            ServeError::ReadTimeout => f.write_str("timed out reading request"),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::Io(e) => Some(e),
            ServeError::ReadTimeout => None,
        }
    }
}

impl From<io::Error> for ServeError {
    fn from(e: io::Error) -> Self {
        ServeError::Io(e)
    }
}
