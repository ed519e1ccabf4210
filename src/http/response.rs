use crate::http::mime::ContentType;

/// HTTP status codes the server sends.
///
/// - `Ok` (200): file found and streamed
/// - `BadRequest` (400): malformed request line or unsupported extension
/// - `NotFound` (404): file missing or unreadable
///
/// Any other code is carried as `Other` and has an empty reason phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// Any code without a known reason phrase
    Other(u16),
}

impl StatusCode {
    /// Maps a numeric code to a status.
    ///
    /// # Example
    ///
    /// ```
    /// # use filegate::http::response::StatusCode;
    /// assert_eq!(StatusCode::from_u16(404), StatusCode::NotFound);
    /// assert_eq!(StatusCode::from_u16(418), StatusCode::Other(418));
    /// ```
    pub fn from_u16(code: u16) -> Self {
        match code {
            200 => StatusCode::Ok,
            400 => StatusCode::BadRequest,
            404 => StatusCode::NotFound,
            other => StatusCode::Other(other),
        }
    }

    /// Returns the numeric HTTP status code.
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::Other(code) => *code,
        }
    }

    /// Returns the reason phrase, or "" for codes outside the table.
    ///
    /// # Example
    ///
    /// ```
    /// # use filegate::http::response::StatusCode;
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// assert_eq!(StatusCode::Other(503).reason_phrase(), "");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::Other(_) => "",
        }
    }

    /// The message used on an error line. Only 400 and 404 have one; every
    /// other code, 200 included, gets "".
    pub fn error_message(&self) -> &'static str {
        match self {
            StatusCode::BadRequest | StatusCode::NotFound => self.reason_phrase(),
            StatusCode::Ok | StatusCode::Other(_) => "",
        }
    }
}

/// Status line and headers of a response. The body, if any, is streamed
/// separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    /// The HTTP status code
    pub status: StatusCode,
    /// Headers in the order they go on the wire
    pub headers: Vec<(String, String)>,
}

/// Builder for response heads.
///
/// # Example
///
/// ```ignore
/// let head = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .header("Content-Length", "17")
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Appends a header. Order is preserved.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> ResponseHead {
        ResponseHead {
            status: self.status,
            headers: self.headers,
        }
    }
}

impl ResponseHead {
    /// The head of a 200 response carrying a file of `len` bytes.
    pub fn file(content_type: ContentType, len: u64) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", content_type.as_str())
            .header("Content-Length", len.to_string())
            .build()
    }

    /// Looks up a header by exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
