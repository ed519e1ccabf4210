//! Content type detection based on the request target's extension.

use std::fmt;

/// The content types the server is willing to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// `.jpg` and `.jpeg`
    Jpeg,
    /// `.gif`
    Gif,
    /// `.html`
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeError {
    /// The target contains no `.` at all.
    MissingExtension,
    /// The extension is not in the table. Holds everything from the first `.`
    /// on, lossily decoded.
    Unsupported(String),
}

impl ContentType {
    /// Resolves the content type of a request target.
    ///
    /// The extension is everything from the FIRST `.` in the target, compared
    /// byte for byte. `/a.html.bak` therefore has the extension `.html.bak`
    /// and is rejected. The target does not need to be UTF-8.
    ///
    /// # Example
    ///
    /// ```
    /// # use filegate::http::mime::{ContentType, ContentTypeError};
    /// assert_eq!(ContentType::from_target("/cat.gif"), Ok(ContentType::Gif));
    /// assert_eq!(
    ///     ContentType::from_target("/archive.tar.gz"),
    ///     Err(ContentTypeError::Unsupported(".tar.gz".to_string()))
    /// );
    /// ```
    pub fn from_target(target: impl AsRef<[u8]>) -> Result<Self, ContentTypeError> {
        let target = target.as_ref();
        let dot = target
            .iter()
            .position(|&b| b == b'.')
            .ok_or(ContentTypeError::MissingExtension)?;
        Self::from_extension(&target[dot..])
    }

    /// Maps a dotted extension to a content type.
    pub fn from_extension(ext: impl AsRef<[u8]>) -> Result<Self, ContentTypeError> {
        match ext.as_ref() {
            b".jpeg" | b".jpg" => Ok(ContentType::Jpeg),
            b".gif" => Ok(ContentType::Gif),
            b".html" => Ok(ContentType::Html),
            other => Err(ContentTypeError::Unsupported(
                String::from_utf8_lossy(other).into_owned(),
            )),
        }
    }

    /// The MIME string sent in the `Content-Type` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Jpeg => "image/jpeg",
            ContentType::Gif => "image/gif",
            ContentType::Html => "text/html",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ContentTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentTypeError::MissingExtension => f.write_str("file must have an extension"),
            ContentTypeError::Unsupported(ext) => {
                write!(f, "unsupported file type requested: {}", ext)
            }
        }
    }
}

impl std::error::Error for ContentTypeError {}
