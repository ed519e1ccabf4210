use std::fmt;

use crate::http::request::Request;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing but whitespace before the end of the line.
    Empty,
    /// A method token with nothing after it.
    MissingTarget,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty request line"),
            ParseError::MissingTarget => f.write_str("request line has no target"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parses the request line at the start of `buf`.
///
/// The line runs up to the first `\n` or, failing that, to the end of the
/// buffer. Whatever follows the line is ignored. Tokens are separated by
/// ASCII whitespace only, and no token has to be valid UTF-8: the target is
/// kept as raw bytes, while the method and version are decoded lossily.
pub fn parse_request_line(buf: &[u8]) -> Result<Request, ParseError> {
    let line = first_line(buf);

    let mut parts = line
        .split(u8::is_ascii_whitespace)
        .filter(|token| !token.is_empty());

    let method = parts.next().ok_or(ParseError::Empty)?;
    let target = parts.next().ok_or(ParseError::MissingTarget)?;
    // Absent or malformed versions are tolerated
    let version = parts
        .next()
        .map(|v| String::from_utf8_lossy(v).into_owned());

    Ok(Request::new(
        String::from_utf8_lossy(method),
        target,
        version,
    ))
}

/// Whether `buf` holds a full request line, i.e. a `\n` follows the first
/// non-whitespace byte.
pub fn request_line_complete(buf: &[u8]) -> bool {
    let start = skip_leading_whitespace(buf);
    buf[start..].contains(&b'\n')
}

fn first_line(buf: &[u8]) -> &[u8] {
    let rest = &buf[skip_leading_whitespace(buf)..];
    let end = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
    &rest[..end]
}

fn skip_leading_whitespace(buf: &[u8]) -> usize {
    buf.iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(buf.len())
}
