use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{ResponseHead, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

fn status_line(status: StatusCode, message: &str) -> String {
    format!("{} {} {}\r\n", HTTP_VERSION, status.as_u16(), message)
}

fn serialize_head(head: &ResponseHead) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(status_line(head.status, head.status.reason_phrase()).as_bytes());

    for (k, v) in &head.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Holds serialized response bytes and tracks how much has been written.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    /// A writer for a full head: status line, headers and the blank line.
    pub fn new(head: &ResponseHead) -> Self {
        Self {
            buffer: serialize_head(head),
            written: 0,
        }
    }

    /// A writer for a bare error line with no headers and no blank line.
    pub fn status_only(status: StatusCode) -> Self {
        Self {
            buffer: status_line(status, status.error_message()).into_bytes(),
            written: 0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub async fn write_to<W>(&mut self, sink: &mut W) -> io::Result<()>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        while self.written < self.buffer.len() {
            let n = sink.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "connection closed while writing",
                ));
            }

            self.written += n;
        }

        sink.flush().await
    }
}

/// Sends `HTTP/1.1 <code> <message>\r\n` and nothing else.
pub async fn send_http_error<W>(sink: &mut W, status: StatusCode) -> io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    ResponseWriter::status_only(status).write_to(sink).await
}
