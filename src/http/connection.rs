use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout_at;

use crate::config::{Config, StaticFilesConfig};
use crate::http::error::{Rejection, ServeError};
use crate::http::files::{StaticFile, resolve_path};
use crate::http::mime::ContentType;
use crate::http::parser::{parse_request_line, request_line_complete};
use crate::http::request::Request;
use crate::http::response::{ResponseHead, StatusCode};
use crate::http::writer::{ResponseWriter, send_http_error};

/// Handles exactly one request on one accepted stream.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    capacity: usize,
    config: Arc<Config>,
}

pub enum ConnectionState {
    Reading,
    Parsed(Request),
    Streaming {
        target: String,
        file: StaticFile,
        content_type: ContentType,
    },
    Rejected(Rejection),
    Done(Outcome),
}

/// How a connection ended, when it ended without a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A 200 response was sent with this many body bytes.
    Served { bytes: u64 },
    /// An error status line was sent.
    Rejected(StatusCode),
    /// The peer closed before sending anything. Nothing was sent back.
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<Config>) -> Self {
        let capacity = config.server.request_buffer_size;
        Self {
            stream,
            buffer: BytesMut::with_capacity(capacity),
            capacity,
            config,
        }
    }

    pub async fn run(&mut self) -> Result<Outcome, ServeError> {
        let mut state = ConnectionState::Reading;

        let outcome = loop {
            state = match state {
                ConnectionState::Reading => {
                    if self.read_request().await? == 0 {
                        ConnectionState::Done(Outcome::Closed)
                    } else {
                        tracing::info!(
                            request = %String::from_utf8_lossy(&self.buffer),
                            "Raw request received"
                        );
                        match parse_request_line(&self.buffer) {
                            Ok(req) => ConnectionState::Parsed(req),
                            Err(e) => ConnectionState::Rejected(e.into()),
                        }
                    }
                }

                ConnectionState::Parsed(req) => {
                    tracing::info!(
                        method = %req.method,
                        uri = %req.target_lossy(),
                        version = req.version(),
                        "Request received"
                    );
                    match open_target(&self.config.static_files, &req).await {
                        Ok((file, content_type)) => ConnectionState::Streaming {
                            target: req.target_lossy().into_owned(),
                            file,
                            content_type,
                        },
                        Err(rejection) => ConnectionState::Rejected(rejection),
                    }
                }

                ConnectionState::Streaming {
                    target,
                    mut file,
                    content_type,
                } => {
                    let head = ResponseHead::file(content_type, file.len());
                    ResponseWriter::new(&head)
                        .write_to(&mut self.stream)
                        .await?;

                    let bytes = file
                        .stream_to(&mut self.stream, self.config.static_files.chunk_size)
                        .await?;

                    tracing::debug!(
                        uri = %target,
                        content_type = %content_type,
                        bytes,
                        "File sent"
                    );
                    ConnectionState::Done(Outcome::Served { bytes })
                }

                ConnectionState::Rejected(rejection) => {
                    let status = rejection.status();
                    tracing::warn!(
                        status = status.as_u16(),
                        error = %rejection,
                        "Rejecting request"
                    );
                    send_http_error(&mut self.stream, status).await?;
                    ConnectionState::Done(Outcome::Rejected(status))
                }

                ConnectionState::Done(outcome) => break outcome,
            };
        };

        // The peer reads until end of stream, so signal it
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Shutdown after response failed");
        }

        Ok(outcome)
    }

    /// Reads until the request line is complete, the buffer is full or the
    /// peer stops sending. Returns the number of bytes buffered.
    pub async fn read_request(&mut self) -> Result<usize, ServeError> {
        let deadline = self
            .config
            .server
            .read_timeout()
            .map(|limit| tokio::time::Instant::now() + limit);

        while !request_line_complete(&self.buffer) && self.buffer.len() < self.capacity {
            let remaining = self.capacity - self.buffer.len();
            let mut limited = (&mut self.buffer).limit(remaining);
            let read = self.stream.read_buf(&mut limited);

            let n = match deadline {
                Some(deadline) => timeout_at(deadline, read)
                    .await
                    .map_err(|_| ServeError::ReadTimeout)??,
                None => read.await?,
            };

            if n == 0 {
                // Client closed its side
                break;
            }
        }

        Ok(self.buffer.len())
    }
}

async fn open_target(
    statics: &StaticFilesConfig,
    req: &Request,
) -> Result<(StaticFile, ContentType), Rejection> {
    // Type check comes first: no file is touched for unsupported targets
    let content_type = ContentType::from_target(&req.target)?;

    let path = resolve_path(&statics.root, &req.target, statics.confine_to_root)?;

    match StaticFile::open(path.clone()).await {
        Ok(file) => Ok((file, content_type)),
        Err(source) => Err(Rejection::FileUnavailable { path, source }),
    }
}
