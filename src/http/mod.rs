//! HTTP protocol implementation.
//!
//! This module implements a small HTTP/1.1 static file server: one request
//! per connection, only the request line is read, and the response is either
//! a file or a bare error status line.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection handler implementing the request-response state machine
//! - **`parser`**: Parses the request line out of the raw request buffer
//! - **`request`**: The parsed request line
//! - **`mime`**: Content type detection based on the target's extension
//! - **`files`**: Target-to-path mapping and chunked file streaming
//! - **`response`**: Status codes and response heads
//! - **`writer`**: Serializes and writes response heads and error lines
//! - **`error`**: Rejections (answered with 400/404) and transport errors
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Buffer bytes until the request line is complete
//!        └──────┬──────┘
//!               │ Request line received (nothing received → Done)
//!               ▼
//!        ┌─────────────┐
//!        │   Parsed    │ ← Resolve content type, build path, open file
//!        └──────┬──────┘
//!               ├─ File opened → Streaming ← Send head, then body in chunks
//!               └─ Rejected               ← Send "HTTP/1.1 400|404 ..." line
//!               ▼
//!        ┌─────────────┐
//!        │    Done     │ ← Shut down the stream
//!        └─────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use filegate::config::Config;
//! use filegate::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::default());
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let config = Arc::clone(&config);
//!         tokio::spawn(async move {
//!             let mut conn = Connection::new(socket, config);
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod error;
pub mod files;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
