//! Filegate - minimal static file server
//!
//! Core library for request parsing, content type resolution and file
//! streaming over HTTP/1.1.

pub mod config;
pub mod http;
pub mod server;
