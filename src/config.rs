//! Server configuration.
//!
//! Loaded from an optional YAML file. Every field has a default, so an empty
//! file (or no file) gives a server on `127.0.0.1:8080` serving the working
//! directory. The `LISTEN` environment variable overrides the listen address.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

use crate::http::files::DEFAULT_CHUNK_SIZE;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_REQUEST_BUFFER_SIZE: usize = 4096;
const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Capacity of the buffer the request line is read into.
    pub request_buffer_size: usize,
    /// How long to wait for a complete request line. Defaults to 30 seconds;
    /// an explicit `null` removes the limit.
    pub read_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory request targets are resolved against.
    pub root: PathBuf,
    /// Size of one body chunk when streaming a file.
    pub chunk_size: usize,
    /// Refuse targets that would resolve outside `root`.
    pub confine_to_root: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            request_buffer_size: DEFAULT_REQUEST_BUFFER_SIZE,
            read_timeout_ms: Some(DEFAULT_READ_TIMEOUT_MS),
        }
    }
}

impl ServerConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            chunk_size: DEFAULT_CHUNK_SIZE,
            confine_to_root: true,
        }
    }
}

impl Config {
    /// Loads the configuration file at `path` (or the defaults), then applies
    /// the `LISTEN` override and validates the result.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = listen_addr;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        // serde_yaml treats an empty document as null, not as an empty map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Listen on all interfaces at `port`.
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.listen_addr = format!("0.0.0.0:{}", port);
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.request_buffer_size == 0 {
            bail!("server.request_buffer_size must be at least 1");
        }
        if self.static_files.chunk_size == 0 {
            bail!("static_files.chunk_size must be at least 1");
        }
        Ok(())
    }
}
