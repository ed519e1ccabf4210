use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", cfg.server.listen_addr))?;
    info!("Listening on {}", cfg.server.listen_addr);

    serve(listener, cfg).await
}

/// Accepts connections on an already bound listener, one task per connection.
///
/// Only the accept step happens here. Nothing a single connection does can
/// stop the loop.
pub async fn serve(listener: TcpListener, cfg: &Config) -> anyhow::Result<()> {
    info!(
        root = %cfg.static_files.root.display(),
        confine = cfg.static_files.confine_to_root,
        "Serving files"
    );
    let cfg = Arc::new(cfg.clone());

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let cfg = Arc::clone(&cfg);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, cfg);
            match conn.run().await {
                Ok(outcome) => tracing::debug!(%peer, ?outcome, "Connection finished"),
                Err(e) => tracing::error!("Connection error from {}: {}", peer, e),
            }
        });
    }
}
