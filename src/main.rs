use std::path::PathBuf;

use clap::Parser;
use filegate::config::Config;
use filegate::server;

/// Serve .html, .jpg/.jpeg and .gif files from a directory over HTTP/1.1
#[derive(Debug, Parser)]
#[command(name = "filegate", version)]
struct Cli {
    /// Port to listen on (all interfaces). Overrides the configured address
    port: Option<u16>,

    /// YAML configuration file
    #[arg(short, long, env = "FILEGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Maximum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "FILEGATE_LOG")]
    log_level: tracing::Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cli.log_level)
        .init();

    let mut cfg = Config::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        cfg = cfg.with_port(port);
    }

    tokio::select! {
        res = server::listener::run(&cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
