//! Multi-Brand Static-Site Edge Router (v1)
//!
//! An edge HTTP service built with Tokio and Axum. Several branded
//! static sites live under distinct path prefixes of one origin; this
//! router classifies each request by its Host header, rewrites the URI
//! path, and fetches the result from the origin.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌────────────────────────────────────────────────┐
//!                    │                  EDGE ROUTER                   │
//!                    │                                                │
//!   Client Request   │  ┌─────────┐   ┌──────────────┐   ┌─────────┐ │
//!   ─────────────────┼─▶│  http   │──▶│   rewrite    │──▶│ origin  │─┼──▶ Origin
//!                    │  │ server  │   │ table+rules  │   │  fetch  │ │    (static
//!   Client Response  │  └─────────┘   └──────────────┘   └────┬────┘ │     files)
//!   ◀────────────────┼────────────────────────────────────────┘      │
//!                    │                                                │
//!                    │  ┌──────────────────────────────────────────┐  │
//!                    │  │          Cross-Cutting Concerns          │  │
//!                    │  │  ┌────────┐ ┌────────────┐ ┌──────────┐  │  │
//!                    │  │  │ config │ │ observa-   │ │resilience│  │  │
//!                    │  │  │ +reload│ │ bility     │ │retry/bkof│  │  │
//!                    │  │  └────────┘ └────────────┘ └──────────┘  │  │
//!                    │  │  ┌────────────────────────────────────┐  │  │
//!                    │  │  │      lifecycle: signals/shutdown   │  │  │
//!                    │  │  └────────────────────────────────────┘  │  │
//!                    │  └──────────────────────────────────────────┘  │
//!                    └────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use edge_router::config::{load_config, ConfigWatcher, EdgeConfig};
use edge_router::lifecycle::{signals, Shutdown};
use edge_router::observability::{logging, metrics};
use edge_router::HttpServer;

#[derive(Parser)]
#[command(name = "edge-router")]
#[command(about = "Host-based URI rewriting edge server for multi-brand static sites")]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when
    /// omitted (no brands, origin on localhost).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!("edge-router v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        brands = config.brands.len(),
        origin = %config.origin.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // Hot reload: file watcher plus SIGHUP share one update channel.
    // The watcher guard must stay alive for the lifetime of the server.
    let (config_updates, _watcher_guard) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            signals::spawn_reload_on_sighup(path.clone(), watcher.update_sender());
            let guard = watcher.run()?;
            (updates, Some(guard))
        }
        None => {
            let (_tx, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_termination().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(config)?;
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
