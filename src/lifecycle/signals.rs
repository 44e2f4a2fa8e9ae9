//! OS signal handling.
//!
//! # Responsibilities
//! - Translate SIGTERM/SIGINT into graceful shutdown
//! - Translate SIGHUP into a config reload
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP re-reads the config file and feeds the same update channel
//!   as the file watcher, so both reload paths behave identically
//! - On non-Unix platforms only Ctrl+C is wired up

use std::path::PathBuf;

use tokio::sync::mpsc;

use crate::config::{load_config, EdgeConfig};

/// Resolve when a termination signal arrives (SIGINT or SIGTERM).
pub async fn wait_for_termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}

/// Spawn the SIGHUP → config reload bridge.
#[cfg(unix)]
pub fn spawn_reload_on_sighup(path: PathBuf, tx: mpsc::UnboundedSender<EdgeConfig>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sighup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGHUP handler");
                return;
            }
        };
        while sighup.recv().await.is_some() {
            tracing::info!(path = ?path, "SIGHUP received, reloading configuration");
            match load_config(&path) {
                Ok(config) => {
                    let _ = tx.send(config);
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to reload config: {}. Keeping current configuration.",
                        e
                    );
                }
            }
        }
    });
}

#[cfg(not(unix))]
pub fn spawn_reload_on_sighup(_path: PathBuf, _tx: mpsc::UnboundedSender<EdgeConfig>) {}
