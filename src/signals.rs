use anyhow::Result;
use arc_swap::ArcSwap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use crate::config::Config;

/// Shutdown signal types
#[derive(Debug, Clone, Copy)]
pub enum ShutdownSignal {
    /// Graceful shutdown (drain connections, clean up)
    Graceful,
}

/// Setup signal handlers for the server
///
/// Returns a broadcast sender for shutdown signals and a join handle for the signal task
///
/// Handles:
/// - SIGTERM/SIGINT: Graceful shutdown
/// - SIGHUP: Configuration reload from `config_path`
#[cfg(unix)]
pub fn setup_signal_handlers(
    config: Arc<ArcSwap<Config>>,
    config_path: PathBuf,
) -> (
    broadcast::Sender<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
) {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        let installed = (|| -> std::io::Result<_> {
            Ok((
                signal(SignalKind::terminate())?,
                signal(SignalKind::interrupt())?,
                signal(SignalKind::hangup())?,
            ))
        })();
        let (mut sigterm, mut sigint, mut sighup) = match installed {
            Ok(signals) => signals,
            Err(e) => {
                error!("Failed to install signal handlers: {}", e);
                return;
            }
        };

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("SIGTERM received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sigint.recv() => {
                    info!("SIGINT received, initiating graceful shutdown");
                    let _ = tx_clone.send(ShutdownSignal::Graceful);
                    break;
                }
                _ = sighup.recv() => {
                    info!("SIGHUP received, reloading configuration");
                    if let Err(e) = reload_config(&config, &config_path) {
                        error!("Failed to reload configuration: {}", e);
                    } else {
                        info!("Configuration reloaded successfully");
                    }
                }
            }
        }
    });

    (shutdown_tx, handle)
}

/// Windows placeholder - signals not fully supported
#[cfg(not(unix))]
pub fn setup_signal_handlers(
    _config: Arc<ArcSwap<Config>>,
    _config_path: PathBuf,
) -> (
    broadcast::Sender<ShutdownSignal>,
    tokio::task::JoinHandle<()>,
) {
    let (shutdown_tx, _) = broadcast::channel(16);
    let tx_clone = shutdown_tx.clone();

    let handle = tokio::spawn(async move {
        // On Windows, only Ctrl+C is supported
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl+C received, initiating shutdown");
                let _ = tx_clone.send(ShutdownSignal::Graceful);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    });

    (shutdown_tx, handle)
}

/// Load, validate and atomically swap in a new configuration.
///
/// On any failure the running configuration stays in place. LLM and storage
/// settings apply to the next request; listener and logging settings need a
/// restart.
pub fn reload_config(config: &ArcSwap<Config>, path: &std::path::Path) -> Result<()> {
    let new_config = crate::config::load_config(path)?;
    let current = config.load();

    if new_config.server.host != current.server.host
        || new_config.server.port != current.server.port
    {
        warn!(
            "Listener address changed to {}:{}; restart required for it to take effect",
            new_config.server.host, new_config.server.port
        );
    }
    if new_config.server.log_level != current.server.log_level
        || new_config.server.log_format != current.server.log_format
    {
        warn!("Logging settings changed; restart required for them to take effect");
    }

    info!(
        model = %new_config.llm.model,
        storage_backend = %new_config.storage.backend,
        "New configuration loaded"
    );
    drop(current);

    config.store(Arc::new(new_config));
    Ok(())
}
