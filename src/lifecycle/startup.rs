//! Startup orchestration.
//!
//! # Responsibilities
//! - Start background tasks (metrics exporter, config watcher, signal listener)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, after the upstream compiles

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use metrics_exporter_prometheus::BuildError;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::config::watcher::ConfigWatcher;
use crate::config::{Overrides, ProxyConfig};
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Fatal errors while bringing the proxy up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("invalid metrics address: {0}")]
    MetricsAddress(#[from] AddrParseError),
    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] BuildError),
    #[error("failed to watch config file: {0}")]
    Watch(#[from] notify::Error),
    #[error(transparent)]
    Server(#[from] ServerError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run the proxy until a shutdown signal arrives.
///
/// When `config_path` is set the file is watched and reloads are applied
/// live, with `overrides` layered on top of each reload.
pub async fn run(
    config: ProxyConfig,
    config_path: Option<PathBuf>,
    overrides: Overrides,
) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        context = %config.proxy.context,
        target = %config.proxy.target,
        change_origin = config.proxy.change_origin,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let server = HttpServer::new(config)?;

    let (config_updates, _watcher) = match config_path {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(&path);
            let handle = watcher.with_overrides(overrides).run()?;
            (updates, Some(handle))
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    let bind_address = server.config().listener.bind_address.clone();
    let listener = TcpListener::bind(&bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
