//! Development reverse proxy.
//!
//! ```text
//!                          ┌──────────────────────────────────────┐
//!                          │              DEV PROXY               │
//!   Browser / UI           │                                      │
//!   ───────────────────────┼─▶ /api/**  ──▶ rewrite ──▶ hyper ────┼──▶ WF_SERVER
//!                          │                             client   │    (default
//!                          │   anything else ──▶ 404              │  localhost:8081)
//!                          │                                      │
//!                          │   config file ──▶ watcher ──▶ swap   │
//!                          └──────────────────────────────────────┘
//! ```
//!
//! Configuration precedence, lowest first: defaults, `--config` file,
//! `WF_SERVER`, command-line flags.

use std::path::PathBuf;

use clap::Parser;

use dev_proxy::config::{resolve_config, Overrides};
use dev_proxy::lifecycle::startup;
use dev_proxy::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "dev-proxy", version)]
#[command(about = "Forward a path prefix to a backend origin during development", long_about = None)]
struct Cli {
    /// TOML config file; watched and reloaded on change
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3000
    #[arg(short, long)]
    bind: Option<String>,

    /// Backend origin; overrides WF_SERVER
    #[arg(short, long)]
    target: Option<String>,

    /// Path prefix to forward
    #[arg(long)]
    context: Option<String>,

    /// Log level when RUST_LOG is unset
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            bind_address: self.bind.clone(),
            target: self.target.clone(),
            context: self.context.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let overrides = cli.overrides();

    let config = resolve_config(cli.config.as_deref(), &overrides)?;

    logging::init(&config.observability.log_level);
    tracing::info!("dev-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config, cli.config, overrides).await?;
    Ok(())
}
