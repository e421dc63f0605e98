//! Docker path proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │              DOCKER PATH PROXY               │
//!   docker client      │  ┌────────┐   ┌─────────────┐   ┌─────────┐  │
//!   ───────────────────┼─▶│ server │──▶│  request    │──▶│ forward │──┼──▶ dockerd
//!   C:\Users\foo:/data │  │        │   │  mungers    │   │         │  │    /mnt/c/Users/foo:/data
//!                      │  └────────┘   └──────┬──────┘   └────┬────┘  │
//!                      │                      │               │       │
//!                      │            ┌─────────▼──────┐        │       │
//!                      │            │ bind grammar + │        │       │
//!                      │            │ translator     │        │       │
//!                      │            └────────────────┘        │       │
//!   ◀──────────────────┼──────────── response mungers ◀───────┘       │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use docker_path_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use docker_path_proxy::lifecycle::{self, Shutdown};
use docker_path_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "docker-path-proxy", version)]
#[command(about = "Docker API proxy that translates bind-mount paths for the daemon", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address Docker clients connect to (overrides listener.bind_address).
    #[arg(long)]
    listen: Option<String>,

    /// Docker daemon address (overrides daemon.address).
    #[arg(long)]
    daemon: Option<String>,

    /// Where the daemon sees client drives (overrides munging.mount_root).
    #[arg(long)]
    mount_root: Option<String>,
}

impl Cli {
    fn load(&self) -> Result<ProxyConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(listen) = &self.listen {
            config.listener.bind_address = listen.clone();
        }
        if let Some(daemon) = &self.daemon {
            config.daemon.address = daemon.clone();
        }
        if let Some(mount_root) = &self.mount_root {
            config.munging.mount_root = mount_root.clone();
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli.load()?;

    logging::init(&config.observability.log_level);
    tracing::info!("docker-path-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        daemon = %config.daemon.address,
        mount_root = %config.munging.mount_root,
        max_body_bytes = config.munging.max_body_bytes,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let (server, listener) = lifecycle::start(config).await?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();
    server.run(listener, shutdown.signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
