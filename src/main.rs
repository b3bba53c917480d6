//! Round-robin HTTP load balancer.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                LOAD BALANCER                 │
//!                      │                                              │
//!   Client Request     │  ┌──────────┐   ┌──────────┐   ┌───────────┐ │
//!   ───────────────────┼─▶│ listener │──▶│   http   │──▶│dispatcher │ │
//!                      │  │          │   │  server  │   │+ rotation │ │
//!                      │  └──────────┘   └──────────┘   └─────┬─────┘ │
//!                      │                                      │       │
//!                      │                                      ▼       │
//!   Client Response    │  ┌──────────┐   ┌──────────┐   ┌───────────┐ │
//!   ◀──────────────────┼──│ response │◀──│transport │◀──│  backend  │◀┼── Upstream
//!                      │  │  relay   │   │          │   │  (alive?) │ │
//!                      │  └──────────┘   └──────────┘   └───────────┘ │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use round_robin_proxy::config::{self, BackendConfig, ProxyConfig};
use round_robin_proxy::lifecycle::{signals, Shutdown};
use round_robin_proxy::{net, observability, HttpServer, ProxyError};

#[derive(Parser, Debug)]
#[command(name = "round-robin-proxy")]
#[command(about = "Forward HTTP requests to a pool of backends in round-robin order", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. ":8000" or "127.0.0.1:8000".
    #[arg(short, long)]
    listen: Option<String>,

    /// Upstream URL; repeat for each backend. Replaces the file's list.
    #[arg(short, long = "backend", value_name = "URL")]
    backends: Vec<String>,

    /// Log filter, e.g. "debug" or "round_robin_proxy=trace".
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ProxyConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::read_config(path)?,
            None => ProxyConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listener.bind_address = listen;
        }
        if !self.backends.is_empty() {
            config.backends = self.backends.into_iter().map(BackendConfig::new).collect();
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("round-robin-proxy: {}", ProxyError::from(e));
            return ExitCode::FAILURE;
        }
    };

    observability::logging::init(&config.observability);

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ProxyConfig) -> Result<(), ProxyError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        "Configuration loaded"
    );

    // Pool first, so a bad backend list never opens the port.
    let server = HttpServer::new(config)?;
    let address = server.config().listener.bind_address.clone();
    let listener = net::bind(&server.config().listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        shutdown.trigger();
    });

    server
        .run(listener, server_shutdown)
        .await
        .map_err(|source| ProxyError::Listen { address, source })
}
