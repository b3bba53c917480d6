//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream server
//! - Track liveness (written by a health prober, read by the dispatcher)
//! - Forward requests through the backend's own transport

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::body::Body;
use axum::http::{Request, Response};
use url::Url;

use crate::config::{ConfigError, TimeoutConfig};
use crate::error::ProxyError;
use crate::load_balancer::transport::HttpTransport;

/// Parse an upstream address into an absolute `http` or `https` URL with a host.
pub fn parse_address(address: &str) -> Result<Url, String> {
    let url = Url::parse(address.trim()).map_err(|e| e.to_string())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!(
            "unsupported scheme {:?}, expected \"http\" or \"https\"",
            url.scheme()
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    if url.fragment().is_some() {
        return Err("fragments are not allowed".to_string());
    }

    Ok(url)
}

/// A single backend server.
#[derive(Debug)]
pub struct Backend {
    /// The address as configured.
    address: String,
    /// Whether the backend should receive traffic.
    alive: AtomicBool,
    transport: HttpTransport,
}

impl Backend {
    /// Create a new backend. Backends start alive.
    pub fn new(address: &str, timeouts: &TimeoutConfig) -> Result<Self, ConfigError> {
        let target = parse_address(address).map_err(|reason| ConfigError::InvalidBackend {
            address: address.to_string(),
            reason,
        })?;

        Ok(Self {
            address: address.trim().to_string(),
            alive: AtomicBool::new(true),
            transport: HttpTransport::new(target, timeouts),
        })
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Update liveness. Intended for health probers; never blocks dispatch.
    pub fn set_alive(&self, alive: bool) {
        let was = self.alive.swap(alive, Ordering::Relaxed);
        if was != alive {
            tracing::info!(backend = %self.address, alive, "Backend liveness changed");
        }
    }

    /// Relay `request` to this backend and return the upstream response.
    pub async fn forward(
        &self,
        request: Request<Body>,
        client_addr: Option<SocketAddr>,
    ) -> Result<Response<Body>, ProxyError> {
        self.transport
            .forward(request, client_addr.map(|addr| addr.ip()))
            .await
            .map_err(|source| ProxyError::Forwarding {
                backend: self.address.clone(),
                source,
            })
    }
}
