//! Error taxonomy for the proxy.
//!
//! Startup failures (`Configuration`, `Listen`) abort the process.
//! Per-request failures (`AllBackendsUnavailable`, `Forwarding`) are turned
//! into responses by the HTTP layer and never escape a request task.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::load_balancer::transport::ForwardError;

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Invalid configuration or backend list.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// The listening socket could not be bound.
    #[error("failed to bind listener on {address}: {source}")]
    Listen {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Every backend in the pool failed its liveness check.
    #[error("all {backends} backends are unavailable")]
    AllBackendsUnavailable { backends: usize },

    /// The chosen backend's transport failed.
    #[error("forwarding to {backend} failed: {source}")]
    Forwarding {
        backend: String,
        #[source]
        source: ForwardError,
    },
}
