//! Backend pool.
//!
//! # Responsibilities
//! - Build every backend once, in configuration order
//! - Expose read access by index for the rotation

use std::sync::Arc;

use crate::config::{BackendConfig, ConfigError, TimeoutConfig};
use crate::load_balancer::backend::Backend;

/// Ordered, fixed-size set of backends. Order defines the rotation.
#[derive(Debug)]
pub struct BackendPool {
    backends: Vec<Arc<Backend>>,
}

impl BackendPool {
    /// Create the pool from configuration. Fails on an empty list or any
    /// invalid address.
    pub fn new(configs: &[BackendConfig], timeouts: &TimeoutConfig) -> Result<Self, ConfigError> {
        if configs.is_empty() {
            return Err(ConfigError::EmptyPool);
        }

        let backends = configs
            .iter()
            .map(|config| Backend::new(&config.address, timeouts).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        for (index, backend) in backends.iter().enumerate() {
            tracing::debug!(index, backend = %backend.address(), "Backend registered");
        }

        Ok(Self { backends })
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Backend>> {
        self.backends.get(index)
    }

    /// All backends in rotation order (for health probers).
    pub fn backends(&self) -> &[Arc<Backend>] {
        &self.backends
    }

    /// Count of backends currently marked alive.
    pub fn alive_count(&self) -> usize {
        self.backends.iter().filter(|b| b.is_alive()).count()
    }
}
