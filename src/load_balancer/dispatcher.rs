//! Request dispatch: select the next live backend and forward to it.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};

use crate::error::ProxyError;
use crate::http::request::request_id;
use crate::load_balancer::{backend::Backend, pool::BackendPool, round_robin::RoundRobin};

/// Owns the rotation over a shared backend pool.
#[derive(Debug)]
pub struct Dispatcher {
    pool: Arc<BackendPool>,
    strategy: RoundRobin,
}

impl Dispatcher {
    pub fn new(pool: Arc<BackendPool>) -> Self {
        Self {
            pool,
            strategy: RoundRobin::new(),
        }
    }

    pub fn pool(&self) -> &Arc<BackendPool> {
        &self.pool
    }

    /// Pick the next live backend in rotation order.
    pub fn select_next(&self) -> Result<Arc<Backend>, ProxyError> {
        match self.strategy.next_server(self.pool.backends()) {
            Some(backend) => Ok(backend),
            None => Err(ProxyError::AllBackendsUnavailable {
                backends: self.pool.len(),
            }),
        }
    }

    /// Forward `request` to the next live backend.
    ///
    /// Fails with `AllBackendsUnavailable` before any upstream I/O when the
    /// whole pool is down. A failed forward is not retried elsewhere.
    pub async fn dispatch(
        &self,
        request: Request<Body>,
        client_addr: Option<SocketAddr>,
    ) -> Result<Response<Body>, ProxyError> {
        let id = request_id(&request).to_string();

        let backend = self.select_next().inspect_err(|_| {
            tracing::warn!(
                request_id = %id,
                backends = self.pool.len(),
                alive = self.pool.alive_count(),
                "No healthy backends"
            );
        })?;

        tracing::info!(
            request_id = %id,
            method = %request.method(),
            path = %request.uri().path(),
            backend = %backend.address(),
            "Redirecting request"
        );

        backend
            .forward(request, client_addr)
            .await
            .inspect_err(|e| tracing::error!(request_id = %id, error = %e, "Upstream error"))
    }
}
