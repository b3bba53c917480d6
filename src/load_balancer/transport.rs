//! HTTP forwarding transport bound to one upstream.
//!
//! # Responsibilities
//! - Own the upstream connection pool for one backend
//! - Rewrite, send and relay a single request/response pair
//! - Enforce the optional per-call deadline
//!
//! Dropping the future returned by [`HttpTransport::forward`] aborts the
//! upstream call, so a client disconnect cancels the forwarded request.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{self, Request, Response};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use url::Url;

use crate::config::TimeoutConfig;
use crate::http::{request::into_upstream_request, response::from_upstream};

#[derive(Debug, Error)]
pub enum ForwardError {
    /// The inbound request could not be rewritten for the upstream.
    #[error("invalid upstream request: {0}")]
    InvalidRequest(#[from] http::Error),

    /// Connection refused, reset, or a malformed upstream response.
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    /// The per-call deadline elapsed.
    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

/// Forwarding handle for a single upstream target.
#[derive(Clone)]
pub struct HttpTransport {
    target: Url,
    client: Client<HttpsConnector<HttpConnector>, Body>,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(target: Url, timeouts: &TimeoutConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(timeouts.connect()));
        connector.set_nodelay(true);
        connector.enforce_http(false);

        // Plain http targets pass straight through; https targets get TLS
        // verified against the webpki root set.
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(connector);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            target,
            client,
            timeout: timeouts.upstream(),
        }
    }

    /// Send `request` upstream and return its response with the body streaming.
    pub async fn forward(
        &self,
        request: Request<Body>,
        client_ip: Option<IpAddr>,
    ) -> Result<Response<Body>, ForwardError> {
        let request = into_upstream_request(request, &self.target, client_ip)?;
        let call = self.client.request(request);

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ForwardError::Timeout(limit))??,
            None => call.await?,
        };

        Ok(from_upstream(response))
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("target", &self.target.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}
