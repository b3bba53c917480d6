//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay the upstream response to the client
//! - Map proxy errors to HTTP status codes
//!
//! # Design Decisions
//! - Streaming responses avoid buffering entire body
//! - Hop-by-hop headers stripped automatically
//! - Upstream timeouts result in 504 Gateway Timeout

use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use hyper::body::Incoming;

use crate::error::ProxyError;
use crate::http::headers::strip_hop_by_hop;
use crate::load_balancer::transport::ForwardError;

/// Convert an upstream response into one for the client, body still streaming.
pub fn from_upstream(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

impl ProxyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::AllBackendsUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Forwarding {
                source: ForwardError::Timeout(_),
                ..
            } => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Forwarding { .. } => StatusCode::BAD_GATEWAY,
            ProxyError::Configuration(_) | ProxyError::Listen { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let message = match status {
            StatusCode::SERVICE_UNAVAILABLE => "No healthy backends",
            StatusCode::GATEWAY_TIMEOUT => "Upstream request timed out",
            StatusCode::BAD_GATEWAY => "Upstream request failed",
            _ => "Internal proxy error",
        };
        (status, message).into_response()
    }
}
