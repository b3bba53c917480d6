//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request IDs (UUID v4)
//! - Rewrite the inbound request for a single upstream target
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Method, path, query, body and end-to-end headers are forwarded untouched

use std::net::IpAddr;

use axum::body::Body;
use axum::http::{self, header, HeaderValue, Request, Uri, Version};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::{Position, Url};
use uuid::Uuid;

use crate::http::headers::{append_forwarded_for, strip_hop_by_hop};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Issues a fresh UUID v4 for requests arriving without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID from headers, for log fields.
pub fn request_id<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// `host[:port]` of the target, as sent in the Host header.
pub fn target_authority(target: &Url) -> &str {
    &target[Position::BeforeHost..Position::AfterPort]
}

/// Join two URL paths with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Map an inbound URI onto the upstream target.
///
/// The target's path prefixes the request path and the two query strings
/// are concatenated with `&`.
pub fn upstream_uri(target: &Url, original: &Uri) -> Result<Uri, http::Error> {
    let path = join_paths(target.path(), original.path());
    let query = match (target.query(), original.query()) {
        (Some(base), Some(own)) if !base.is_empty() && !own.is_empty() => {
            Some(format!("{base}&{own}"))
        }
        (Some(base), Some(own)) => Some(format!("{base}{own}")),
        (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
        (None, None) => None,
    };

    let path_and_query = match query {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };

    Uri::builder()
        .scheme(target.scheme())
        .authority(target_authority(target))
        .path_and_query(path_and_query)
        .build()
}

/// Rewrite an inbound request so it can be sent to `target`.
pub fn into_upstream_request(
    request: Request<Body>,
    target: &Url,
    client_ip: Option<IpAddr>,
) -> Result<Request<Body>, http::Error> {
    let (mut parts, body) = request.into_parts();

    parts.uri = upstream_uri(target, &parts.uri)?;
    parts.version = Version::HTTP_11;

    strip_hop_by_hop(&mut parts.headers);
    parts
        .headers
        .insert(header::HOST, HeaderValue::from_str(target_authority(target))?);
    if let Some(ip) = client_ip {
        append_forwarded_for(&mut parts.headers, ip);
    }

    Ok(Request::from_parts(parts, body))
}
