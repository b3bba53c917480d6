//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → [dispatcher picks a backend]
//!     → request.rs (rewrite URI, Host, X-Forwarded-For)
//!     → headers.rs (strip hop-by-hop headers)
//!     → response.rs (relay upstream response or map error to status)
//!     → Send to client
//! ```

pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
