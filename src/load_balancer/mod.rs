//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → dispatcher.rs (entry point)
//!     → round_robin.rs (next live backend, bounded scan over the pool)
//!     → pool.rs (ordered, fixed set of backends)
//!     → backend.rs (liveness + forward)
//!     → transport.rs (rewrite, send, stream response back)
//! ```
//!
//! # Design Decisions
//! - The rotation cursor is a single atomic; no lock is held while forwarding
//! - Dead backends are skipped, not removed; they rejoin on the next cycle
//! - Each backend owns its upstream connection pool

pub mod backend;
pub mod dispatcher;
pub mod pool;
pub mod round_robin;
pub mod transport;

pub use backend::Backend;
pub use dispatcher::Dispatcher;
pub use pool::BackendPool;
pub use round_robin::RoundRobin;
pub use transport::{ForwardError, HttpTransport};
