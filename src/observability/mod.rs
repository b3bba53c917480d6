//! Observability subsystem.
//!
//! Structured logs only: every subsystem emits `tracing` events with fields
//! (request ID, backend address, error), and `logging.rs` installs the
//! subscriber that writes them to stdout.

pub mod logging;
