//! Network layer subsystem.
//!
//! Binds the single inbound listener; accepting and connection handling are
//! left to the Axum/hyper server.

pub mod listener;

pub use listener::bind;
