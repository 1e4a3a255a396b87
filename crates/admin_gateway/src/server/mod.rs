//! Gateway server and connection handling.

pub mod core;
pub mod handlers;

pub use core::GatewayServer;
