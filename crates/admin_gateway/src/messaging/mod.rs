//! Message handling and routing for admin client frames.
//!
//! This module provides the JSON frame format used on the wire and the router
//! that maps frames onto dispatcher commands.

pub mod router;
pub mod types;

pub use router::MessageRouter;
pub use types::{RpcReply, RpcRequest};
