//! Frame routing: wire method name to dispatcher command.

use crate::dispatcher::CommandDispatcher;
use crate::error::GatewayError;
use crate::messaging::{RpcReply, RpcRequest};
use crate::request::{CommandRequest, ParamValue};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Older wire names still accepted for commands registered under another name.
const METHOD_ALIASES: &[(&str, &str)] = &[("restart", "restart_region")];

/// Parses request frames, resolves their method and dispatches them.
pub struct MessageRouter {
    dispatcher: Arc<CommandDispatcher>,
    method_prefix: String,
}

impl MessageRouter {
    pub fn new(dispatcher: Arc<CommandDispatcher>, method_prefix: impl Into<String>) -> Self {
        Self {
            dispatcher,
            method_prefix: method_prefix.into(),
        }
    }

    pub fn dispatcher(&self) -> &Arc<CommandDispatcher> {
        &self.dispatcher
    }

    /// Maps a wire method to a command name.
    ///
    /// Both `admin_create_region` and `create_region` resolve to the same
    /// command when the prefix is `admin_`. `admin_restart` is kept as an
    /// alias of `restart_region`.
    pub fn resolve_method<'a>(&self, method: &'a str) -> &'a str {
        let command = if self.method_prefix.is_empty() {
            method
        } else {
            method.strip_prefix(self.method_prefix.as_str()).unwrap_or(method)
        };

        METHOD_ALIASES
            .iter()
            .find(|(alias, _)| *alias == command)
            .map_or(command, |(_, target)| *target)
    }

    /// Handles one text frame and returns the serialized reply.
    pub async fn route(&self, text: &str) -> String {
        let reply = match serde_json::from_str::<RpcRequest>(text) {
            Ok(request) => self.route_request(request).await,
            Err(e) => {
                warn!("Invalid admin frame: {}", e);
                RpcReply::fault(None, format!("Invalid JSON: {e}"))
            }
        };

        serde_json::to_string(&reply).unwrap_or_else(|e| {
            format!("{{\"fault\":\"{}\"}}", GatewayError::Internal(e.to_string()))
        })
    }

    pub async fn route_request(&self, request: RpcRequest) -> RpcReply {
        let RpcRequest { id, method, params } = request;
        let command = self.resolve_method(&method);
        debug!("📨 Routing admin method '{}' to command '{}'", method, command);

        let mut command_request = CommandRequest::new(command);
        for (name, value) in params {
            match to_param(&value) {
                Some(param) => command_request.insert(name, param),
                None => {
                    return RpcReply::fault(id, format!("Unsupported value for parameter {name}: {value}"));
                }
            }
        }

        match self.dispatcher.dispatch(&command_request).await {
            Ok(response) => {
                trace!("✅ Admin method '{}' answered", method);
                RpcReply::result(id, response)
            }
            Err(e) => {
                warn!("Admin method '{}' rejected: {}", method, e);
                RpcReply::fault(id, e.to_string())
            }
        }
    }
}

fn to_param(value: &serde_json::Value) -> Option<ParamValue> {
    match value {
        serde_json::Value::String(s) => Some(ParamValue::Text(s.clone())),
        serde_json::Value::Bool(b) => Some(ParamValue::Bool(*b)),
        serde_json::Value::Number(n) => n.as_i64().map(ParamValue::Integer),
        _ => None,
    }
}
