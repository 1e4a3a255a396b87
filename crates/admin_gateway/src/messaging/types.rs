//! Wire frames exchanged with admin clients.

use crate::response::CommandResponse;
use serde::{Deserialize, Serialize};

/// A request frame sent by an admin client.
///
/// ```json
/// {
///   "id": 7,
///   "method": "admin_restart",
///   "params": { "password": "secret", "regionID": "5b1c..." }
/// }
/// ```
///
/// `id` is optional and echoed back unchanged so clients can pair replies
/// with requests when several are in flight on one connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Option<serde_json::Value>,

    pub method: String,

    #[serde(default)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// A reply frame: either a command `result` or a transport-level `fault`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CommandResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl RpcReply {
    pub fn result(id: Option<serde_json::Value>, response: CommandResponse) -> Self {
        Self {
            id,
            result: Some(response),
            fault: None,
        }
    }

    pub fn fault(id: Option<serde_json::Value>, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            fault: Some(message.into()),
        }
    }
}
