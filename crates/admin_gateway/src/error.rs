//! Error types and failure reporting for the admin gateway.
//!
//! Two layers of failure exist:
//!
//! * [`GatewayError`] covers infrastructure problems (binding, duplicate
//!   command registration, unknown methods) that never reach a command handler.
//! * [`CommandFailure`] is what a command handler returns when an authorized
//!   request could not be carried out. It is rendered into the free-text
//!   `error` response field by the dispatcher, so callers keep seeing the
//!   existing wire shape while the gateway itself works with an explicit kind.

use crate::response::CommandResponse;

/// Enumeration of possible gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Network-related errors such as binding failures or handshake issues
    #[error("Network error: {0}")]
    Network(String),

    /// A command name was registered twice while building the dispatch table
    #[error("Command '{0}' is already registered")]
    DuplicateCommand(String),

    /// The requested command is not part of the dispatch table
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Internal errors such as serialization failures
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Category of a failed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Missing or incorrect shared secret. Rendered as `accepted=false` only.
    Authorization,
    /// Missing required parameter or unparsable value.
    Validation,
    /// The region directory, provisioner or scene loader refused the request.
    Collaborator,
}

/// Failure produced while handling an authorized command.
///
/// `partial` holds response fields that were already established before the
/// failure happened (for example `switched=true` when a scene was resolved but
/// the snapshot load failed). The dispatcher merges them into the response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct CommandFailure {
    pub kind: FailureKind,
    pub message: String,
    pub partial: CommandResponse,
}

impl CommandFailure {
    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            partial: CommandResponse::default(),
        }
    }

    pub fn authorization() -> Self {
        Self::new(FailureKind::Authorization, "wrong password")
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    /// A required parameter was not supplied.
    pub fn missing(param: &str) -> Self {
        Self::validation(format!("missing parameter {param}"))
    }

    /// A parameter was supplied but could not be interpreted.
    pub fn invalid(param: &str, detail: impl std::fmt::Display) -> Self {
        Self::validation(format!("invalid parameter {param}: {detail}"))
    }

    pub fn collaborator(message: impl std::fmt::Display) -> Self {
        Self::new(FailureKind::Collaborator, message.to_string())
    }

    /// Records a response field that is already known at the time of failure.
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.partial.insert(name, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_message_names_field() {
        let failure = CommandFailure::missing("region_x");
        assert_eq!(failure.kind, FailureKind::Validation);
        assert_eq!(failure.to_string(), "missing parameter region_x");
    }

    #[test]
    fn test_partial_fields_are_kept() {
        let failure = CommandFailure::collaborator("snapshot unreadable").with_field("switched", "true");
        assert_eq!(failure.kind, FailureKind::Collaborator);
        assert_eq!(failure.partial.get("switched"), Some("true"));
    }
}
