//! Shared-secret authorization for admin commands.
//!
//! A single operator secret is configured at startup. Every request carries it
//! in the `password` parameter and is checked independently; there is no
//! session state. The comparison is a plain, case-sensitive equality check:
//! the secret is neither hashed nor compared in constant time, so it must only
//! be exposed on trusted networks.

use crate::request::{CommandRequest, ParamValue};
use std::fmt;

/// Name of the request parameter carrying the shared secret.
pub const PASSWORD_PARAM: &str = "password";

/// Returns whether `provided` satisfies `required`.
///
/// An empty `required` secret leaves the gateway open.
pub fn check(required: &str, provided: Option<&str>) -> bool {
    if required.is_empty() {
        return true;
    }
    provided == Some(required)
}

/// Holds the configured secret and authorizes requests against it.
#[derive(Clone)]
pub struct AuthorizationGuard {
    required_secret: String,
}

impl AuthorizationGuard {
    pub fn new(required_secret: impl Into<String>) -> Self {
        Self {
            required_secret: required_secret.into(),
        }
    }

    /// A guard that authorizes every request.
    pub fn open() -> Self {
        Self::new(String::new())
    }

    pub fn is_open(&self) -> bool {
        self.required_secret.is_empty()
    }

    /// Only a text `password` can match; numbers and booleans never do.
    pub fn authorize(&self, request: &CommandRequest) -> bool {
        let provided = match request.get(PASSWORD_PARAM) {
            Some(ParamValue::Text(text)) => Some(text.as_str()),
            _ => None,
        };
        check(&self.required_secret, provided)
    }
}

impl fmt::Debug for AuthorizationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizationGuard")
            .field("required_secret", &if self.is_open() { "<none>" } else { "<redacted>" })
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_secret_authorizes_everything() {
        assert!(check("", None));
        assert!(check("", Some("anything")));
        assert!(AuthorizationGuard::open().authorize(&CommandRequest::new("broadcast")));
    }

    #[test]
    fn test_secret_must_match_exactly() {
        assert!(check("Secret", Some("Secret")));
        assert!(!check("Secret", Some("secret")));
        assert!(!check("Secret", Some("Secret ")));
        assert!(!check("Secret", None));
    }

    #[test]
    fn test_guard_reads_password_parameter() {
        let guard = AuthorizationGuard::new("hunter2");
        let good = CommandRequest::new("broadcast").param(PASSWORD_PARAM, "hunter2");
        let bad = CommandRequest::new("broadcast").param(PASSWORD_PARAM, "hunter3");
        let absent = CommandRequest::new("broadcast");

        assert!(guard.authorize(&good));
        assert!(!guard.authorize(&bad));
        assert!(!guard.authorize(&absent));
    }

    #[test]
    fn test_non_text_password_is_rejected() {
        let guard = AuthorizationGuard::new("1234");
        let numeric = CommandRequest::new("broadcast").param(PASSWORD_PARAM, 1234i64);
        let text = CommandRequest::new("broadcast").param(PASSWORD_PARAM, "1234");

        assert!(!guard.authorize(&numeric));
        assert!(guard.authorize(&text));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let rendered = format!("{:?}", AuthorizationGuard::new("hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
