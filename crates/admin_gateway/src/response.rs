//! Response construction.
//!
//! Every admin command answers with a flat mapping of field names to string
//! values. Booleans travel as the strings `"true"` and `"false"`, and the
//! presence or absence of a field tells the caller which branch was taken.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire field names used in command responses.
pub mod fields {
    pub const ACCEPTED: &str = "accepted";
    pub const SUCCESS: &str = "success";
    pub const ERROR: &str = "error";
    pub const REGION_UUID: &str = "region_uuid";
    pub const REGION_NAME: &str = "region_name";
    pub const REBOOTING: &str = "rebooting";
    pub const AVATAR_UUID: &str = "avatar_uuid";
    pub const SWITCHED: &str = "switched";
    pub const LOADED: &str = "loaded";
}

/// String encoding for boolean response fields.
pub fn encode_flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// The field mapping returned to the caller of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandResponse(BTreeMap<String, String>);

impl CommandResponse {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Decodes a boolean field; `None` if the field is absent or not a flag.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Whether the request passed authorization.
    pub fn is_accepted(&self) -> bool {
        self.flag(fields::ACCEPTED).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(name.to_string(), value.into());
    }
}

/// Incrementally assembles a [`CommandResponse`].
///
/// Handlers start from [`ResponseBuilder::accepted`]; only the dispatcher
/// produces [`ResponseBuilder::rejected`] responses.
#[derive(Debug, Clone, Default)]
pub struct ResponseBuilder {
    response: CommandResponse,
}

impl ResponseBuilder {
    /// A response for a request that passed authorization.
    pub fn accepted() -> Self {
        Self::default().flag(fields::ACCEPTED, true)
    }

    /// A response for a request that failed authorization. Nothing else may be added.
    pub(crate) fn rejected() -> Self {
        Self::default().flag(fields::ACCEPTED, false)
    }

    pub fn field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.response.insert(name, value);
        self
    }

    pub fn flag(self, name: &str, value: bool) -> Self {
        self.field(name, encode_flag(value))
    }

    /// Copies every field of `other`, overwriting existing values.
    pub fn merge(mut self, other: CommandResponse) -> Self {
        for (name, value) in other.0 {
            self.response.0.insert(name, value);
        }
        self
    }

    /// Sets each field only if it is not already present.
    pub fn defaults(mut self, defaults: &[(&str, &str)]) -> Self {
        for (name, value) in defaults {
            self.response
                .0
                .entry((*name).to_string())
                .or_insert_with(|| (*value).to_string());
        }
        self
    }

    pub fn build(self) -> CommandResponse {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_response_encodes_string_flags() {
        let response = ResponseBuilder::accepted()
            .flag(fields::SUCCESS, false)
            .build();

        assert_eq!(response.get(fields::ACCEPTED), Some("true"));
        assert_eq!(response.get(fields::SUCCESS), Some("false"));
        assert!(response.is_accepted());
    }

    #[test]
    fn test_rejected_response_has_only_accepted() {
        let response = ResponseBuilder::rejected().build();
        assert_eq!(response.len(), 1);
        assert!(!response.is_accepted());
    }

    #[test]
    fn test_defaults_do_not_override_partial_fields() {
        let mut partial = CommandResponse::default();
        partial.insert(fields::SWITCHED, "true");

        let response = ResponseBuilder::accepted()
            .merge(partial)
            .defaults(&[(fields::SWITCHED, "false"), (fields::LOADED, "false")])
            .build();

        assert_eq!(response.flag(fields::SWITCHED), Some(true));
        assert_eq!(response.flag(fields::LOADED), Some(false));
    }

    #[test]
    fn test_serializes_as_flat_string_map() {
        let response = ResponseBuilder::accepted()
            .field(fields::REGION_NAME, "Sandbox")
            .build();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({"accepted": "true", "region_name": "Sandbox"}));
    }

    #[test]
    fn test_empty_value_is_distinct_from_absent_field() {
        let response = ResponseBuilder::accepted().field(fields::ERROR, "").build();
        assert!(response.contains(fields::ERROR));
        assert_eq!(response.get(fields::ERROR), Some(""));
        assert!(!response.contains(fields::SUCCESS));
    }
}
