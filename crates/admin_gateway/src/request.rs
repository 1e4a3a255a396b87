//! Inbound command requests and per-command parameter access.
//!
//! Parameters are validated by each command rather than globally: the
//! accessors below turn absent or malformed values into [`CommandFailure`]s
//! whose message names the offending parameter.

use crate::error::CommandFailure;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar parameter value as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(value.into())
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

/// A command name plus its parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    command: String,
    #[serde(default)]
    params: BTreeMap<String, ParamValue>,
}

impl CommandRequest {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            params: BTreeMap::new(),
        }
    }

    /// Builder-style parameter insertion.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Fails with the first of `names` that is absent.
    pub fn require_present(&self, names: &[&str]) -> Result<(), CommandFailure> {
        match names.iter().find(|name| !self.contains(name)) {
            Some(missing) => Err(CommandFailure::missing(missing)),
            None => Ok(()),
        }
    }

    /// Any scalar rendered as text, or `None` if absent.
    pub fn optional_text(&self, name: &str) -> Option<String> {
        self.params.get(name).map(ToString::to_string)
    }

    pub fn require_text(&self, name: &str) -> Result<String, CommandFailure> {
        self.optional_text(name)
            .ok_or_else(|| CommandFailure::missing(name))
    }

    /// Integers are accepted natively or as decimal strings.
    pub fn require_int(&self, name: &str) -> Result<i64, CommandFailure> {
        match self.params.get(name) {
            None => Err(CommandFailure::missing(name)),
            Some(ParamValue::Integer(i)) => Ok(*i),
            Some(ParamValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| CommandFailure::invalid(name, e)),
            Some(ParamValue::Bool(_)) => Err(CommandFailure::invalid(name, "expected an integer")),
        }
    }

    pub fn require_u32(&self, name: &str) -> Result<u32, CommandFailure> {
        let value = self.require_int(name)?;
        u32::try_from(value).map_err(|_| CommandFailure::invalid(name, format!("{value} is out of range")))
    }

    pub fn require_u16(&self, name: &str) -> Result<u16, CommandFailure> {
        let value = self.require_int(name)?;
        u16::try_from(value).map_err(|_| CommandFailure::invalid(name, format!("{value} is out of range")))
    }

    pub fn require_u64(&self, name: &str) -> Result<u64, CommandFailure> {
        let value = self.require_int(name)?;
        u64::try_from(value).map_err(|_| CommandFailure::invalid(name, format!("{value} is out of range")))
    }
}
