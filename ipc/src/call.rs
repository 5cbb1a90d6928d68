//! Calls, responses and replies

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Argument map of a call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// String argument; `None` when missing or not a string
    pub fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Boolean argument; `None` when missing or not a boolean
    pub fn boolean(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Boolean argument defaulting to false when missing or mistyped
    pub fn flag(&self, key: &str) -> bool {
        self.boolean(key).unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Arguments, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Arguments>::deserialize(deserializer)?.unwrap_or_default())
}

/// One method invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Correlation id echoed in the reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Method name
    pub method: String,
    /// Keyed arguments
    #[serde(default, deserialize_with = "null_as_empty")]
    pub arguments: Arguments,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            id: None,
            method: method.into(),
            arguments: Arguments::new(),
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Adds an argument
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments = self.arguments.with(key, value);
        self
    }
}

/// Error codes for structured channel failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidRequest,
    Internal,
}

/// Structured channel error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl MethodError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Result of one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum MethodResponse {
    /// Method ran; the value may be `null` or `false` for absent results
    Success(Value),
    /// Request could not be understood
    Error(MethodError),
    /// Unknown method name
    NotImplemented,
}

impl MethodResponse {
    /// Absent result
    pub fn absent() -> Self {
        MethodResponse::Success(Value::Null)
    }

    pub fn from_bool(value: bool) -> Self {
        MethodResponse::Success(Value::Bool(value))
    }

    /// Serializes an optional value; `None` (or an unserializable value) is absent
    pub fn from_option<T: Serialize>(value: Option<T>) -> Self {
        value
            .and_then(|v| serde_json::to_value(v).ok())
            .map_or_else(Self::absent, MethodResponse::Success)
    }

    /// Success value, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            MethodResponse::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success(_))
    }
}

/// A response tagged with the id of the call it answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub response: MethodResponse,
}

impl MethodReply {
    pub fn new(id: Option<u64>, response: MethodResponse) -> Self {
        Self { id, response }
    }
}
