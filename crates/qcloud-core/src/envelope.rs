//! The JSON envelope wrapping every API response.
//!
//! Every payload is an object carrying `success` (absent means `true`),
//! optionally `errors` and optionally `status`. A `status` of `"loading"`
//! marks a placeholder whose artifact is still materializing server-side.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const LOADING_STATUS: &str = "loading";
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Decoded response body, kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Envelope(Value);

impl Envelope {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn success(&self) -> bool {
        self.0
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Reported error messages; non-string entries are rendered as JSON.
    pub fn errors(&self) -> Vec<String> {
        match self.0.get("errors") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(message) => message.clone(),
                    other => other.to_string(),
                })
                .collect(),
            Some(Value::String(message)) => vec![message.clone()],
            _ => Vec::new(),
        }
    }

    /// First reported error, or the generic marker when none was given.
    pub fn first_error(&self) -> String {
        self.errors()
            .into_iter()
            .next()
            .unwrap_or_else(|| String::from(UNKNOWN_ERROR))
    }

    pub fn status(&self) -> Option<&str> {
        self.0.get("status").and_then(Value::as_str)
    }

    pub fn is_loading(&self) -> bool {
        self.status() == Some(LOADING_STATUS)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.0)
    }
}

impl From<Value> for Envelope {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
