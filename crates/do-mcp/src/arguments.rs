//! Typed access to `tools/call` arguments.

use serde_json::{Map, Value};

use digitalocean::DoError;

/// Arguments of a single tool call.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    inner: Map<String, Value>,
}

impl From<Map<String, Value>> for Arguments {
    fn from(inner: Map<String, Value>) -> Self {
        Self { inner }
    }
}

impl Arguments {
    /// Build from an optional JSON value; anything but an object is empty.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_object)
            .cloned()
            .map(Self::from)
            .unwrap_or_default()
    }

    fn present(&self, key: &str) -> Option<&Value> {
        self.inner.get(key).filter(|v| !v.is_null())
    }

    /// Required string argument.
    pub fn required_str(&self, key: &str) -> Result<String, DoError> {
        self.optional_str(key)?
            .ok_or_else(|| DoError::MissingArgument(key.to_string()))
    }

    /// Optional string argument.
    pub fn optional_str(&self, key: &str) -> Result<Option<String>, DoError> {
        match self.present(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(invalid(key, "string")),
        }
    }

    /// Required non-negative integer. Numeric strings are accepted.
    pub fn required_u64(&self, key: &str) -> Result<u64, DoError> {
        match self.present(key) {
            None => Err(DoError::MissingArgument(key.to_string())),
            Some(Value::Number(n)) => n.as_u64().ok_or_else(|| invalid(key, "integer")),
            Some(Value::String(s)) => s.trim().parse().map_err(|_| invalid(key, "integer")),
            Some(_) => Err(invalid(key, "integer")),
        }
    }

    /// Boolean with a default. Accepts JSON booleans and
    /// "true/false/yes/no/1/0" strings.
    pub fn bool_or(&self, key: &str, default: bool) -> Result<bool, DoError> {
        match self.present(key) {
            None => Ok(default),
            Some(Value::Bool(b)) => Ok(*b),
            Some(Value::String(s)) => match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(invalid(key, "boolean")),
            },
            Some(_) => Err(invalid(key, "boolean")),
        }
    }

    /// Optional list of strings; absent means empty.
    pub fn string_list(&self, key: &str) -> Result<Vec<String>, DoError> {
        match self.present(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| invalid(key, "array of strings"))
                })
                .collect(),
            Some(_) => Err(invalid(key, "array of strings")),
        }
    }
}

fn invalid(key: &str, expected: &'static str) -> DoError {
    DoError::InvalidArgument {
        name: key.to_string(),
        expected,
    }
}
