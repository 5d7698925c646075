//! Named wrapper specifications and the invocations that select them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::WrapperSpec;
use crate::error::{Result, WrapError};

/// Canonical wrapper specifications, keyed by wrapper name
/// (e.g. `"Navigator.prototype.deviceMemory"`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrapperRegistry {
    wrappers: BTreeMap<String, WrapperSpec>,
}

impl WrapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a registry from a JSON object of `name -> spec`.
    ///
    /// Entries are parsed independently: a malformed entry is logged and
    /// skipped so the rest of the configuration stays usable.
    pub fn from_value(value: Value) -> Result<Self> {
        let entries = match value {
            Value::Object(entries) => entries,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(WrapError::Config(format!(
                    "wrapper registry must be an object, got {}",
                    json_type(&other)
                )))
            }
        };

        let mut registry = Self::new();
        for (name, raw) in entries {
            match serde_json::from_value::<WrapperSpec>(raw) {
                Ok(spec) => registry.insert(name, spec),
                Err(e) => log::warn!("Skipping wrapper {}: {}", name, e),
            }
        }
        log::debug!("Loaded {} wrapper specifications", registry.len());
        Ok(registry)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, spec: WrapperSpec) {
        self.wrappers.insert(name.into(), spec);
    }

    pub fn get(&self, name: &str) -> Result<&WrapperSpec> {
        self.wrappers
            .get(name)
            .ok_or_else(|| WrapError::UnknownWrapper(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.wrappers.contains_key(name)
    }

    /// Registered wrapper names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.wrappers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.wrappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wrappers.is_empty()
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One `[name, ...args]` entry of an assembly request.
///
/// The arguments are handed to the compiled fragment's enclosure and are
/// visible to wrapper code as `args`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Value>", into = "Vec<Value>")]
pub struct WrapperCall {
    pub kind: String,
    pub args: Vec<Value>,
}

impl WrapperCall {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args(kind: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            kind: kind.into(),
            args,
        }
    }

    /// Arguments as a JavaScript argument list, e.g. `2, "strict"`.
    pub fn args_literal(&self) -> String {
        self.args
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TryFrom<Vec<Value>> for WrapperCall {
    type Error = WrapError;

    fn try_from(mut entry: Vec<Value>) -> Result<Self> {
        if entry.is_empty() {
            return Err(WrapError::InvalidInvocation("empty invocation".into()));
        }
        match entry.remove(0) {
            Value::String(kind) => Ok(Self { kind, args: entry }),
            other => Err(WrapError::InvalidInvocation(format!(
                "wrapper name must be a string, got {}",
                json_type(&other)
            ))),
        }
    }
}

impl TryFrom<Value> for WrapperCall {
    type Error = WrapError;

    fn try_from(entry: Value) -> Result<Self> {
        match entry {
            Value::Array(items) => Self::try_from(items),
            Value::String(kind) => Ok(Self::new(kind)),
            other => Err(WrapError::InvalidInvocation(format!(
                "invocation must be an array, got {}",
                json_type(&other)
            ))),
        }
    }
}

impl From<WrapperCall> for Vec<Value> {
    fn from(call: WrapperCall) -> Self {
        let mut entry = Vec::with_capacity(call.args.len() + 1);
        entry.push(Value::String(call.kind));
        entry.extend(call.args);
        entry
    }
}
