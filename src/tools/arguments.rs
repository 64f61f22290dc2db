//! Keyword arguments bound to a callable's parameters

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::InvocationError;
use crate::schema::FunctionSignature;

/// Keyword arguments decoded from a call directive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Create an empty argument set
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a decoded JSON value; anything but an object is rejected
    pub fn from_value(value: Value) -> Result<Self, InvocationError> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(InvocationError::NotAnObject(json_kind(&other).to_string())),
        }
    }

    /// Add or replace an argument
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(name.into(), value)
    }

    /// Look up an argument by parameter name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Check if an argument was supplied for `name`
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of supplied arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no arguments were supplied
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check the arguments against `signature` and fill in defaults
    ///
    /// Unknown keys are reported before missing ones, and nothing is modified
    /// unless binding succeeds.
    pub fn bind(&mut self, signature: &FunctionSignature) -> Result<(), InvocationError> {
        let unexpected: Vec<String> = self
            .values
            .keys()
            .filter(|key| signature.param(key).is_none())
            .cloned()
            .collect();
        if !unexpected.is_empty() {
            return Err(InvocationError::UnexpectedArguments(unexpected));
        }

        if let Some(missing) = signature
            .params
            .iter()
            .find(|param| param.is_required() && !self.values.contains_key(&param.name))
        {
            return Err(InvocationError::MissingArgument(missing.name.clone()));
        }

        for param in &signature.params {
            if self.values.contains_key(&param.name) {
                continue;
            }
            if let Some(default) = param.default.value() {
                self.values.insert(param.name.clone(), default.clone());
            }
        }
        Ok(())
    }

    /// Remove an argument and deserialize it
    pub fn take<T: DeserializeOwned>(&mut self, name: &str) -> Result<T, InvocationError> {
        let value = self
            .values
            .remove(name)
            .ok_or_else(|| InvocationError::MissingArgument(name.to_string()))?;
        serde_json::from_value(value).map_err(|source| InvocationError::InvalidArgument {
            name: name.to_string(),
            source,
        })
    }

    /// Remaining arguments as a JSON object
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
