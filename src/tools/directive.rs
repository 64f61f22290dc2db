//! Call directives decoded from a model response

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::DispatchError;
use crate::types::{ChatCompletionResponse, ChatMessage, FunctionCall};

/// One entry of a parallel directive
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// What the model asked to be called
#[derive(Debug, Clone, PartialEq)]
pub enum CallDirective {
    /// A legacy `function_call`
    Single { name: String, arguments: Value },
    /// A `tool_calls` list
    Parallel(Vec<ParallelCall>),
}

impl CallDirective {
    /// Decode the directive carried by the first choice
    pub fn from_response(response: &ChatCompletionResponse) -> Result<Self, DispatchError> {
        let message = response
            .message()
            .ok_or_else(|| DispatchError::MalformedResponse("response has no choices".to_string()))?;
        Self::from_message(message)
    }

    /// Decode the directive carried by an assistant message
    ///
    /// `function_call` wins when both forms are present. Tool call ids must
    /// be unique within the message.
    pub fn from_message(message: &ChatMessage) -> Result<Self, DispatchError> {
        if let Some(call) = &message.function_call {
            return Ok(CallDirective::Single {
                name: call.name.clone(),
                arguments: parse_arguments(call)?,
            });
        }

        match &message.tool_calls {
            Some(calls) if !calls.is_empty() => {
                let mut seen = HashSet::with_capacity(calls.len());
                calls
                    .iter()
                    .map(|call| {
                        if !seen.insert(call.id.as_str()) {
                            return Err(DispatchError::MalformedResponse(format!(
                                "duplicate tool call id '{}'",
                                call.id
                            )));
                        }
                        Ok(ParallelCall {
                            id: call.id.clone(),
                            name: call.function.name.clone(),
                            arguments: parse_arguments(&call.function)?,
                        })
                    })
                    .collect::<Result<Vec<_>, DispatchError>>()
                    .map(CallDirective::Parallel)
            }
            Some(_) => Err(DispatchError::MalformedResponse(
                "tool_calls is empty".to_string(),
            )),
            None => Err(DispatchError::MalformedResponse(
                "message carries neither function_call nor tool_calls".to_string(),
            )),
        }
    }

    /// Names of every function the directive targets
    pub fn names(&self) -> Vec<&str> {
        match self {
            CallDirective::Single { name, .. } => vec![name.as_str()],
            CallDirective::Parallel(calls) => calls.iter().map(|call| call.name.as_str()).collect(),
        }
    }
}

fn parse_arguments(call: &FunctionCall) -> Result<Value, DispatchError> {
    if call.arguments.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(&call.arguments).map_err(|source| DispatchError::InvalidArguments {
        name: call.name.clone(),
        source,
    })
}

/// Result of dispatching a directive
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The single function's return value
    Single(Value),
    /// Return values keyed by tool call id
    Parallel(HashMap<String, Value>),
}

impl DispatchOutcome {
    /// The single result, or `None` for a parallel outcome
    pub fn into_single(self) -> Option<Value> {
        match self {
            DispatchOutcome::Single(value) => Some(value),
            DispatchOutcome::Parallel(_) => None,
        }
    }

    /// Results keyed by call id, or `None` for a single outcome
    pub fn into_parallel(self) -> Option<HashMap<String, Value>> {
        match self {
            DispatchOutcome::Single(_) => None,
            DispatchOutcome::Parallel(results) => Some(results),
        }
    }
}
