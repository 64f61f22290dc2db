//! Error types for registration, dispatch and invocation

use thiserror::Error;

/// Errors raised while registering callables
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The value cannot be exposed as a tool
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A callable with the same exposed name is already registered
    #[error("Function \"{0}\" is already registered")]
    DuplicateName(String),
}

/// Errors raised while dispatching a model response
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The directive names a function the registry does not know
    #[error("Function \"{0}\" is not registered with the orchestrator")]
    UnknownFunction(String),

    /// The response carries no recognised call directive
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The `arguments` string is not valid JSON
    #[error("Invalid arguments for \"{name}\": {source}")]
    InvalidArguments {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The callable itself rejected the call
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

/// Failures raised by a callable when bound to JSON arguments or run
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Arguments decoded to something other than a JSON object
    #[error("arguments must be a JSON object, got {0}")]
    NotAnObject(String),

    /// A parameter without a default was not supplied
    #[error("missing required argument: '{0}'")]
    MissingArgument(String),

    /// Keys that match no declared parameter
    #[error("got unexpected keyword argument(s): {}", .0.join(", "))]
    UnexpectedArguments(Vec<String>),

    /// A supplied value does not fit the parameter's type
    #[error("invalid value for argument '{name}': {source}")]
    InvalidArgument {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The arguments do not deserialize into the tool's argument struct
    #[error("failed to deserialize arguments: {0}")]
    InvalidArguments(#[source] serde_json::Error),

    /// The function's return value could not be encoded as JSON
    #[error("failed to serialize result: {0}")]
    Output(#[source] serde_json::Error),

    /// The function returned an error of its own
    #[error("{0}")]
    Failed(String),
}
