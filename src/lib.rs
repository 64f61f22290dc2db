//! Expose plain Rust functions and methods to LLM function calling
//!
//! Register callables with a [`FunctionRegistry`], hand its schemas to the
//! model, and dispatch the model's reply back to the right function.
//!
//! ```
//! use llm_functools::{tool, FunctionRegistry};
//! use serde_json::json;
//!
//! /// Get the current weather in a given location
//! ///
//! /// # Arguments
//! ///
//! /// * `location` - The city and state, e.g. San Francisco, CA
//! #[tool]
//! fn get_current_weather(
//!     location: String,
//!     #[one_of("fahrenheit", "celsius")] unit: String,
//! ) -> String {
//!     json!({"location": location, "temperature": "72", "unit": unit}).to_string()
//! }
//!
//! fn main() {
//!     let mut registry = FunctionRegistry::new();
//!     registry.register(get_current_weather_tool::callable()).unwrap();
//!
//!     let schema = &registry.list_schemas(None)[0];
//!     assert_eq!(schema.description, "Get the current weather in a given location");
//!     assert_eq!(schema.parameters.required, vec!["location"]);
//!
//!     let response = json!({
//!         "choices": [{
//!             "message": {
//!                 "role": "assistant",
//!                 "content": null,
//!                 "function_call": {
//!                     "name": "get_current_weather",
//!                     "arguments": "{\"location\": \"Boston, MA\"}"
//!                 }
//!             }
//!         }]
//!     });
//!     let result = registry.dispatch_json(&response).unwrap().into_single().unwrap();
//!     assert_eq!(
//!         result,
//!         json!(r#"{"location":"Boston, MA","temperature":"72","unit":"fahrenheit"}"#)
//!     );
//! }
//! ```

extern crate self as llm_functools;

pub mod config;
pub mod error;
pub mod openai;
pub mod schema;
pub mod tools;
pub mod types;

pub use llm_functools_macros::{tool, tools};

pub use config::ExtractorConfig;
pub use error::{DispatchError, InvocationError, RegistryError};
pub use schema::{
    extract_metadata, DocstringExtractor, FunctionSignature, MetadataExtractor, ParamDefault,
    ParamSignature,
};
pub use tools::{
    Arguments, Callable, CallDirective, DispatchOutcome, FunctionRegistry, FunctionSpec,
    FunctionTool, MethodTool, ToolInstance,
};
pub use types::{ChatCompletionResponse, ChatMessage, Role, Schema, SchemaType, ToolDefinition};

/// Items the `#[tool]` and `#[tools]` expansions refer to
#[doc(hidden)]
pub mod __private {
    pub use crate::tools::callable::{fallible_output, into_output};
    pub use serde_json;
}
