//! Chat-completions request construction

use serde_json::{json, Value};

use crate::tools::FunctionRegistry;
use crate::types::{ChatCompletionRequest, ChatMessage, Schema, ToolDefinition};

/// Which wire form advertises the functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallStyle {
    /// Legacy `functions` + `function_call`
    Functions,
    /// `tools` + `tool_choice`, allowing parallel calls
    #[default]
    Tools,
}

/// Whether and which function the model should call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallMode {
    /// The model decides
    #[default]
    Auto,
    /// The model must not call a function
    None,
    /// The model must call this function
    Named(String),
}

impl CallMode {
    fn render(&self, style: CallStyle) -> Value {
        match (self, style) {
            (CallMode::Auto, _) => json!("auto"),
            (CallMode::None, _) => json!("none"),
            (CallMode::Named(name), CallStyle::Functions) => json!({ "name": name }),
            (CallMode::Named(name), CallStyle::Tools) => {
                json!({ "type": "function", "function": { "name": name } })
            }
        }
    }
}

/// Builder for [`ChatCompletionRequest`]
#[derive(Debug, Clone, Default)]
pub struct ChatRequestBuilder {
    model: String,
    messages: Vec<ChatMessage>,
    schemas: Vec<Schema>,
    style: CallStyle,
    mode: CallMode,
}

impl ChatRequestBuilder {
    /// Start a request; an empty model lets the client pick its default
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }

    /// Append messages to the request
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Append one message to the request
    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Advertise explicit schemas
    pub fn with_schemas(mut self, schemas: Vec<Schema>) -> Self {
        self.schemas = schemas;
        self
    }

    /// Advertise every function in `registry`
    pub fn with_registry(self, registry: &FunctionRegistry) -> Self {
        self.with_schemas(registry.list_schemas(None))
    }

    /// Choose between the "functions" and "tools" request fields
    pub fn with_style(mut self, style: CallStyle) -> Self {
        self.style = style;
        self
    }

    /// Set how the model may choose a function
    pub fn with_mode(mut self, mode: CallMode) -> Self {
        self.mode = mode;
        self
    }

    /// Assemble the request body
    pub fn build(self) -> ChatCompletionRequest {
        let mut request = ChatCompletionRequest {
            model: self.model,
            messages: self.messages,
            functions: None,
            function_call: None,
            tools: None,
            tool_choice: None,
        };
        if self.schemas.is_empty() {
            return request;
        }

        let choice = self.mode.render(self.style);
        match self.style {
            CallStyle::Functions => {
                request.functions = Some(self.schemas);
                request.function_call = Some(choice);
            }
            CallStyle::Tools => {
                request.tools = Some(self.schemas.into_iter().map(ToolDefinition::from).collect());
                request.tool_choice = Some(choice);
            }
        }
        request
    }
}
