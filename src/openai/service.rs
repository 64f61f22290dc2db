//! One function-calling round trip against a chat provider

use serde_json::Value;

use super::client::ChatProvider;
use super::conversation::Conversation;
use super::error::ClientError;
use super::request::{CallStyle, ChatRequestBuilder};
use crate::tools::{CallDirective, DispatchOutcome, FunctionRegistry};
use crate::types::{ChatCompletionResponse, ChatMessage};

/// Sends a conversation with the registry's schemas and answers the model's
/// function calls
pub struct FunctionCallingService<P> {
    provider: P,
    registry: FunctionRegistry,
    style: CallStyle,
}

impl<P: ChatProvider> FunctionCallingService<P> {
    /// Create a service over `provider` using the tools in `registry`
    pub fn new(provider: P, registry: FunctionRegistry) -> Self {
        Self {
            provider,
            registry,
            style: CallStyle::default(),
        }
    }

    /// Choose the calling style for the first request
    pub fn with_style(mut self, style: CallStyle) -> Self {
        self.style = style;
        self
    }

    /// The registry dispatching the model's calls
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// The underlying chat provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one round trip
    ///
    /// If the reply names functions, they are dispatched, their results are
    /// appended to `conversation` and a follow-up request is sent; that
    /// reply is returned. Otherwise the first reply is returned. The
    /// returned reply's message is appended to `conversation` either way.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
    ) -> Result<ChatCompletionResponse, ClientError> {
        let request = ChatRequestBuilder::new(self.provider.default_model())
            .with_messages(conversation.messages().iter().cloned())
            .with_registry(&self.registry)
            .with_style(self.style)
            .build();
        let response = self.provider.complete(request).await?;

        let Some(message) = response.message().filter(|message| has_directive(message)).cloned()
        else {
            record_reply(conversation, &response);
            return Ok(response);
        };

        let directive = CallDirective::from_message(&message)?;
        let outcome = self.registry.dispatch_directive(directive.clone())?;
        conversation.push(message);
        append_results(conversation, directive, outcome);

        let follow_up = ChatRequestBuilder::new(self.provider.default_model())
            .with_messages(conversation.messages().iter().cloned())
            .build();
        let response = self.provider.complete(follow_up).await?;
        record_reply(conversation, &response);
        Ok(response)
    }
}

fn has_directive(message: &ChatMessage) -> bool {
    message.function_call.is_some()
        || message
            .tool_calls
            .as_ref()
            .is_some_and(|calls| !calls.is_empty())
}

fn append_results(conversation: &mut Conversation, directive: CallDirective, outcome: DispatchOutcome) {
    match (directive, outcome) {
        (CallDirective::Single { name, .. }, DispatchOutcome::Single(value)) => {
            conversation.push(ChatMessage::function_result(name, render(&value)));
        }
        (CallDirective::Parallel(calls), DispatchOutcome::Parallel(mut results)) => {
            for call in calls {
                if let Some(value) = results.remove(&call.id) {
                    conversation.push(ChatMessage::tool_result(call.id, render(&value)));
                }
            }
        }
        _ => {}
    }
}

fn record_reply(conversation: &mut Conversation, response: &ChatCompletionResponse) {
    if let Some(message) = response.message() {
        conversation.push(message.clone());
    }
}

/// Function results are sent back as text
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
