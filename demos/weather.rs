//! Example: single function call with the legacy `functions` style
//!
//! Registers `get_current_weather`, asks the model about Boston and
//! dispatches the `function_call` it returns.
//!
//! # Prerequisites
//!
//! Create a `.env` file in the project root with:
//! ```
//! OPENAI_API_KEY=sk-...
//! ```
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=llm_functools=debug cargo run --example weather
//! ```

use llm_functools::openai::{CallStyle, ChatClient, ChatProvider, ChatRequestBuilder};
use llm_functools::{tool, ChatMessage, FunctionRegistry};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Get the current weather in a given location
///
/// # Arguments
///
/// * `location` - The city and state, e.g. San Francisco, CA
/// * `unit` - Temperature unit
#[tool]
fn get_current_weather(
    location: String,
    #[one_of("fahrenheit", "celsius")] unit: String,
) -> String {
    json!({
        "location": location,
        "temperature": "72",
        "unit": unit,
        "forecast": ["sunny", "windy"],
    })
    .to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = ChatClient::from_env()?;

    let mut registry = FunctionRegistry::new();
    registry.register(get_current_weather_tool::callable())?;

    println!("=== Weather Example ===\n");
    println!("Schemas:\n{}\n", serde_json::to_string_pretty(&registry.list_schemas(None))?);

    let request = ChatRequestBuilder::new(client.default_model())
        .with_message(ChatMessage::user("What's the weather like in Boston?"))
        .with_registry(&registry)
        .with_style(CallStyle::Functions)
        .build();
    let response = client.complete(request).await?;

    match registry.dispatch(&response) {
        Ok(outcome) => println!("Function result: {:?}", outcome),
        Err(e) => println!("No function was called: {}", e),
    }

    Ok(())
}
