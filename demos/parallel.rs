//! Example: parallel tool calls
//!
//! Asks about three cities at once; the model answers with one `tool_calls`
//! entry per city and every result is keyed by its call id.
//!
//! # Prerequisites
//!
//! Create a `.env` file in the project root with:
//! ```
//! OPENAI_API_KEY=sk-...
//! OPENAI_MODEL=gpt-3.5-turbo-1106
//! ```
//!
//! # Running
//!
//! ```bash
//! cargo run --example parallel
//! ```

use llm_functools::openai::{ChatClient, Conversation, FunctionCallingService};
use llm_functools::{register_tools, tool, FunctionRegistry, Role};
use serde_json::json;
use tracing_subscriber::EnvFilter;

/// Get the current weather in a given location
///
/// :param location: The city, e.g. Tokyo
/// :param unit: Temperature unit
#[tool]
fn get_current_weather(location: String, #[default("fahrenheit")] unit: String) -> String {
    let lower = location.to_lowercase();
    let (temperature, unit) = if lower.contains("tokyo") {
        ("10", "celsius".to_string())
    } else if lower.contains("san francisco") {
        ("72", "fahrenheit".to_string())
    } else {
        ("22", unit)
    };
    json!({"location": location, "temperature": temperature, "unit": unit}).to_string()
}

/// Get the local time in a given location
///
/// Args:
///     location: The city, e.g. Paris
#[tool]
fn get_local_time(location: String) -> String {
    format!("It is noon in {location}")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut registry = FunctionRegistry::new();
    register_tools!(registry, get_current_weather_tool, get_local_time_tool)?;

    let service = FunctionCallingService::new(ChatClient::from_env()?, registry);

    let mut conversation = Conversation::new();
    conversation.add_message(
        Role::User,
        "What's the weather like in Tokyo, Boston, and San Francisco?",
        None,
    );
    service.run(&mut conversation).await?;

    println!("{}", conversation);
    Ok(())
}
