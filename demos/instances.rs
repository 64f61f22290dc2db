//! Example: exposing the methods of shared instances
//!
//! Two weather services for different cities expose the same methods; each
//! is registered under its own owner token so calls reach the right one.
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
//! cargo run --example instances
//! ```

use std::sync::Arc;

use llm_functools::openai::{CallStyle, ChatClient, Conversation, FunctionCallingService};
use llm_functools::{tools, FunctionRegistry, Role};
use serde_json::json;
use tracing_subscriber::EnvFilter;

struct WeatherService {
    location: String,
}

#[tools]
impl WeatherService {
    /// Get the current weather in this service's location
    ///
    /// # Arguments
    ///
    /// * `unit` - Temperature unit
    pub fn get_current_weather(&self, #[one_of("fahrenheit", "celsius")] unit: String) -> String {
        json!({
            "location": self.location,
            "temperature": "72",
            "unit": unit,
            "forecast": ["sunny", "windy"],
        })
        .to_string()
    }

    /// Get the weather forecast for the next day in this service's location
    pub fn get_weather_next_day(&self, #[default("fahrenheit")] unit: String) -> String {
        json!({
            "location": self.location,
            "temperature": "75",
            "unit": unit,
            "forecast": ["sunny", "windy"],
        })
        .to_string()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut registry = FunctionRegistry::new();
    registry.register_instances_all([
        (
            "boston",
            Arc::new(WeatherService {
                location: "Boston".to_string(),
            }),
        ),
        (
            "oslo",
            Arc::new(WeatherService {
                location: "Oslo".to_string(),
            }),
        ),
    ])?;
    println!("Registered: {}\n", registry.names().join(", "));

    let service = FunctionCallingService::new(ChatClient::from_env()?, registry)
        .with_style(CallStyle::Functions);

    for question in [
        "What's the weather like in Boston?",
        "What's the weather like in Oslo tomorrow?",
    ] {
        let mut conversation = Conversation::new();
        conversation.add_message(Role::User, question, None);
        service.run(&mut conversation).await?;
        println!("{}", conversation);
    }

    Ok(())
}
