#![allow(dead_code)]

use llm_functools::{tool, tools};
use serde_json::{json, Value};

#[tool]
pub fn get_current_weather(location: String, #[default("fahrenheit")] unit: String) -> String {
    weather_report(&location, &unit)
}

/// Get the current time in a given timezone
///
/// # Arguments
///
/// * `timezone` - IANA timezone name, e.g. Europe/Oslo
#[tool]
pub fn get_current_time(timezone: String) -> String {
    format!("12:00 in {timezone}")
}

/// Convert a temperature between units
///
/// :param value: Temperature to convert
/// :param target: Unit to convert to
#[tool]
pub fn convert_temperature(value: f64, #[one_of("celsius", "fahrenheit")] target: String) -> Result<f64, String> {
    match target.as_str() {
        "celsius" => Ok((value - 32.0) * 5.0 / 9.0),
        "fahrenheit" => Ok(value * 9.0 / 5.0 + 32.0),
        other => Err(format!("unknown unit: {other}")),
    }
}

/// The JSON string `get_current_weather` returns
pub fn weather_report(location: &str, unit: &str) -> String {
    json!({
        "location": location,
        "temperature": "72",
        "unit": unit,
        "forecast": ["sunny", "windy"],
    })
    .to_string()
}

pub struct Duck {
    pub sound: String,
}

#[tools]
impl Duck {
    pub fn new(sound: &str) -> Self {
        Self {
            sound: sound.to_string(),
        }
    }

    /// Make the duck quack
    ///
    /// Args:
    ///     times (int): How many times to quack
    pub fn quack(&self, #[default(1)] times: usize) -> String {
        vec![self.sound.as_str(); times].join(" ")
    }

    pub fn _preen(&self) -> bool {
        true
    }

    fn waddle(&self) -> bool {
        true
    }
}

pub struct WeatherService {
    pub location: String,
}

#[tools]
impl WeatherService {
    /// Get the current weather in the service's location
    pub fn get_current_weather(&self, #[default("fahrenheit")] unit: String) -> String {
        weather_report(&self.location, &unit)
    }

    /// Get the weather forecast for the next day
    #[tool(name = "get_weather_next_day")]
    pub fn tomorrow(&self, #[default("fahrenheit")] unit: String) -> String {
        json!({"location": self.location, "temperature": "75", "unit": unit}).to_string()
    }

    #[tool(skip)]
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// A response carrying a legacy `function_call`
pub fn function_call_response(name: &str, arguments: &str) -> Value {
    json!({
        "id": "chatcmpl-123",
        "model": "gpt-3.5-turbo-0613",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "function_call": {"name": name, "arguments": arguments}
            },
            "finish_reason": "function_call"
        }]
    })
}

/// A response carrying parallel `tool_calls` of `(id, name, arguments)`
pub fn tool_calls_response(calls: &[(&str, &str, &str)]) -> Value {
    let tool_calls: Vec<Value> = calls
        .iter()
        .map(|(id, name, arguments)| {
            json!({
                "id": id,
                "type": "function",
                "function": {"name": name, "arguments": arguments}
            })
        })
        .collect();
    json!({
        "id": "chatcmpl-456",
        "model": "gpt-3.5-turbo-1106",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": null, "tool_calls": tool_calls},
            "finish_reason": "tool_calls"
        }]
    })
}

/// A plain text reply
pub fn text_response(content: &str) -> Value {
    json!({
        "id": "chatcmpl-789",
        "model": "gpt-3.5-turbo-0613",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}
