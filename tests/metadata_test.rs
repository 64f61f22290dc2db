mod common;

use std::collections::HashMap;
use std::sync::Arc;

use llm_functools::{extract_metadata, tool, FunctionRegistry, SchemaType};
use pretty_assertions::assert_eq;
use serde_json::json;

/// Search a product catalogue
///
/// Parameters
/// ----------
/// query : str
///     Free text to match against
///     product names
/// tags : list
///     Tags every result must carry
#[tool(description = "Search products")]
fn search_products(
    query: String,
    tags: Vec<String>,
    #[default(10)] limit: u32,
    #[default(null)] category: Option<String>,
    filters: HashMap<String, String>,
    exact: bool,
    #[default(0.5)] min_score: f64,
) -> Vec<String> {
    let _ = (tags, limit, category, filters, exact, min_score);
    vec![query]
}

#[tool(name = "lookup-order")]
fn lookup_order(order_id: u64) -> Result<String, std::io::Error> {
    Ok(format!("order {order_id}"))
}

#[test]
fn test_undocumented_function_schema() {
    let schema = extract_metadata(&common::get_current_weather_tool::callable());

    assert_eq!(
        serde_json::to_value(&schema).unwrap(),
        json!({
            "name": "get_current_weather",
            "description": "get_current_weather",
            "parameters": {
                "type": "object",
                "properties": {
                    "location": {"type": "string", "description": "location"},
                    "unit": {
                        "type": "string",
                        "description": "unit",
                        "default": "fahrenheit"
                    }
                },
                "required": ["location"]
            }
        })
    );
}

#[test]
fn test_documented_function_schema() {
    let schema = extract_metadata(&common::get_current_time_tool::callable());

    assert_eq!(schema.description, "Get the current time in a given timezone");
    assert_eq!(
        schema.parameters.properties["timezone"].description,
        "IANA timezone name, e.g. Europe/Oslo"
    );
    assert_eq!(schema.parameters.required, vec!["timezone"]);
}

#[test]
fn test_literal_set_becomes_enum() {
    let schema = extract_metadata(&common::convert_temperature_tool::callable());

    let target = &schema.parameters.properties["target"];
    assert_eq!(target.enum_values, Some(vec![json!("celsius"), json!("fahrenheit")]));
    assert_eq!(target.default, Some(json!("celsius")));
    assert_eq!(target.description, "Unit to convert to");
    assert_eq!(schema.parameters.properties["value"].kind, SchemaType::Number);
    assert_eq!(schema.parameters.required, vec!["value"]);
}

#[test]
fn test_types_defaults_and_numpy_docs() {
    let schema = extract_metadata(&search_products_tool::callable());

    assert_eq!(schema.name, "search_products");
    assert_eq!(schema.description, "Search products");
    assert_eq!(schema.parameters.properties.len(), 7);
    assert_eq!(schema.parameters.required, vec!["query", "tags", "filters", "exact"]);

    let kinds: Vec<(&str, SchemaType)> = schema
        .parameters
        .properties
        .iter()
        .map(|(name, property)| (name.as_str(), property.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("query", SchemaType::String),
            ("tags", SchemaType::Array),
            ("limit", SchemaType::Integer),
            ("category", SchemaType::String),
            ("filters", SchemaType::Object),
            ("exact", SchemaType::Boolean),
            ("min_score", SchemaType::Number),
        ]
    );

    let properties = &schema.parameters.properties;
    assert_eq!(properties["query"].description, "Free text to match against product names");
    assert_eq!(properties["tags"].description, "Tags every result must carry");
    assert_eq!(properties["limit"].description, "limit");
    assert_eq!(properties["limit"].default, Some(json!(10)));
    assert_eq!(properties["category"].default, Some(json!(null)));
    assert_eq!(
        serde_json::to_value(&properties["category"]).unwrap()["default"],
        json!(null)
    );
    assert!(serde_json::to_value(&properties["query"]).unwrap().get("default").is_none());
}

#[test]
fn test_renamed_tool_and_fallible_output() {
    assert_eq!(lookup_order_tool::NAME, "lookup-order");

    let mut registry = FunctionRegistry::new();
    registry.register(lookup_order_tool::callable()).unwrap();

    assert_eq!(registry.list_schemas(None)[0].name, "lookup-order");
    assert_eq!(
        registry.call("lookup-order", json!({"order_id": 42})).unwrap(),
        json!("order 42")
    );
}

#[test]
fn test_method_schema_from_google_docs() {
    let mut registry = FunctionRegistry::new();
    registry
        .register_instance("duck", Arc::new(common::Duck::new("quack")))
        .unwrap();

    let schema = &registry.list_schemas(None)[0];
    assert_eq!(schema.name, "duck__quack");
    assert_eq!(schema.description, "Make the duck quack");
    let times = &schema.parameters.properties["times"];
    assert_eq!(times.kind, SchemaType::Integer);
    assert_eq!(times.description, "How many times to quack");
    assert_eq!(times.default, Some(json!(1)));
    assert!(schema.parameters.required.is_empty());
}

#[test]
fn test_hidden_and_skipped_methods_are_not_exposed() {
    let mut registry = FunctionRegistry::new();
    registry
        .register_instance("duck", Arc::new(common::Duck::new("quack")))
        .unwrap();
    registry
        .register_instance(
            "svc",
            Arc::new(common::WeatherService {
                location: "Oslo".to_string(),
            }),
        )
        .unwrap();

    assert_eq!(
        registry.names(),
        vec!["duck__quack", "svc__get_current_weather", "svc__get_weather_next_day"]
    );
}

#[test]
fn test_tool_schemas_wrap_function_schemas() {
    let registry = FunctionRegistry::from_callables([
        common::get_current_weather_tool::callable(),
        common::get_current_time_tool::callable(),
    ])
    .unwrap();

    let tools = serde_json::to_value(registry.list_tool_schemas(None)).unwrap();
    let functions = serde_json::to_value(registry.list_schemas(None)).unwrap();

    assert_eq!(tools[0]["type"], "function");
    assert_eq!(tools[0]["function"], functions[0]);
    assert_eq!(tools[1]["function"]["name"], "get_current_time");
}
