//! Signatures derived from a `JsonSchema` argument struct
//!
//! For functions that take their arguments as one deserializable struct
//! instead of separate parameters.

use schemars::{schema_for, JsonSchema};
use serde_json::{Map, Value};

use super::signature::{FunctionSignature, ParamDefault, ParamSignature};
use crate::types::SchemaType;

/// Build a signature whose parameters are the fields of `T`
///
/// Field doc comments become parameter descriptions. Fields outside the
/// struct's `required` list without a declared default get a `null` default.
///
/// # Example
///
/// ```
/// use llm_functools::schema::signature_from_args;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct CalculatorArgs {
///     /// The operation to perform
///     operation: String,
///     /// First operand
///     a: f64,
///     /// Second operand
///     b: f64,
/// }
///
/// let signature = signature_from_args::<CalculatorArgs>(
///     "calculator",
///     "Perform basic arithmetic operations",
/// );
/// assert_eq!(signature.params.len(), 3);
/// assert_eq!(signature.params[1].description.as_deref(), Some("First operand"));
/// ```
pub fn signature_from_args<T: JsonSchema>(
    name: impl Into<String>,
    description: impl Into<String>,
) -> FunctionSignature {
    let mut signature = FunctionSignature::new(name).with_description(description);

    let root = match serde_json::to_value(schema_for!(T)) {
        Ok(Value::Object(root)) => root,
        Ok(_) => return signature,
        Err(err) => {
            tracing::warn!(error = %err, "failed to encode argument schema");
            return signature;
        }
    };
    let definitions = root.get("definitions").and_then(Value::as_object);
    let required: Vec<&str> = root
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = root.get("properties").and_then(Value::as_object) else {
        return signature;
    };
    for (name, property) in properties {
        let Some(property) = property.as_object() else {
            continue;
        };
        let resolved = resolve(property, definitions);
        let lookup = |key: &str| property.get(key).or_else(|| resolved.and_then(|r| r.get(key)));

        let mut param = ParamSignature::new(name.clone());
        param.schema_type = lookup("type").and_then(type_tag);
        param.description = lookup("description")
            .and_then(Value::as_str)
            .map(str::to_string);
        param.default = match property.get("default") {
            Some(value) => ParamDefault::Value(value.clone()),
            None if required.contains(&name.as_str()) => ParamDefault::None,
            None => ParamDefault::Value(Value::Null),
        };
        signature.params.push(param);
    }
    signature
}

/// Follow a `$ref`, directly or through a single-element `allOf`
fn resolve<'a>(
    property: &'a Map<String, Value>,
    definitions: Option<&'a Map<String, Value>>,
) -> Option<&'a Map<String, Value>> {
    let reference = property.get("$ref").or_else(|| {
        property
            .get("allOf")
            .and_then(Value::as_array)
            .filter(|all| all.len() == 1)
            .and_then(|all| all[0].get("$ref"))
    })?;
    let key = reference.as_str()?.strip_prefix("#/definitions/")?;
    definitions?.get(key)?.as_object()
}

/// `"integer"` or `["integer", "null"]`
fn type_tag(value: &Value) -> Option<SchemaType> {
    match value {
        Value::String(tag) => serde_json::from_value(Value::String(tag.clone())).ok(),
        Value::Array(tags) => tags
            .iter()
            .filter(|tag| tag.as_str() != Some("null"))
            .find_map(type_tag),
        _ => None,
    }
}
