//! Metadata extraction configuration

use serde::{Deserialize, Serialize};

use crate::types::SchemaType;

/// Separator placed between an owner token and a method name
pub const DEFAULT_OWNER_SEPARATOR: &str = "__";

/// Parameters controlling how callables are turned into schemas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Type tag used for absent or unrecognised parameter types
    pub fallback_type: SchemaType,
    /// Joins an instance's owner token and its method name
    pub owner_separator: String,
}

impl ExtractorConfig {
    /// Set the fallback type tag
    pub fn with_fallback_type(mut self, fallback_type: SchemaType) -> Self {
        self.fallback_type = fallback_type;
        self
    }

    /// Set the owner/method separator
    pub fn with_owner_separator(mut self, separator: impl Into<String>) -> Self {
        self.owner_separator = separator.into();
        self
    }

    /// Build the exposed name of a method bound to `owner`
    pub fn bound_name(&self, owner: &str, method: &str) -> String {
        format!("{}{}{}", owner, self.owner_separator, method)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            fallback_type: SchemaType::String,
            owner_separator: DEFAULT_OWNER_SEPARATOR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ExtractorConfig::default();
        assert_eq!(config.fallback_type, SchemaType::String);
        assert_eq!(config.owner_separator, "__");
    }

    #[test]
    fn test_config_builder() {
        let config = ExtractorConfig::default()
            .with_fallback_type(SchemaType::Object)
            .with_owner_separator("-");
        assert_eq!(config.fallback_type, SchemaType::Object);
        assert_eq!(config.bound_name("duck1", "quack"), "duck1-quack");
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"{"fallback_type":"number","owner_separator":"::"}"#;
        let config: ExtractorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.fallback_type, SchemaType::Number);
        assert_eq!(config.bound_name("a", "b"), "a::b");
    }
}
