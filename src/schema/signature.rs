//! Introspection records supplied by every callable
//!
//! The `#[tool]` and `#[tools]` macros generate these from a function's
//! signature and doc comments. Callables that cannot use the macros build
//! them by hand:
//!
//! ```
//! use llm_functools::{FunctionSignature, ParamSignature};
//! use serde_json::json;
//!
//! let signature = FunctionSignature::new("get_current_weather")
//!     .with_doc("Get the current weather in a given location")
//!     .with_param(ParamSignature::new("location").with_type("String"))
//!     .with_param(
//!         ParamSignature::new("unit")
//!             .with_type("String")
//!             .with_one_of(vec![json!("fahrenheit"), json!("celsius")]),
//!     );
//!
//! assert_eq!(signature.params.len(), 2);
//! assert!(signature.params[0].is_required());
//! ```

use serde_json::Value;

use crate::types::SchemaType;

/// Default value declared for a parameter
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamDefault {
    /// The parameter is required
    #[default]
    None,
    /// A single default value
    Value(Value),
    /// A closed set of allowed literals; the first one is the default
    OneOf(Vec<Value>),
}

impl ParamDefault {
    /// Build a closed literal set; an empty set declares no default
    pub fn one_of(values: Vec<Value>) -> Self {
        if values.is_empty() {
            ParamDefault::None
        } else {
            ParamDefault::OneOf(values)
        }
    }

    /// Value bound when the argument is omitted
    pub fn value(&self) -> Option<&Value> {
        match self {
            ParamDefault::None => None,
            ParamDefault::Value(value) => Some(value),
            ParamDefault::OneOf(values) => values.first(),
        }
    }

    /// Check if the parameter is required
    pub fn is_none(&self) -> bool {
        matches!(self, ParamDefault::None)
    }
}

/// One declared parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSignature {
    /// Keyword the model must use
    pub name: String,
    /// Declared Rust type, as written or as reported by `type_name`
    pub ty: Option<String>,
    /// Type tag that bypasses type mapping
    pub schema_type: Option<SchemaType>,
    /// Declared default
    pub default: ParamDefault,
    /// Description that takes precedence over the documentation
    pub description: Option<String>,
}

impl ParamSignature {
    /// Create an untyped, required parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: None,
            schema_type: None,
            default: ParamDefault::None,
            description: None,
        }
    }

    /// Set the declared Rust type
    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    /// Set the type tag directly
    pub fn with_schema_type(mut self, schema_type: SchemaType) -> Self {
        self.schema_type = Some(schema_type);
        self
    }

    /// Declare a default value
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = ParamDefault::Value(value);
        self
    }

    /// Declare a closed literal set
    pub fn with_one_of(mut self, values: Vec<Value>) -> Self {
        self.default = ParamDefault::one_of(values);
        self
    }

    /// Set an explicit description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the model must supply this argument
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Everything the extractor needs to know about a callable
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionSignature {
    /// Function or method identifier
    pub ident: String,
    /// Raw documentation text
    pub doc: String,
    /// Short description that takes precedence over the documentation
    pub description: Option<String>,
    /// Parameters in declaration order
    pub params: Vec<ParamSignature>,
}

impl FunctionSignature {
    /// Create a signature with no docs and no parameters
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            ..Self::default()
        }
    }

    /// Set the documentation text
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Set an explicit short description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a parameter
    pub fn with_param(mut self, param: ParamSignature) -> Self {
        self.params.push(param);
        self
    }

    /// Look up a parameter by name
    pub fn param(&self, name: &str) -> Option<&ParamSignature> {
        self.params.iter().find(|param| param.name == name)
    }
}
