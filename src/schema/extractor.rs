//! Schema extraction strategies

use indexmap::IndexMap;

use super::docstring::parse_doc;
use super::signature::{FunctionSignature, ParamDefault, ParamSignature};
use super::type_mapper::recognize;
use crate::config::ExtractorConfig;
use crate::tools::Callable;
use crate::types::{ParametersSchema, PropertySchema, Schema};

/// Turns a callable's signature into a [`Schema`]
///
/// Implementations must not fail: missing documentation or types degrade to
/// fallback values.
pub trait MetadataExtractor: Send + Sync {
    /// Build the schema exposed under `name`
    fn extract(&self, name: &str, signature: &FunctionSignature, config: &ExtractorConfig)
        -> Schema;
}

/// Default strategy: types through the type mapper, descriptions from the doc
/// comment
#[derive(Debug, Clone, Copy, Default)]
pub struct DocstringExtractor;

impl MetadataExtractor for DocstringExtractor {
    fn extract(
        &self,
        name: &str,
        signature: &FunctionSignature,
        config: &ExtractorConfig,
    ) -> Schema {
        let doc = parse_doc(&signature.doc);

        let description = signature
            .description
            .clone()
            .filter(|description| !description.trim().is_empty())
            .or(doc.short_description.clone())
            .unwrap_or_else(|| name.to_string());

        let mut properties = IndexMap::with_capacity(signature.params.len());
        let mut required = Vec::new();
        for param in &signature.params {
            let documented = doc.param(&param.name);
            properties.insert(param.name.clone(), property(param, documented, config));
            if param.is_required() {
                required.push(param.name.clone());
            }
        }

        Schema {
            name: name.to_string(),
            description,
            parameters: ParametersSchema {
                properties,
                required,
                ..ParametersSchema::default()
            },
        }
    }
}

fn property(
    param: &ParamSignature,
    documented: Option<&str>,
    config: &ExtractorConfig,
) -> PropertySchema {
    let kind = param
        .schema_type
        .or_else(|| param.ty.as_deref().and_then(recognize))
        .unwrap_or(config.fallback_type);

    let description = param
        .description
        .as_deref()
        .or(documented)
        .map(str::trim)
        .filter(|description| !description.is_empty())
        .unwrap_or(param.name.as_str())
        .to_string();

    let (enum_values, default) = match &param.default {
        ParamDefault::None => (None, None),
        ParamDefault::Value(value) => (None, Some(value.clone())),
        ParamDefault::OneOf(values) => (Some(values.clone()), values.first().cloned()),
    };

    PropertySchema {
        kind,
        description,
        enum_values,
        default,
    }
}

/// Exposed name of a callable: its identifier, or `<owner><separator><ident>`
/// for methods bound to an instance
pub fn construct_name(ident: &str, owner: Option<&str>, config: &ExtractorConfig) -> String {
    match owner {
        Some(owner) => config.bound_name(owner, ident),
        None => ident.to_string(),
    }
}

/// Extract a callable's schema with the default strategy and configuration
pub fn extract_metadata<C: Callable + ?Sized>(callable: &C) -> Schema {
    let config = ExtractorConfig::default();
    let signature = callable.signature();
    let name = construct_name(&signature.ident, callable.owner(), &config);
    DocstringExtractor.extract(&name, signature, &config)
}
