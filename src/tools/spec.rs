//! Registered callables

use std::fmt;
use std::sync::Arc;

use super::callable::Callable;
use crate::config::ExtractorConfig;
use crate::schema::MetadataExtractor;
use crate::types::Schema;

/// A callable paired with its exposed name and extracted schema
///
/// Built once at registration and never modified afterwards.
#[derive(Clone)]
pub struct FunctionSpec {
    name: String,
    callable: Arc<dyn Callable>,
    schema: Schema,
}

impl FunctionSpec {
    /// Run `extractor` over `callable` and record the result under `name`
    pub fn build(
        callable: Arc<dyn Callable>,
        name: impl Into<String>,
        extractor: &dyn MetadataExtractor,
        config: &ExtractorConfig,
    ) -> Self {
        let name = name.into();
        let schema = extractor.extract(&name, callable.signature(), config);
        Self {
            name,
            callable,
            schema,
        }
    }

    /// The exposed name the model calls
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The function schema sent to the model
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The underlying callable
    pub fn callable(&self) -> &Arc<dyn Callable> {
        &self.callable
    }
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("owner", &self.callable.owner())
            .field("schema", &self.schema)
            .finish()
    }
}
