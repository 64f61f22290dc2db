//! Function registry: registration, schema export and dispatch

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;

use super::arguments::Arguments;
use super::callable::{Callable, ToolInstance};
use super::directive::{CallDirective, DispatchOutcome};
use super::spec::FunctionSpec;
use crate::config::ExtractorConfig;
use crate::error::{DispatchError, RegistryError};
use crate::schema::{construct_name, DocstringExtractor, MetadataExtractor};
use crate::types::{ChatCompletionResponse, Schema, ToolDefinition};

const MAX_NAME_LEN: usize = 64;

/// Registry of callables exposed to the model
///
/// The `FunctionRegistry` owns the namespace of registered tools. Schemas are
/// exported in registration order, and a model response naming one or more of
/// the tools is dispatched back to the right callable.
///
/// # Example
///
/// ```
/// use llm_functools::{FunctionRegistry, FunctionSignature, FunctionTool, ParamSignature};
/// use serde_json::json;
///
/// let signature = FunctionSignature::new("add")
///     .with_doc("Add two integers")
///     .with_param(ParamSignature::new("a").with_type("i64"))
///     .with_param(ParamSignature::new("b").with_type("i64"));
/// let add = FunctionTool::new(signature, |args| {
///     let a: i64 = args.take("a")?;
///     let b: i64 = args.take("b")?;
///     Ok(json!(a + b))
/// });
///
/// let mut registry = FunctionRegistry::new();
/// registry.register(add).unwrap();
///
/// assert_eq!(registry.list_schemas(None)[0].description, "Add two integers");
/// assert_eq!(registry.call("add", json!({"a": 2, "b": 3})).unwrap(), json!(5));
/// ```
pub struct FunctionRegistry {
    specs: Vec<FunctionSpec>,
    index: HashMap<String, usize>,
    extractor: Box<dyn MetadataExtractor>,
    config: ExtractorConfig,
}

impl FunctionRegistry {
    /// Create an empty registry with the default extractor and configuration
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Create an empty registry with a custom configuration
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            specs: Vec::new(),
            index: HashMap::new(),
            extractor: Box::new(DocstringExtractor),
            config,
        }
    }

    /// Replace the metadata extraction strategy
    ///
    /// Only affects callables registered afterwards.
    pub fn with_extractor(mut self, extractor: impl MetadataExtractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Create a registry holding `callables`
    pub fn from_callables<I, C>(callables: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Arc<dyn Callable>>,
    {
        let mut registry = Self::new();
        registry.register_all(callables)?;
        Ok(registry)
    }

    /// The extractor configuration used for new registrations
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Register one callable under its derived name
    pub fn register<C: Callable + 'static>(&mut self, callable: C) -> Result<&FunctionSpec, RegistryError> {
        self.register_shared(Arc::new(callable))
    }

    /// Register a callable the caller keeps a handle to
    pub fn register_shared(
        &mut self,
        callable: Arc<dyn Callable>,
    ) -> Result<&FunctionSpec, RegistryError> {
        let name = self.validate(callable.as_ref())?;
        if self.index.contains_key(&name) {
            tracing::warn!(name = %name, "rejected duplicate registration");
            return Err(RegistryError::DuplicateName(name));
        }
        Ok(self.insert(callable, name))
    }

    /// Register every callable or none of them
    ///
    /// Each one is validated and checked against the registry and the rest of
    /// the batch before anything is stored.
    pub fn register_all<I, C>(&mut self, callables: I) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = C>,
        C: Into<Arc<dyn Callable>>,
    {
        let callables: Vec<Arc<dyn Callable>> = callables.into_iter().map(Into::into).collect();
        let names = self.validate_batch(&callables)?;
        for (callable, name) in callables.into_iter().zip(names) {
            self.insert(callable, name);
        }
        Ok(())
    }

    /// Register every tool method of `instance` as `<owner><separator><method>`
    ///
    /// Either all methods are registered or none are.
    pub fn register_instance<T: ToolInstance>(
        &mut self,
        owner: impl Into<String>,
        instance: Arc<T>,
    ) -> Result<(), RegistryError> {
        let owner = owner.into();
        let bound: Vec<Arc<dyn Callable>> = T::tool_methods()
            .iter()
            .map(|method| Arc::new(method.bind(owner.clone(), Arc::clone(&instance))) as Arc<dyn Callable>)
            .collect();
        if bound.is_empty() {
            tracing::debug!(owner = %owner, "instance exposes no tool methods");
        }
        self.register_all(bound)
    }

    /// Register several instances in order
    ///
    /// Stops at the first failure; instances registered before it stay.
    pub fn register_instances_all<T, I, S>(&mut self, instances: I) -> Result<(), RegistryError>
    where
        T: ToolInstance,
        I: IntoIterator<Item = (S, Arc<T>)>,
        S: Into<String>,
    {
        for (owner, instance) in instances {
            self.register_instance(owner, instance)?;
        }
        Ok(())
    }

    /// Register `callable` and hand it back unchanged
    pub fn function<C: Callable + Clone + 'static>(&mut self, callable: C) -> Result<C, RegistryError> {
        self.register(callable.clone())?;
        Ok(callable)
    }

    /// Registration handle that can be applied to callables later
    pub fn decorator(&mut self) -> Decorator<'_> {
        Decorator { registry: self }
    }

    /// Schemas in registration order, optionally restricted to `selected`
    ///
    /// Unknown names in `selected` are ignored.
    pub fn list_schemas(&self, selected: Option<&[&str]>) -> Vec<Schema> {
        self.selected(selected).map(|spec| spec.schema().clone()).collect()
    }

    /// Like [`list_schemas`](Self::list_schemas), wrapped for the "tools" calling style
    pub fn list_tool_schemas(&self, selected: Option<&[&str]>) -> Vec<ToolDefinition> {
        self.selected(selected)
            .map(|spec| ToolDefinition::from(spec.schema().clone()))
            .collect()
    }

    /// Check if a function is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(FunctionSpec::name).collect()
    }

    /// Look up a registered function by exposed name
    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.index.get(name).map(|&position| &self.specs[position])
    }

    /// All registered specs in registration order
    pub fn specs(&self) -> &[FunctionSpec] {
        &self.specs
    }

    /// Invoke one registered function with a JSON object of arguments
    pub fn call(&self, name: &str, arguments: Value) -> Result<Value, DispatchError> {
        let spec = self.resolve(name)?;
        invoke(spec, arguments)
    }

    /// Run the call directive carried by `response`
    ///
    /// For parallel directives every name is resolved before anything is
    /// invoked, so an unknown name means no function runs.
    pub fn dispatch(&self, response: &ChatCompletionResponse) -> Result<DispatchOutcome, DispatchError> {
        self.dispatch_directive(CallDirective::from_response(response)?)
    }

    /// Dispatch an already decoded directive
    pub fn dispatch_directive(&self, directive: CallDirective) -> Result<DispatchOutcome, DispatchError> {
        match directive {
            CallDirective::Single { name, arguments } => {
                tracing::debug!(name = %name, "dispatching function call");
                let spec = self.resolve(&name)?;
                invoke(spec, arguments).map(DispatchOutcome::Single)
            }
            CallDirective::Parallel(calls) => {
                {
                    let mut ids = HashSet::with_capacity(calls.len());
                    if let Some(call) = calls.iter().find(|call| !ids.insert(call.id.as_str())) {
                        return Err(DispatchError::MalformedResponse(format!(
                            "duplicate tool call id '{}'",
                            call.id
                        )));
                    }
                }
                let resolved = calls
                    .into_iter()
                    .map(|call| Ok((self.resolve(&call.name)?, call)))
                    .collect::<Result<Vec<_>, DispatchError>>()?;
                tracing::debug!(count = resolved.len(), "dispatching parallel tool calls");

                let mut results = HashMap::with_capacity(resolved.len());
                for (spec, call) in resolved {
                    tracing::debug!(id = %call.id, name = %call.name, "invoking tool call");
                    results.insert(call.id, invoke(spec, call.arguments)?);
                }
                Ok(DispatchOutcome::Parallel(results))
            }
        }
    }

    /// Dispatch an untyped response body
    pub fn dispatch_json(&self, response: &Value) -> Result<DispatchOutcome, DispatchError> {
        let response: ChatCompletionResponse = serde_json::from_value(response.clone())
            .map_err(|err| DispatchError::MalformedResponse(err.to_string()))?;
        self.dispatch(&response)
    }

    /// Dispatch a raw JSON response body
    pub fn dispatch_str(&self, response: &str) -> Result<DispatchOutcome, DispatchError> {
        let response: ChatCompletionResponse = serde_json::from_str(response)
            .map_err(|err| DispatchError::MalformedResponse(err.to_string()))?;
        self.dispatch(&response)
    }

    fn resolve(&self, name: &str) -> Result<&FunctionSpec, DispatchError> {
        self.get(name).ok_or_else(|| {
            tracing::debug!(name = %name, "unknown function requested");
            DispatchError::UnknownFunction(name.to_string())
        })
    }

    fn selected<'a>(&'a self, selected: Option<&'a [&'a str]>) -> impl Iterator<Item = &'a FunctionSpec> + 'a {
        self.specs
            .iter()
            .filter(move |spec| selected.map_or(true, |names| names.contains(&spec.name())))
    }

    fn insert(&mut self, callable: Arc<dyn Callable>, name: String) -> &FunctionSpec {
        let spec = FunctionSpec::build(callable, name.clone(), self.extractor.as_ref(), &self.config);
        tracing::debug!(
            name = %name,
            params = spec.schema().parameters.properties.len(),
            "registered function"
        );
        let position = self.specs.len();
        self.index.insert(name, position);
        self.specs.push(spec);
        &self.specs[position]
    }

    fn validate_batch(&self, callables: &[Arc<dyn Callable>]) -> Result<Vec<String>, RegistryError> {
        let mut seen = HashSet::with_capacity(callables.len());
        let mut names = Vec::with_capacity(callables.len());
        for callable in callables {
            let name = self.validate(callable.as_ref())?;
            if self.index.contains_key(&name) || !seen.insert(name.clone()) {
                tracing::warn!(name = %name, "rejected duplicate registration");
                return Err(RegistryError::DuplicateName(name));
            }
            names.push(name);
        }
        Ok(names)
    }

    /// Derive the exposed name and check the callable can be described
    fn validate(&self, callable: &dyn Callable) -> Result<String, RegistryError> {
        let signature = callable.signature();
        let reject = |reason: String| -> Result<String, RegistryError> {
            tracing::warn!(ident = %signature.ident, reason = %reason, "rejected registration");
            Err(RegistryError::InvalidArgument(reason))
        };

        if let Some(owner) = callable.owner() {
            if owner.is_empty() {
                return reject(format!("method \"{}\" has an empty owner token", signature.ident));
            }
        }

        let name = construct_name(&signature.ident, callable.owner(), &self.config);
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return reject(format!(
                "exposed name \"{name}\" must be between 1 and {MAX_NAME_LEN} characters"
            ));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return reject(format!(
                "exposed name \"{name}\" may only contain letters, digits, '_' and '-'"
            ));
        }

        let mut params = HashSet::with_capacity(signature.params.len());
        for param in &signature.params {
            if !params.insert(param.name.as_str()) {
                return reject(format!("\"{name}\" declares parameter \"{}\" twice", param.name));
            }
        }
        Ok(name)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("names", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

fn invoke(spec: &FunctionSpec, arguments: Value) -> Result<Value, DispatchError> {
    let arguments = Arguments::from_value(arguments)?;
    Ok(spec.callable().call(arguments)?)
}

/// Deferred registration handle returned by [`FunctionRegistry::decorator`]
pub struct Decorator<'a> {
    registry: &'a mut FunctionRegistry,
}

impl Decorator<'_> {
    /// Register `callable` and hand it back unchanged
    pub fn apply<C: Callable + Clone + 'static>(&mut self, callable: C) -> Result<C, RegistryError> {
        self.registry.function(callable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvocationError;
    use crate::schema::{FunctionSignature, ParamSignature};
    use crate::tools::callable::{into_output, FunctionTool, MethodTool};
    use serde_json::json;

    fn add_tool(ident: &str) -> FunctionTool {
        let signature = FunctionSignature::new(ident)
            .with_doc("Add two numbers")
            .with_param(ParamSignature::new("a").with_type("i32"))
            .with_param(ParamSignature::new("b").with_type("i32"));
        FunctionTool::new(signature, |args| {
            let a: i32 = args.take("a")?;
            let b: i32 = args.take("b")?;
            into_output(a + b)
        })
    }

    #[test]
    fn test_register_function() {
        let mut registry = FunctionRegistry::new();
        let spec = registry.register(add_tool("add")).unwrap();

        assert_eq!(spec.name(), "add");
        assert!(registry.contains("add"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_call_registered_function() {
        let mut registry = FunctionRegistry::new();
        registry.register(add_tool("add")).unwrap();

        let result = registry.call("add", json!({"a": 5, "b": 3})).unwrap();
        assert_eq!(result, json!(8));
    }

    #[test]
    fn test_unknown_function() {
        let registry = FunctionRegistry::new();
        let err = registry.call("unknown", json!({})).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Function \"unknown\" is not registered with the orchestrator"
        );
    }

    #[test]
    fn test_function_error() {
        let signature = FunctionSignature::new("divide")
            .with_param(ParamSignature::new("a"))
            .with_param(ParamSignature::new("b"));
        let divide = FunctionTool::new(signature, |args| {
            let a: i32 = args.take("a")?;
            let b: i32 = args.take("b")?;
            if b == 0 {
                return Err(InvocationError::Failed("Division by zero".to_string()));
            }
            into_output(a / b)
        });

        let mut registry = FunctionRegistry::new();
        registry.register(divide).unwrap();

        let err = registry.call("divide", json!({"a": 10, "b": 0})).unwrap_err();
        assert_eq!(err.to_string(), "Division by zero");
    }

    #[test]
    fn test_binding_error_surfaces() {
        let mut registry = FunctionRegistry::new();
        registry.register(add_tool("add")).unwrap();

        let err = registry.call("add", json!({"a": 5})).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Invocation(InvocationError::MissingArgument(ref name)) if name == "b"
        ));

        let err = registry.call("add", json!([5, 3])).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Invocation(InvocationError::NotAnObject(_))
        ));
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let mut registry = FunctionRegistry::new();
        registry.register(add_tool("add")).unwrap();

        let err = registry.register(add_tool("add")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(ref name) if name == "add"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let mut registry = FunctionRegistry::new();

        for ident in ["", "has space", "dotted.name"] {
            let err = registry.register(add_tool(ident)).unwrap_err();
            assert!(matches!(err, RegistryError::InvalidArgument(_)), "{ident:?}");
        }
        let err = registry.register(add_tool(&"x".repeat(65))).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));
        assert!(registry.register(add_tool(&"x".repeat(64))).is_ok());
    }

    #[test]
    fn test_duplicate_parameters_are_rejected() {
        let signature = FunctionSignature::new("twice")
            .with_param(ParamSignature::new("a"))
            .with_param(ParamSignature::new("a"));
        let tool = FunctionTool::new(signature, |_| Ok(Value::Null));

        let mut registry = FunctionRegistry::new();
        let err = registry.register(tool).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_all_is_atomic() {
        let mut registry = FunctionRegistry::new();
        registry.register(add_tool("existing")).unwrap();

        let err = registry
            .register_all([add_tool("first"), add_tool("existing")])
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(_)));
        assert_eq!(registry.names(), vec!["existing"]);

        let err = registry
            .register_all([add_tool("second"), add_tool("second")])
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(ref name) if name == "second"));
        assert_eq!(registry.len(), 1);

        registry
            .register_all([add_tool("third"), add_tool("fourth")])
            .unwrap();
        assert_eq!(registry.names(), vec!["existing", "third", "fourth"]);
    }

    #[test]
    fn test_list_schemas_in_registration_order() {
        let registry =
            FunctionRegistry::from_callables([add_tool("zeta"), add_tool("alpha"), add_tool("mid")])
                .unwrap();

        let names: Vec<String> = registry
            .list_schemas(None)
            .into_iter()
            .map(|schema| schema.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);

        let selected = registry.list_schemas(Some(&["mid", "missing", "zeta"][..]));
        let names: Vec<&str> = selected.iter().map(|schema| schema.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "mid"]);

        let tools = registry.list_tool_schemas(Some(&["alpha"][..]));
        assert_eq!(
            serde_json::to_value(&tools).unwrap()[0]["type"],
            json!("function")
        );
        assert_eq!(tools[0].function.name, "alpha");
    }

    #[test]
    fn test_decorator_forms() {
        let mut registry = FunctionRegistry::new();
        let tool = registry.function(add_tool("add")).unwrap();
        assert_eq!(tool.signature().ident, "add");

        let mut decorator = registry.decorator();
        decorator.apply(add_tool("plus")).unwrap();
        assert!(decorator.apply(add_tool("plus")).is_err());

        assert_eq!(registry.names(), vec!["add", "plus"]);
    }

    struct Offset(i32);

    impl ToolInstance for Offset {
        fn tool_methods() -> Vec<MethodTool<Self>> {
            let signature =
                FunctionSignature::new("shift").with_param(ParamSignature::new("n").with_type("i32"));
            vec![MethodTool::new(signature, |this: &Offset, args| {
                let n: i32 = args.take("n")?;
                into_output(this.0 + n)
            })]
        }
    }

    #[test]
    fn test_register_instance_uses_owner_token() {
        let config = ExtractorConfig::default().with_owner_separator("-");
        let mut registry = FunctionRegistry::with_config(config);
        registry
            .register_instances_all([("low", Arc::new(Offset(1))), ("high", Arc::new(Offset(100)))])
            .unwrap();

        assert_eq!(registry.names(), vec!["low-shift", "high-shift"]);
        assert_eq!(registry.call("high-shift", json!({"n": 1})).unwrap(), json!(101));

        let err = registry.register_instance("", Arc::new(Offset(0))).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument(_)));
    }

    struct FixedExtractor;

    impl MetadataExtractor for FixedExtractor {
        fn extract(&self, name: &str, _: &FunctionSignature, _: &ExtractorConfig) -> Schema {
            Schema {
                name: name.to_string(),
                description: "fixed".to_string(),
                parameters: Default::default(),
            }
        }
    }

    #[test]
    fn test_custom_extractor() {
        let mut registry = FunctionRegistry::new().with_extractor(FixedExtractor);
        registry.register(add_tool("add")).unwrap();

        let schema = &registry.list_schemas(None)[0];
        assert_eq!(schema.description, "fixed");
        assert!(schema.parameters.properties.is_empty());
    }
}
