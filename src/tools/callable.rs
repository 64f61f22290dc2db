//! Callables the registry can expose as tools

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::arguments::Arguments;
use crate::error::InvocationError;
use crate::schema::{signature_from_args, FunctionSignature};

/// Something the registry can describe and invoke
///
/// Implemented by [`FunctionTool`] for free functions and by [`BoundMethod`]
/// for methods bound to a shared instance. The `#[tool]` and `#[tools]`
/// macros produce both.
pub trait Callable: Send + Sync {
    /// Signature and documentation used to build the schema
    fn signature(&self) -> &FunctionSignature;

    /// Token of the instance a bound method belongs to
    fn owner(&self) -> Option<&str> {
        None
    }

    /// Invoke with keyword arguments
    fn call(&self, arguments: Arguments) -> Result<Value, InvocationError>;
}

type InvokeFn = dyn Fn(&mut Arguments) -> Result<Value, InvocationError> + Send + Sync;

/// A free function together with its signature
#[derive(Clone)]
pub struct FunctionTool {
    signature: FunctionSignature,
    invoke: Arc<InvokeFn>,
}

impl FunctionTool {
    /// Wrap a function that pulls its parameters out of [`Arguments`]
    ///
    /// `call` binds the arguments against `signature` first, so `invoke` sees
    /// every declared parameter with defaults already applied.
    pub fn new<F>(signature: FunctionSignature, invoke: F) -> Self
    where
        F: Fn(&mut Arguments) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self {
            signature,
            invoke: Arc::new(invoke),
        }
    }

    /// Wrap a function taking one `JsonSchema` argument struct
    ///
    /// The struct's fields become the tool's parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use llm_functools::FunctionTool;
    /// use schemars::JsonSchema;
    /// use serde::Deserialize;
    ///
    /// #[derive(Deserialize, JsonSchema)]
    /// struct AddArgs {
    ///     a: i64,
    ///     b: i64,
    /// }
    ///
    /// let add = FunctionTool::from_args("add", "Add two numbers", |args: AddArgs| {
    ///     Ok::<_, String>(args.a + args.b)
    /// });
    /// assert_eq!(add.signature().params.len(), 2);
    /// ```
    pub fn from_args<A, R, E, F>(
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) -> Self
    where
        A: JsonSchema + DeserializeOwned,
        R: Serialize,
        E: fmt::Display,
        F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        let signature = signature_from_args::<A>(name, description);
        Self::new(signature, move |arguments| {
            let values = std::mem::take(arguments).into_value();
            let args = serde_json::from_value::<A>(values).map_err(InvocationError::InvalidArguments)?;
            fallible_output(func(args))
        })
    }

    /// The signature the schema is built from
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }
}

impl Callable for FunctionTool {
    fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    fn call(&self, mut arguments: Arguments) -> Result<Value, InvocationError> {
        arguments.bind(&self.signature)?;
        (self.invoke)(&mut arguments)
    }
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("ident", &self.signature.ident)
            .field("params", &self.signature.params.len())
            .finish()
    }
}

impl From<FunctionTool> for Arc<dyn Callable> {
    fn from(tool: FunctionTool) -> Self {
        Arc::new(tool)
    }
}

/// A type whose methods can be registered as tools on a shared instance
///
/// Usually implemented with `#[tools]` on an inherent impl block.
pub trait ToolInstance: Send + Sync + 'static {
    /// Every method exposed as a tool, in declaration order
    fn tool_methods() -> Vec<MethodTool<Self>>
    where
        Self: Sized;
}

type MethodFn<T> = dyn Fn(&T, &mut Arguments) -> Result<Value, InvocationError> + Send + Sync;

/// An unbound method together with its signature
pub struct MethodTool<T> {
    signature: FunctionSignature,
    invoke: Arc<MethodFn<T>>,
}

impl<T: ToolInstance> MethodTool<T> {
    /// Wrap a method body that reads its arguments from an [`Arguments`] map
    pub fn new<F>(signature: FunctionSignature, invoke: F) -> Self
    where
        F: Fn(&T, &mut Arguments) -> Result<Value, InvocationError> + Send + Sync + 'static,
    {
        Self {
            signature,
            invoke: Arc::new(invoke),
        }
    }

    /// The signature the schema is built from
    pub fn signature(&self) -> &FunctionSignature {
        &self.signature
    }

    /// Bind the method to `instance` under the `owner` token
    pub fn bind(&self, owner: impl Into<String>, instance: Arc<T>) -> BoundMethod<T> {
        BoundMethod {
            owner: owner.into(),
            instance,
            method: self.clone(),
        }
    }
}

impl<T> Clone for MethodTool<T> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            invoke: Arc::clone(&self.invoke),
        }
    }
}

impl<T> fmt::Debug for MethodTool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodTool")
            .field("ident", &self.signature.ident)
            .finish()
    }
}

/// A method bound to one shared instance
pub struct BoundMethod<T> {
    owner: String,
    instance: Arc<T>,
    method: MethodTool<T>,
}

impl<T> BoundMethod<T> {
    /// The instance this method is bound to
    pub fn instance(&self) -> &Arc<T> {
        &self.instance
    }
}

impl<T: ToolInstance> Callable for BoundMethod<T> {
    fn signature(&self) -> &FunctionSignature {
        &self.method.signature
    }

    fn owner(&self) -> Option<&str> {
        Some(&self.owner)
    }

    fn call(&self, mut arguments: Arguments) -> Result<Value, InvocationError> {
        arguments.bind(&self.method.signature)?;
        (self.method.invoke)(&self.instance, &mut arguments)
    }
}

impl<T> fmt::Debug for BoundMethod<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundMethod")
            .field("owner", &self.owner)
            .field("ident", &self.method.signature.ident)
            .finish()
    }
}

/// Encode a function's return value
pub fn into_output<T: Serialize>(value: T) -> Result<Value, InvocationError> {
    serde_json::to_value(value).map_err(InvocationError::Output)
}

/// Encode a fallible function's return value; its error becomes
/// [`InvocationError::Failed`]
pub fn fallible_output<T: Serialize, E: fmt::Display>(
    result: Result<T, E>,
) -> Result<Value, InvocationError> {
    match result {
        Ok(value) => into_output(value),
        Err(err) => Err(InvocationError::Failed(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ParamSignature;
    use serde::Deserialize;
    use serde_json::json;

    fn weather_tool() -> FunctionTool {
        let signature = FunctionSignature::new("get_current_weather")
            .with_param(ParamSignature::new("location").with_type("String"))
            .with_param(ParamSignature::new("unit").with_default(json!("fahrenheit")));
        FunctionTool::new(signature, |args| {
            let location: String = args.take("location")?;
            let unit: String = args.take("unit")?;
            into_output(format!("{location} in {unit}"))
        })
    }

    #[test]
    fn test_function_tool_binds_defaults() {
        let tool = weather_tool();
        let arguments = Arguments::from_value(json!({"location": "Boston"})).unwrap();
        assert_eq!(tool.call(arguments).unwrap(), json!("Boston in fahrenheit"));
    }

    #[test]
    fn test_function_tool_surfaces_binding_errors() {
        let tool = weather_tool();
        let err = tool.call(Arguments::new()).unwrap_err();
        assert!(matches!(err, InvocationError::MissingArgument(ref name) if name == "location"));
    }

    #[derive(Deserialize, JsonSchema)]
    struct DivideArgs {
        a: f64,
        b: f64,
    }

    #[test]
    fn test_from_args_tool() {
        let tool = FunctionTool::from_args("divide", "Divide two numbers", |args: DivideArgs| {
            if args.b == 0.0 {
                Err("Division by zero")
            } else {
                Ok(args.a / args.b)
            }
        });

        let ok = tool
            .call(Arguments::from_value(json!({"a": 9.0, "b": 3.0})).unwrap())
            .unwrap();
        assert_eq!(ok, json!(3.0));

        let err = tool
            .call(Arguments::from_value(json!({"a": 1.0, "b": 0.0})).unwrap())
            .unwrap_err();
        assert_eq!(err.to_string(), "Division by zero");

        let err = tool
            .call(Arguments::from_value(json!({"a": 1.0})).unwrap())
            .unwrap_err();
        assert!(matches!(err, InvocationError::MissingArgument(ref name) if name == "b"));
    }

    struct Counter {
        start: i64,
    }

    impl ToolInstance for Counter {
        fn tool_methods() -> Vec<MethodTool<Self>> {
            let signature = FunctionSignature::new("add")
                .with_param(ParamSignature::new("n").with_type("i64"));
            vec![MethodTool::new(signature, |this: &Counter, args| {
                let n: i64 = args.take("n")?;
                into_output(this.start + n)
            })]
        }
    }

    #[test]
    fn test_bound_method_targets_its_instance() {
        let methods = Counter::tool_methods();
        let first = methods[0].bind("first", Arc::new(Counter { start: 10 }));
        let second = methods[0].bind("second", Arc::new(Counter { start: 100 }));

        assert_eq!(first.owner(), Some("first"));
        let args = || Arguments::from_value(json!({"n": 1})).unwrap();
        assert_eq!(first.call(args()).unwrap(), json!(11));
        assert_eq!(second.call(args()).unwrap(), json!(101));
    }
}
