//! Tool registration and dispatch
//!
//! This module provides the [`Callable`] abstraction, the [`FunctionRegistry`]
//! that owns registered tools, and the call directives decoded from model
//! responses.

pub mod arguments;
pub mod callable;
pub mod directive;
pub mod registry;
pub mod spec;

// Re-export commonly used types
pub use arguments::Arguments;
pub use callable::{BoundMethod, Callable, FunctionTool, MethodTool, ToolInstance};
pub use directive::{CallDirective, DispatchOutcome, ParallelCall};
pub use registry::{Decorator, FunctionRegistry};
pub use spec::FunctionSpec;

/// Helper macro to register multiple `#[tool]` functions at once
///
/// Takes a registry and the `<fn>_tool` modules generated by `#[tool]`.
/// Registration is atomic: if any tool is rejected, none is stored.
///
/// # Example
///
/// ```
/// use llm_functools::{register_tools, tool, FunctionRegistry};
///
/// /// Add two numbers
/// #[tool]
/// fn add(a: i64, b: i64) -> i64 {
///     a + b
/// }
///
/// /// Multiply two numbers
/// #[tool]
/// fn multiply(a: i64, b: i64) -> i64 {
///     a * b
/// }
///
/// fn main() {
///     let mut registry = FunctionRegistry::new();
///     register_tools!(registry, add_tool, multiply_tool).unwrap();
///     assert_eq!(registry.names(), vec!["add", "multiply"]);
/// }
/// ```
#[macro_export]
macro_rules! register_tools {
    ($registry:expr, $($tool_mod:path),+ $(,)?) => {
        $registry.register_all([
            $(
                {
                    use $tool_mod as tool;
                    tool::callable()
                }
            ),+
        ])
    };
}
