//! Tool execution framework
//!
//! Native functions are exposed to the remote model as tools. Each tool's
//! argument type is described as JSON Schema by [`crate::schema`]; the
//! [`FunctionRegistry`] keeps the declarations and dispatches the calls the
//! model makes back to the functions.

pub mod declaration;
pub mod executor;
pub mod registry;

pub use declaration::{create_tool_declaration, ToolDeclaration};
pub use executor::{ToolError, ToolExecutor};
pub use registry::{FunctionRegistry, RegistryError, ToolFn, ToolRegistration};

/// Helper macro to register multiple tools at once
///
/// Takes a registry and a list of the modules generated by `#[tool]`. Must be
/// used in a function returning `Result<_, E>` where `E: From<RegistryError>
/// + From<SchemaError>`.
///
/// # Example
///
/// ```ignore
/// #[tool(description = "Perform basic arithmetic operations")]
/// async fn calculator(args: CalculatorArgs) -> Result<CalculatorResult, String> {
///     // Implementation
/// }
///
/// #[tool(description = "Get the current weather")]
/// async fn weather(args: WeatherArgs) -> Result<WeatherResult, String> {
///     // Implementation
/// }
///
/// let mut registry = FunctionRegistry::new();
/// register_tools!(registry, calculator_tool, weather_tool);
///
/// let declarations = registry.declarations();
/// ```
#[macro_export]
macro_rules! register_tools {
    ($registry:expr, $($tool_mod:path),+ $(,)?) => {
        $(
            {
                use $tool_mod as tool;
                $registry.register(tool::registration()?)?;
            }
        )+
    };
}
