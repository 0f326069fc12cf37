//! Tool declarations built from derived argument schemas

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::schema::{schema_for, Describe, Schema, SchemaError};

/// A tool as announced to the remote model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Function name
    pub name: String,
    /// What the tool does
    pub description: String,
    /// JSON Schema of the call arguments
    pub parameters: Schema,
}

impl ToolDeclaration {
    /// Wrap the declaration as a `{"type": "function", "function": ...}` entry
    pub fn to_function_tool(&self) -> Result<Value, serde_json::Error> {
        let function = serde_json::to_value(self)?;
        Ok(json!({
            "type": "function",
            "function": function,
        }))
    }
}

/// Create a tool declaration from the argument type of a tool
///
/// # Example
///
/// ```ignore
/// use assistant::schema::Describe;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Describe)]
/// struct CalculatorArgs {
///     /// The operation to perform
///     #[schema(enum = "add,subtract,multiply,divide")]
///     operation: String,
///     /// First operand
///     a: f64,
///     /// Second operand
///     b: f64,
/// }
///
/// let decl = create_tool_declaration::<CalculatorArgs>(
///     "calculator",
///     "Perform basic arithmetic operations"
/// )?;
/// ```
pub fn create_tool_declaration<T: Describe + ?Sized>(
    name: impl Into<String>,
    description: impl Into<String>,
) -> Result<ToolDeclaration, SchemaError> {
    Ok(ToolDeclaration {
        name: name.into(),
        description: description.into(),
        parameters: schema_for::<T>()?,
    })
}
