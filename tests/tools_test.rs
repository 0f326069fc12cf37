//! Tool registration through `#[tool]`

use assistant::register_tools;
use assistant::schema::Describe;
use assistant::tool;
use assistant::tools::{FunctionRegistry, RegistryError, ToolError, ToolExecutor};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize, Describe)]
pub struct CalculatorArgs {
    /// The operation to perform
    #[schema(enum = "add,subtract,multiply,divide")]
    operation: String,
    /// First operand
    a: f64,
    /// Second operand
    b: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CalculatorResult {
    value: f64,
}

#[tool(description = "Perform basic arithmetic operations")]
async fn calculator(args: CalculatorArgs) -> Result<CalculatorResult, String> {
    let value = match args.operation.as_str() {
        "add" => args.a + args.b,
        "subtract" => args.a - args.b,
        "multiply" => args.a * args.b,
        "divide" if args.b == 0.0 => return Err("Division by zero".to_string()),
        "divide" => args.a / args.b,
        other => return Err(format!("Unknown operation: {}", other)),
    };
    Ok(CalculatorResult { value })
}

#[derive(Debug, Deserialize, Describe)]
pub struct GreetArgs {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "en")]
    language: Option<String>,
}

/// Greet someone by name
#[tool(name = "say_hello")]
fn greet(args: GreetArgs) -> Result<String, String> {
    match args.language.as_deref() {
        Some("fr") => Ok(format!("Bonjour, {}!", args.name)),
        _ => Ok(format!("Hello, {}!", args.name)),
    }
}

fn build_registry() -> Result<FunctionRegistry, RegistryError> {
    let mut registry = FunctionRegistry::new();
    register_tools!(registry, calculator_tool, greet_tool);
    Ok(registry)
}

#[test]
fn test_generated_module_constants() {
    assert_eq!(calculator_tool::NAME, "calculator");
    assert_eq!(
        calculator_tool::DESCRIPTION,
        "Perform basic arithmetic operations"
    );
    assert_eq!(greet_tool::NAME, "say_hello");
    assert_eq!(greet_tool::DESCRIPTION, "Greet someone by name");
}

#[test]
fn test_generated_declaration() {
    let decl = calculator_tool::declaration().unwrap();

    assert_eq!(
        decl.to_function_tool().unwrap(),
        json!({
            "type": "function",
            "function": {
                "name": "calculator",
                "description": "Perform basic arithmetic operations",
                "parameters": {
                    "type": "object",
                    "properties": {
                        "operation": {
                            "type": "string",
                            "description": "The operation to perform",
                            "enum": ["add", "subtract", "multiply", "divide"]
                        },
                        "a": {"type": "number", "format": "double", "description": "First operand"},
                        "b": {"type": "number", "format": "double", "description": "Second operand"}
                    },
                    "additionalProperties": false,
                    "required": ["operation", "a", "b"]
                }
            }
        })
    );
}

#[test]
fn test_optional_argument_not_required() {
    let decl = greet_tool::declaration().unwrap();
    let parameters = decl.parameters.to_value().unwrap();

    assert_eq!(parameters["required"], json!(["name"]));
    assert_eq!(parameters["properties"]["language"]["examples"], json!(["en"]));
}

#[test]
fn test_register_tools_macro() {
    let registry = build_registry().unwrap();

    assert_eq!(registry.len(), 2);
    let names: Vec<_> = registry
        .declarations()
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(names, ["calculator", "say_hello"]);
}

#[test]
fn test_register_tools_twice_fails() {
    let mut registry = build_registry().unwrap();

    let err = registry
        .register(calculator_tool::registration().unwrap())
        .unwrap_err();
    assert_eq!(err.to_string(), "tool 'calculator' is already registered");
}

#[tokio::test]
async fn test_execute_async_tool() {
    let registry = build_registry().unwrap();

    let result = registry
        .execute(
            "call-1".to_string(),
            "calculator".to_string(),
            json!({"operation": "multiply", "a": 6.0, "b": 7.0}),
        )
        .await
        .unwrap();

    let parsed: CalculatorResult = serde_json::from_str(&result).unwrap();
    assert_eq!(parsed, CalculatorResult { value: 42.0 });
}

#[tokio::test]
async fn test_execute_sync_tool() {
    let registry = build_registry().unwrap();

    let result = registry
        .execute_function("say_hello", json!({"name": "Ada", "language": "fr"}))
        .await
        .unwrap();

    assert_eq!(result, "\"Bonjour, Ada!\"");
}

#[tokio::test]
async fn test_tool_errors() {
    let registry = build_registry().unwrap();

    let err = registry
        .execute_function(
            "calculator",
            json!({"operation": "divide", "a": 1.0, "b": 0.0}),
        )
        .await
        .unwrap_err();
    assert_eq!(err, ToolError::Failed("Division by zero".to_string()));

    let err = registry
        .execute_function("calculator", json!({"operation": "add"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ToolError::InvalidArguments(_)));

    let err = registry
        .execute_function("missing", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err, ToolError::UnknownTool("missing".to_string()));
}

#[tokio::test]
async fn test_direct_call_still_works() {
    let result = calculator_tool::execute(CalculatorArgs {
        operation: "add".to_string(),
        a: 1.0,
        b: 2.0,
    })
    .await
    .unwrap();

    assert_eq!(result, CalculatorResult { value: 3.0 });
}
