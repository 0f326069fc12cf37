//! Function registry for tool execution

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, trace};

use super::declaration::{create_tool_declaration, ToolDeclaration};
use super::executor::{ToolError, ToolExecutor};
use crate::schema::{Describe, SchemaError};

/// Type-erased tool function: JSON arguments in, serialized result out
pub type ToolFn =
    Box<dyn Fn(serde_json::Value) -> BoxFuture<'static, Result<String, ToolError>> + Send + Sync>;

/// Errors raised while registering tools
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("failed to derive tool schema: {0}")]
    Schema(#[from] SchemaError),
}

/// A tool function together with its declaration
///
/// Normally produced by the `registration()` function that `#[tool]`
/// generates, then handed to [`FunctionRegistry::register`].
pub struct ToolRegistration {
    pub name: String,
    pub function: ToolFn,
    pub declaration: ToolDeclaration,
}

impl ToolRegistration {
    /// Wrap an async function, deriving the declaration from `Args`
    pub fn from_async<F, Args, R, E, Fut>(
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) -> Result<Self, SchemaError>
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Args: Describe + DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        E: Display + Send + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let name = name.into();
        let declaration = create_tool_declaration::<Args>(name.clone(), description)?;

        let wrapper = move |args_json: serde_json::Value| {
            let args = match serde_json::from_value::<Args>(args_json) {
                Ok(args) => args,
                Err(e) => {
                    let err = ToolError::InvalidArguments(e.to_string());
                    return Box::pin(async move { Err(err) }) as BoxFuture<'static, _>;
                }
            };

            let future = func(args);

            Box::pin(async move {
                match future.await {
                    Ok(result) => serialize_result(&result),
                    Err(e) => Err(ToolError::Failed(e.to_string())),
                }
            }) as BoxFuture<'static, _>
        };

        Ok(Self {
            name,
            function: Box::new(wrapper),
            declaration,
        })
    }

    /// Wrap a synchronous function, deriving the declaration from `Args`
    pub fn from_sync<F, Args, R, E>(
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) -> Result<Self, SchemaError>
    where
        F: Fn(Args) -> Result<R, E> + Send + Sync + 'static,
        Args: Describe + DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        E: Display + Send + 'static,
    {
        let name = name.into();
        let declaration = create_tool_declaration::<Args>(name.clone(), description)?;

        let wrapper = move |args_json: serde_json::Value| {
            let result = match serde_json::from_value::<Args>(args_json) {
                Ok(args) => match func(args) {
                    Ok(result) => serialize_result(&result),
                    Err(e) => Err(ToolError::Failed(e.to_string())),
                },
                Err(e) => Err(ToolError::InvalidArguments(e.to_string())),
            };

            Box::pin(async move { result }) as BoxFuture<'static, _>
        };

        Ok(Self {
            name,
            function: Box::new(wrapper),
            declaration,
        })
    }
}

fn serialize_result<R: Serialize>(result: &R) -> Result<String, ToolError> {
    serde_json::to_string(result).map_err(|e| ToolError::InvalidResult(e.to_string()))
}

/// Registry for managing tool functions
///
/// The `FunctionRegistry` holds the Rust functions the model may call, along
/// with their declarations. Arguments are deserialized from JSON and results
/// serialized back to JSON.
///
/// # Example
///
/// ```ignore
/// use assistant::schema::Describe;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Deserialize, Describe)]
/// struct WeatherArgs {
///     location: String,
/// }
///
/// #[derive(Serialize)]
/// struct WeatherResult {
///     temperature: f32,
///     conditions: String,
/// }
///
/// async fn get_weather(args: WeatherArgs) -> Result<WeatherResult, String> {
///     Ok(WeatherResult {
///         temperature: 72.0,
///         conditions: "Sunny".to_string(),
///     })
/// }
///
/// let mut registry = FunctionRegistry::new();
/// registry.register_async("get_weather", "Get the current weather", get_weather)?;
/// ```
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, ToolFn>,
    declarations: Vec<ToolDeclaration>,
}

impl FunctionRegistry {
    /// Create a new empty function registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prepared tool
    pub fn register(&mut self, registration: ToolRegistration) -> Result<(), RegistryError> {
        let ToolRegistration {
            name,
            function,
            declaration,
        } = registration;

        if self.functions.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }

        debug!(
            tool = %name,
            definitions = declaration.parameters.definitions.len(),
            "registered tool"
        );
        self.functions.insert(name, function);
        self.declarations.push(declaration);
        Ok(())
    }

    /// Register an async function that returns a serializable result
    ///
    /// # Type Parameters
    ///
    /// * `Args` - The argument type, whose schema becomes the declaration
    /// * `R` - The result type
    /// * `E` - The error type, reported to the model by its `Display` text
    pub fn register_async<F, Args, R, E, Fut>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Args: Describe + DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        E: Display + Send + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        self.register(ToolRegistration::from_async(name, description, func)?)
    }

    /// Register a synchronous function that returns a serializable result
    pub fn register_sync<F, Args, R, E>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        func: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Args) -> Result<R, E> + Send + Sync + 'static,
        Args: Describe + DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        E: Display + Send + 'static,
    {
        self.register(ToolRegistration::from_sync(name, description, func)?)
    }

    /// Check if a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Get the number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Declarations of all registered tools, in registration order
    pub fn declarations(&self) -> &[ToolDeclaration] {
        &self.declarations
    }

    pub fn get_declaration(&self, name: &str) -> Option<&ToolDeclaration> {
        self.declarations.iter().find(|d| d.name == name)
    }

    /// Execute a registered function by name
    pub async fn execute_function(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<String, ToolError> {
        match self.functions.get(name) {
            Some(func) => func(arguments).await,
            None => Err(ToolError::UnknownTool(name.to_string())),
        }
    }
}

#[async_trait]
impl ToolExecutor for FunctionRegistry {
    async fn execute(
        &self,
        tool_call_id: String,
        name: String,
        arguments: serde_json::Value,
    ) -> Result<String, ToolError> {
        trace!(%tool_call_id, tool = %name, "executing tool");
        self.execute_function(&name, arguments).await
    }
}
