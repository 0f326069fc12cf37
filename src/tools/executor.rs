//! Tool executor trait

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a single tool call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("failed to deserialize arguments: {0}")]
    InvalidArguments(String),

    #[error("failed to serialize result: {0}")]
    InvalidResult(String),

    /// The tool itself reported an error
    #[error("{0}")]
    Failed(String),
}

/// Trait for executing tool calls from the model
///
/// Implementations receive the call id, the tool name and the arguments as
/// produced by the model, and return the serialized result.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool call
    ///
    /// # Arguments
    ///
    /// * `tool_call_id` - Identifier of this invocation, as sent by the model
    /// * `name` - Name of the tool to execute
    /// * `arguments` - Tool arguments as a JSON value
    async fn execute(
        &self,
        tool_call_id: String,
        name: String,
        arguments: serde_json::Value,
    ) -> Result<String, ToolError>;
}
