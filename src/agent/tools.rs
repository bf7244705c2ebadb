//! Tool definitions for the document Q&A agent.
//!
//! This module defines the single tool the LLM can use: reading the
//! aggregated knowledge base.

use crate::knowledge::KnowledgeBase;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Tool definition for Ollama's tool-calling API.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool call made by the LLM.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Value,
}

/// Result of executing a tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn success(output: String) -> Self {
        Self {
            success: true,
            output,
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(message),
        }
    }
}

/// The tools executor that handles tool calls.
pub struct ToolExecutor {
    knowledge_base: KnowledgeBase,
}

impl ToolExecutor {
    /// Create a new tool executor backed by the given knowledge base.
    pub fn new(knowledge_base: KnowledgeBase) -> Self {
        Self { knowledge_base }
    }

    /// Execute a tool call and return the result.
    pub fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        let name = &tool_call.function.name;

        debug!("Executing tool: {}", name);

        match name.as_str() {
            "read_knowledge_base" => self.read_knowledge_base(),
            _ => ToolResult::error(format!("Unknown tool: {}", name)),
        }
    }

    /// Read the aggregated knowledge base.
    ///
    /// Always succeeds from the tool's point of view: an empty directory
    /// or a read failure surfaces as a sentinel string in the output,
    /// which the model consumes like any other content.
    fn read_knowledge_base(&self) -> ToolResult {
        ToolResult::success(self.knowledge_base.tool_output())
    }
}

/// Get the tool definitions for the Ollama API.
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: "read_knowledge_base".to_string(),
            description: "Read all text documents in the knowledge base and return their content. Useful for answering questions about specific documents.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        },
    }]
}
