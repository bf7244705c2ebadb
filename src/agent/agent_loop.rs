//! Agent loop for knowledge-grounded question answering.
//!
//! The LLM is given one tool, `read_knowledge_base`, and is instructed
//! to answer only from its output. The loop round-trips tool calls to
//! the Ollama chat API until the model produces a plain text answer.

use crate::agent::tools::{get_tool_definitions, ToolCall, ToolExecutor};
use crate::knowledge::KnowledgeBase;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub ollama_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub max_iterations: usize,
    pub timeout_seconds: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            model_name: "llama3.2:latest".to_string(),
            temperature: 0.1,
            max_iterations: 10,
            timeout_seconds: 300,
        }
    }
}

/// Message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCallMessage>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallMessage {
    pub function: ToolCallFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallFunction {
    pub name: String,
    pub arguments: Value,
}

/// Ollama chat API request.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Ollama chat API response.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCallMessage>>,
}

/// The document Q&A agent.
///
/// Chat history is kept across questions, so follow-ups within one
/// session see earlier exchanges.
pub struct DocumentAgent {
    config: AgentConfig,
    http_client: reqwest::Client,
    tool_executor: ToolExecutor,
    messages: Vec<ChatMessage>,
}

impl DocumentAgent {
    /// Create a new agent backed by the given knowledge base.
    pub fn new(config: AgentConfig, knowledge_base: KnowledgeBase) -> Result<Self> {
        info!(
            "Initializing agent with model {} over knowledge base: {}",
            config.model_name,
            knowledge_base.dir().display()
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let messages = vec![ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
            tool_calls: None,
        }];

        Ok(Self {
            config,
            http_client,
            tool_executor: ToolExecutor::new(knowledge_base),
            messages,
        })
    }

    /// Ask a question and return the model's answer.
    pub async fn ask(&mut self, question: &str) -> Result<String> {
        self.messages.push(ChatMessage {
            role: "user".to_string(),
            content: question.to_string(),
            tool_calls: None,
        });

        for iteration in 0..self.config.max_iterations {
            debug!("Agent iteration {}", iteration + 1);

            let response = self.chat_with_tools().await?;

            let Some(tool_calls) = response.tool_calls else {
                // Plain text reply: this is the answer.
                return Ok(response.content);
            };

            for tool_call in tool_calls {
                let call = ToolCall {
                    function: crate::agent::tools::FunctionCall {
                        name: tool_call.function.name.clone(),
                        arguments: tool_call.function.arguments.clone(),
                    },
                };

                let result = self.tool_executor.execute(&call);

                self.messages.push(ChatMessage {
                    role: "tool".to_string(),
                    content: if result.success {
                        result.output
                    } else {
                        format!("Error: {}", result.error.unwrap_or_default())
                    },
                    tool_calls: None,
                });

                info!("Tool {} executed", tool_call.function.name);
            }
        }

        Err(anyhow::anyhow!(
            "Model did not produce an answer within {} iterations",
            self.config.max_iterations
        ))
    }

    /// Send a chat request with tools to Ollama.
    async fn chat_with_tools(&mut self) -> Result<ResponseMessage> {
        let url = format!("{}/api/chat", self.config.ollama_url);

        let tools = get_tool_definitions();
        let tools_json: Vec<Value> = tools
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<_, _>>()
            .context("Failed to serialize tool definitions")?;

        let request = OllamaChatRequest {
            model: self.config.model_name.clone(),
            messages: self.messages.clone(),
            tools: tools_json,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        debug!("Sending chat request with {} messages", self.messages.len());

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    anyhow::anyhow!(
                        "Request timed out after {}s. Try a different model.",
                        self.config.timeout_seconds
                    )
                } else if e.is_connect() {
                    anyhow::anyhow!(
                        "Cannot connect to Ollama at {}. Is Ollama running?",
                        self.config.ollama_url
                    )
                } else {
                    anyhow::anyhow!("Failed to send request: {}", e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Ollama API error {}: {}", status, body));
        }

        let chat_response: OllamaChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        self.messages.push(ChatMessage {
            role: "assistant".to_string(),
            content: chat_response.message.content.clone(),
            tool_calls: chat_response.message.tool_calls.clone(),
        });

        Ok(chat_response.message)
    }
}

/// System prompt for the Q&A loop.
const SYSTEM_PROMPT: &str = r#"You are a helpful assistant.
When a user asks a question, use the 'read_knowledge_base' tool to get the content
of the available text files. Answer ONLY based on that content.
If the knowledge base does not contain the answer, say so instead of guessing."#;
