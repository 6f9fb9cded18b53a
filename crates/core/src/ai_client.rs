// crates/core/src/ai_client.rs

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Abstract chat-completion client with tool support.
///
/// The assistant, the joke tool and the judge all talk to the model through
/// this trait, so tests can swap in a scripted client.
pub trait AiClient {
    /// Send a chat completion request with optional tools.
    fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Model name reported on recorded spans.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// A chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(messages: Vec<Value>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            tool_choice: None,
            temperature: None,
        }
    }

    /// Single user message, no tools.
    pub fn user(content: &str) -> Self {
        Self::new(vec![json!({ "role": "user", "content": content })])
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self.tool_choice = Some("auto".to_string());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A chat completion response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// First choice's message, if the model returned any.
    pub fn first_message(&self) -> Option<&ChatMessage> {
        self.choices.first().map(|c| &c.message)
    }

    /// Non-empty text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.first_message()
            .and_then(|m| m.content.as_deref())
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ChatToolCall>>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: ChatToolFunction,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ChatToolFunction {
    pub name: String,
    /// Raw JSON string of the arguments.
    pub arguments: String,
}
