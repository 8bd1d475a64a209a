//! Chat types shared between the orchestration loop and model providers

use serde::{Deserialize, Serialize};

/// A chat request to the model.
#[derive(Clone, Debug, Serialize)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ModelTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
}

impl Default for ModelRequest {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            messages: Vec::new(),
            tools: None,
            max_tokens: Some(4096),
            system: None,
        }
    }
}

/// Message in the conversation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: MessageContent::Text(content.into()),
        }
    }

    pub fn blocks(role: impl Into<String>, blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: role.into(),
            content: MessageContent::Blocks(blocks),
        }
    }
}

/// Message content - plain string or an array of blocks.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

impl From<String> for MessageContent {
    fn from(s: String) -> Self {
        MessageContent::Text(s)
    }
}

impl From<&str> for MessageContent {
    fn from(s: &str) -> Self {
        MessageContent::Text(s.to_string())
    }
}

/// Content block types on the model wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },

    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    #[serde(rename = "tool_result")]
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
}

/// Tool definition offered to the model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelTool {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// One requested tool invocation from the model.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: serde_json::Value,
}

/// The model's decision for one turn. The orchestration loop matches this
/// in exactly one place; there is no third shape.
#[derive(Clone, Debug)]
pub enum ModelReply {
    /// Terminal answer — the turn is over.
    Text(String),
    /// The model wants tool invocations before it can answer.
    ToolUse {
        text: Option<String>,
        calls: Vec<ToolCall>,
    },
}

impl ModelReply {
    /// Fold parsed content blocks into a reply. Any tool-use block makes
    /// the reply non-terminal, even when text came along with it.
    pub fn from_blocks(blocks: Vec<ContentBlock>) -> Self {
        let mut text = String::new();
        let mut calls = Vec::new();
        for block in blocks {
            match block {
                ContentBlock::Text { text: t } => {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(&t);
                }
                ContentBlock::ToolUse { id, name, input } => {
                    calls.push(ToolCall {
                        id,
                        name,
                        args: input,
                    });
                }
                ContentBlock::ToolResult { .. } => {}
            }
        }
        if calls.is_empty() {
            ModelReply::Text(text)
        } else {
            ModelReply::ToolUse {
                text: if text.is_empty() { None } else { Some(text) },
                calls,
            }
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ModelReply::Text(_))
    }
}

/// Token usage as reported by the provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
