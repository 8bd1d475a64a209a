//! Append-only conversation history for one chat session

use docchat_llm::{ChatMessage, ContentBlock, MessageContent};
use tokio::sync::RwLock;

/// Message log for a single session. Turns only ever append; nothing is
/// rewritten once recorded.
pub struct Session {
    system_prompt: Option<String>,
    messages: RwLock<Vec<ChatMessage>>,
}

impl Session {
    pub fn new(system_prompt: Option<&str>) -> Self {
        Self {
            system_prompt: system_prompt.map(String::from),
            messages: RwLock::new(Vec::new()),
        }
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    pub async fn add_user_message(&self, content: &str) {
        self.messages.write().await.push(ChatMessage::user(content));
    }

    pub async fn add_assistant_text(&self, content: &str) {
        self.messages
            .write()
            .await
            .push(ChatMessage::assistant(content));
    }

    /// Append an assistant message carrying tool-use blocks, with optional
    /// leading text.
    pub async fn add_assistant_with_tools(&self, text: Option<&str>, tool_uses: Vec<ContentBlock>) {
        let mut blocks = Vec::new();
        if let Some(t) = text {
            if !t.is_empty() {
                blocks.push(ContentBlock::Text {
                    text: t.to_string(),
                });
            }
        }
        blocks.extend(tool_uses);
        self.messages
            .write()
            .await
            .push(ChatMessage::blocks("assistant", blocks));
    }

    /// Append one tool result.
    ///
    /// The model wire contract wants ALL results of a round inside a single
    /// user message, so consecutive results merge into the last message
    /// when it is already a tool-result carrier. Append order is preserved.
    pub async fn add_tool_result(&self, tool_use_id: &str, content: &str, is_error: bool) {
        let block = ContentBlock::ToolResult {
            tool_use_id: tool_use_id.to_string(),
            content: content.to_string(),
            is_error: is_error.then_some(true),
        };

        let mut messages = self.messages.write().await;
        if let Some(last) = messages.last_mut() {
            if last.role == "user" {
                if let MessageContent::Blocks(blocks) = &mut last.content {
                    if blocks
                        .iter()
                        .any(|b| matches!(b, ContentBlock::ToolResult { .. }))
                    {
                        blocks.push(block);
                        return;
                    }
                }
            }
        }
        messages.push(ChatMessage::blocks("user", vec![block]));
    }

    pub async fn get_messages(&self) -> Vec<ChatMessage> {
        self.messages.read().await.clone()
    }

    pub async fn message_count(&self) -> usize {
        self.messages.read().await.len()
    }

    pub async fn clear(&self) {
        self.messages.write().await.clear();
    }
}
