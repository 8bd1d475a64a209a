//! Core types for docchat capabilities

use serde::{Deserialize, Serialize};

/// The three capability kinds, each with its own control boundary.
///
/// Dispatch routes strictly by kind; a name registered under one kind is
/// never executed as another.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Model-controlled: the model decides on its own to invoke it.
    Action,
    /// Application-controlled: fetched by address, never offered to the model.
    DataEndpoint,
    /// User-controlled: expands into seed messages for the model.
    Workflow,
}

impl std::fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CapabilityKind::Action => "action",
            CapabilityKind::DataEndpoint => "data_endpoint",
            CapabilityKind::Workflow => "workflow",
        };
        write!(f, "{}", s)
    }
}

/// One entry in the host's catalog.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    pub name: String,
    pub kind: CapabilityKind,
    pub description: String,
    /// JSON Schema for the declared input shape.
    pub input_schema: serde_json::Value,
}

/// Successful invocation payload.
///
/// Workflows resolve to `Messages` — instructions for the model, not data.
/// Failures travel separately as [`crate::Error`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InvocationResult {
    Text { text: String },
    Json { value: serde_json::Value },
    Messages { messages: Vec<SeedMessage> },
}

impl InvocationResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self::Json { value }
    }

    pub fn messages(messages: Vec<SeedMessage>) -> Self {
        Self::Messages { messages }
    }

    /// Render the payload as plain text, e.g. for tool-result content.
    pub fn to_content_string(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Json { value } => serde_json::to_string_pretty(value).unwrap_or_default(),
            Self::Messages { messages } => messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Role tag for workflow seed messages.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeedRole {
    User,
    Assistant,
}

/// One role-tagged instruction produced by workflow resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeedMessage {
    pub role: SeedRole,
    pub content: String,
}

impl SeedMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: SeedRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: SeedRole::Assistant,
            content: content.into(),
        }
    }
}
