//! Error taxonomy for docchat
//!
//! Store and host failures are model-recoverable: the gateway hands them
//! back as failed invocation results and the orchestration loop feeds them
//! to the model as tool-result content. `Transport` and `ModelCall` mean
//! the channel itself is down; they abort the current turn while leaving
//! the session usable for the next one.

use crate::types::CapabilityKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Error {
    /// Unknown document id.
    #[error("document not found: {0}")]
    NotFound(String),

    /// The replace target does not occur in the document.
    #[error("pattern not found in '{doc_id}': {pattern}")]
    PatternNotFound { doc_id: String, pattern: String },

    /// The capability exists but was invoked as the wrong kind.
    #[error("capability '{name}' is registered as {registered}, invoked as {requested}")]
    WrongKind {
        name: String,
        registered: CapabilityKind,
        requested: CapabilityKind,
    },

    /// Malformed invocation arguments.
    #[error("invalid arguments for '{name}': {reason}")]
    InvalidArgs { name: String, reason: String },

    /// No capability registered under this name or address.
    #[error("unknown capability: {0}")]
    UnknownCapability(String),

    /// The capability channel itself failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote model is unreachable or replied with garbage.
    #[error("model call failed: {0}")]
    ModelCall(String),

    /// The round cap was hit before the model produced a final answer.
    #[error("tool loop exceeded: {0} rounds without a final answer")]
    ToolLoopExceeded(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_args(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgs {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Whether the model can plausibly recover by adjusting its next call.
    pub fn is_model_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::Transport(_) | Error::ModelCall(_) | Error::ToolLoopExceeded(_)
        )
    }
}
