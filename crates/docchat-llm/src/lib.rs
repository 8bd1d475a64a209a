//! Docchat LLM - model provider adapters

pub mod anthropic;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use provider::{ModelError, ModelProvider, ModelResult};
pub use types::*;
