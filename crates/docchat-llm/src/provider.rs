//! Model provider trait

use crate::types::{ModelReply, ModelRequest};

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Model error types
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// A chat-completion-with-tool-calling backend. Anything satisfying this
/// trait can drive the orchestration loop; tests plug in a scripted one.
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    fn name(&self) -> &str;
    fn models(&self) -> &[&str];

    fn supports_model(&self, model: &str) -> bool {
        self.models()
            .iter()
            .any(|m| *m == model || model.starts_with(m))
    }

    /// One complete (non-streaming) model call.
    async fn complete(&self, request: ModelRequest) -> ModelResult<ModelReply>;
}
