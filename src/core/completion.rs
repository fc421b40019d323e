use async_trait::async_trait;

use crate::error::Result;

/// One chat-style completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Ask the provider for a JSON object response when it supports it
    pub json_mode: bool,
}

/// Upstream completion model. Implementations return the raw assistant text.
///
/// Callers treat the result as untrusted: it may be prose, truncated JSON or
/// empty. Timeouts are enforced by the caller, not the backend.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}
