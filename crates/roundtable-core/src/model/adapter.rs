//! ModelAdapter trait definition.

use roundtable_types::model::{ModelError, ModelRequest};

/// Trait for chat-model backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in roundtable-infra (e.g., `OpenAiCompatAdapter`)
/// and own their transport concerns: timeout, retry, and credentials.
pub trait ModelAdapter: Send + Sync {
    /// Human-readable adapter name (e.g., "openai-compat").
    fn name(&self) -> &str;

    /// Send the turns and return the assistant's text.
    fn call(
        &self,
        request: &ModelRequest,
    ) -> impl std::future::Future<Output = Result<String, ModelError>> + Send;
}
