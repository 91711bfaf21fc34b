use crate::error::AppResult;

pub mod openai;

pub use openai::OpenAiProvider;

/// Single-turn chat completion backend
///
/// The relay forwards each prompt to exactly one `complete` call.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends `prompt` as one user-role message and returns the reply text
    async fn complete(&self, prompt: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
