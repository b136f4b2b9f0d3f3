pub mod gemini;

use crate::domain::error::Result;
use crate::domain::llm_config::{InlineImage, LLMConfig};
use async_trait::async_trait;

pub use gemini::GeminiClient;

#[async_trait]
pub trait LLMClient {
    async fn generate(
        &self,
        config: &LLMConfig,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String>;
    async fn list_models(&self, config: &LLMConfig) -> Result<Vec<String>>;
}
