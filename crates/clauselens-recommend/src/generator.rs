//! The text generation capability.

use async_trait::async_trait;
use clauselens_core::Result;

/// `generate(prompt) -> text`, independent of the backing model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;

    /// One result per prompt, in order. Defaults to serial `generate` calls;
    /// one failure does not affect the others.
    async fn generate_batch(&self, prompts: &[String]) -> Vec<Result<String>> {
        let mut results = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            results.push(self.generate(prompt).await);
        }
        results
    }
}
