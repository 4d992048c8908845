//! Local seq2seq generation.

use std::sync::Arc;

use async_trait::async_trait;
use clauselens_core::{Error, Result};
use clauselens_infer::Seq2SeqBackend;

use crate::generator::TextGenerator;

/// Runs a `Seq2SeqBackend` on the blocking pool so inference never stalls
/// the async executor.
pub struct LocalGenerator {
    backend: Arc<dyn Seq2SeqBackend>,
    max_new_tokens: usize,
}

impl LocalGenerator {
    pub fn new(backend: Arc<dyn Seq2SeqBackend>, max_new_tokens: usize) -> Self {
        Self {
            backend,
            max_new_tokens,
        }
    }

    async fn run(&self, prompts: Vec<String>) -> Result<Vec<String>> {
        let backend = Arc::clone(&self.backend);
        let max_new_tokens = self.max_new_tokens;
        tokio::task::spawn_blocking(move || backend.generate_batch(&prompts, max_new_tokens))
            .await
            .map_err(|e| Error::Internal(format!("Generation task failed: {}", e)))?
    }
}

#[async_trait]
impl TextGenerator for LocalGenerator {
    fn name(&self) -> &str {
        "local"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.run(vec![prompt.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Generation("Model returned no output".into()))
    }

    async fn generate_batch(&self, prompts: &[String]) -> Vec<Result<String>> {
        if prompts.is_empty() {
            return Vec::new();
        }
        match self.run(prompts.to_vec()).await {
            Ok(outputs) if outputs.len() == prompts.len() => outputs.into_iter().map(Ok).collect(),
            Ok(outputs) => {
                let msg = format!("Model returned {} outputs for {} prompts", outputs.len(), prompts.len());
                prompts.iter().map(|_| Err(Error::Generation(msg.clone()))).collect()
            }
            // A failed batch fails each prompt with the same error.
            Err(e) => {
                let msg = e.to_string();
                prompts.iter().map(|_| Err(Error::Generation(msg.clone()))).collect()
            }
        }
    }
}
