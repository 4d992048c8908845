//! Generator backend selection from the environment.

use std::path::PathBuf;
use std::sync::Arc;

use clauselens_core::{Error, Result};
use clauselens_infer::DEFAULT_MAX_NEW_TOKENS;
use tracing::info;

use crate::generator::TextGenerator;
use crate::local::LocalGenerator;
use crate::providers::RemoteGenerator;
use crate::types::LLMProvider;

/// Which kind of generator serves recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorBackend {
    Local,
    Remote,
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub backend: GeneratorBackend,
    pub provider: LLMProvider,
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Seq2seq export used by the local backend.
    pub local_model_dir: PathBuf,
    pub max_new_tokens: usize,
}

impl GeneratorConfig {
    /// Read `RECOMMENDER_BACKEND`, `LLM_PROVIDER`, `LLM_MODEL`, `LLM_BASE_URL`
    /// and the provider API key (`<PROVIDER>_API_KEY`, then `LLM_API_KEY`).
    pub fn from_env(local_model_dir: PathBuf) -> Result<Self> {
        Self::from_lookup(local_model_dir, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        local_model_dir: PathBuf,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match var("RECOMMENDER_BACKEND").as_deref().map(str::to_lowercase) {
            None => GeneratorBackend::Local,
            Some(b) if b == "local" => GeneratorBackend::Local,
            Some(b) if b == "remote" => GeneratorBackend::Remote,
            Some(b) => {
                return Err(Error::Config(format!(
                    "Unknown RECOMMENDER_BACKEND '{}' (expected local or remote)",
                    b
                )))
            }
        };

        let provider = match var("LLM_PROVIDER") {
            None => LLMProvider::Gemini,
            Some(name) => LLMProvider::parse(&name)
                .ok_or_else(|| Error::Config(format!("Unknown LLM_PROVIDER '{}'", name)))?,
        };

        let api_key = var(provider.key_env_var()).or_else(|| var("LLM_API_KEY"));
        if backend == GeneratorBackend::Remote && api_key.is_none() {
            return Err(Error::Config(format!(
                "Remote recommender requires {} or LLM_API_KEY",
                provider.key_env_var()
            )));
        }

        Ok(Self {
            backend,
            provider,
            model: var("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            api_key,
            base_url: var("LLM_BASE_URL"),
            local_model_dir,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        })
    }

    /// Construct the configured generator. Loading the local model may fail.
    pub fn build(&self) -> Result<Arc<dyn TextGenerator>> {
        match self.backend {
            GeneratorBackend::Remote => {
                let api_key = self
                    .api_key
                    .clone()
                    .ok_or_else(|| Error::Config("Remote recommender has no API key".into()))?;
                let mut generator = RemoteGenerator::new(self.provider, self.model.clone(), api_key);
                if let Some(url) = &self.base_url {
                    generator = generator.with_base_url(url.clone());
                }
                info!("Recommendations via {} ({})", self.provider, self.model);
                Ok(Arc::new(generator))
            }
            GeneratorBackend::Local => {
                let backend = clauselens_infer::create_seq2seq(&self.local_model_dir)?;
                info!(
                    "Recommendations via local model at {}",
                    self.local_model_dir.display()
                );
                Ok(Arc::new(LocalGenerator::new(backend, self.max_new_tokens)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<GeneratorConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GeneratorConfig::from_lookup(PathBuf::from("models/recommender"), |k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults_to_local() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.backend, GeneratorBackend::Local);
        assert_eq!(cfg.provider, LLMProvider::Gemini);
        assert_eq!(cfg.model, "gemini-1.5-flash");
        assert_eq!(cfg.max_new_tokens, 120);
    }

    #[test]
    fn test_remote_requires_key() {
        let err = config(&[("RECOMMENDER_BACKEND", "remote")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_provider_key_preferred_over_generic() {
        let cfg = config(&[
            ("RECOMMENDER_BACKEND", "Remote"),
            ("LLM_PROVIDER", "groq"),
            ("GROQ_API_KEY", "gsk-1"),
            ("LLM_API_KEY", "generic"),
            ("LLM_MODEL", "llama-3.1-8b-instant"),
        ])
        .unwrap();
        assert_eq!(cfg.provider, LLMProvider::Groq);
        assert_eq!(cfg.api_key.as_deref(), Some("gsk-1"));
        assert_eq!(cfg.model, "llama-3.1-8b-instant");
        assert!(cfg.build().is_ok());
    }

    #[test]
    fn test_generic_key_fallback() {
        let cfg = config(&[("RECOMMENDER_BACKEND", "remote"), ("LLM_API_KEY", "k")]).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(config(&[("RECOMMENDER_BACKEND", "cloud")]).is_err());
        assert!(config(&[("LLM_PROVIDER", "mystery")]).is_err());
    }
}
