//! Remote chat-completion providers.
//!
//! OpenAI and Groq share the OpenAI request format. Anthropic and Gemini
//! each use their own. All calls are single-shot, non-streaming.

use async_trait::async_trait;
use clauselens_core::{Error, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::generator::TextGenerator;
use crate::types::LLMProvider;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const TEMPERATURE: f64 = 0.3;
const MAX_TOKENS: usize = 200;

/// Text generation over a hosted LLM API.
pub struct RemoteGenerator {
    client: Client,
    provider: LLMProvider,
    model: String,
    api_key: String,
    base_url: Option<String>,
}

impl RemoteGenerator {
    pub fn new(provider: LLMProvider, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            provider,
            model: model.into(),
            api_key: api_key.into(),
            base_url: None,
        }
    }

    /// Override the endpoint (OpenAI-compatible gateways, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    async fn post_json(&self, request: reqwest::RequestBuilder, body: Value) -> Result<Value> {
        let response = request
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Generation(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Generation(format!("API error {}: {}", status, body)));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| Error::Generation(format!("Invalid response body: {}", e)))
    }

    async fn complete_openai_compat(&self, url: &str, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });
        let request = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key));
        let parsed = self.post_json(request, body).await?;
        extract_text(&parsed["choices"][0]["message"]["content"])
    }

    async fn complete_anthropic(&self, url: &str, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });
        let request = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01");
        let parsed = self.post_json(request, body).await?;
        extract_text(&parsed["content"][0]["text"])
    }

    async fn complete_gemini(&self, base: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", base.trim_end_matches('/'), self.model);
        let body = json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": TEMPERATURE,
                "maxOutputTokens": MAX_TOKENS,
            },
        });
        let request = self.client.post(&url).header("x-goog-api-key", &self.api_key);
        let parsed = self.post_json(request, body).await?;
        extract_text(&parsed["candidates"][0]["content"]["parts"][0]["text"])
    }
}

fn extract_text(value: &Value) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::Generation("Response contained no text".into()))
}

#[async_trait]
impl TextGenerator for RemoteGenerator {
    fn name(&self) -> &str {
        match self.provider {
            LLMProvider::OpenAI => "openai",
            LLMProvider::Groq => "groq",
            LLMProvider::Anthropic => "anthropic",
            LLMProvider::Gemini => "gemini",
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!("Generating with {} model {}", self.provider, self.model);
        let base = self.base_url.as_deref();
        match self.provider {
            LLMProvider::OpenAI => {
                self.complete_openai_compat(base.unwrap_or(OPENAI_URL), prompt).await
            }
            LLMProvider::Groq => self.complete_openai_compat(base.unwrap_or(GROQ_URL), prompt).await,
            LLMProvider::Anthropic => {
                self.complete_anthropic(base.unwrap_or(ANTHROPIC_URL), prompt).await
            }
            LLMProvider::Gemini => self.complete_gemini(base.unwrap_or(GEMINI_URL), prompt).await,
        }
    }
}
