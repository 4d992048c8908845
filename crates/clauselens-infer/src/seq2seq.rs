//! Local seq2seq text generation (T5-family encoder/decoder ONNX export).
//!
//! Expects an Optimum-style export: `encoder_model.onnx`,
//! `decoder_model.onnx`, `tokenizer.json` and optionally `config.json` for
//! special token ids. Decoding is greedy without a KV cache.

use clauselens_core::Result;

/// Default generation budget per prompt.
pub const DEFAULT_MAX_NEW_TOKENS: usize = 120;

/// Synchronous batch text generation.
pub trait Seq2SeqBackend: Send + Sync {
    /// Generate one completion per prompt, in order.
    fn generate_batch(&self, prompts: &[String], max_new_tokens: usize) -> Result<Vec<String>>;
}

/// Special token ids used by greedy decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    pub decoder_start: u32,
    pub eos: u32,
    pub pad: u32,
}

impl Default for SpecialTokens {
    fn default() -> Self {
        // T5 conventions.
        Self {
            decoder_start: 0,
            eos: 1,
            pad: 0,
        }
    }
}

impl SpecialTokens {
    /// Read ids from a HuggingFace `config.json` value, keeping defaults for
    /// missing keys.
    pub fn from_config(config: &serde_json::Value) -> Self {
        let read = |key: &str, fallback: u32| {
            config
                .get(key)
                .and_then(|v| v.as_u64())
                .map(|v| v as u32)
                .unwrap_or(fallback)
        };
        let defaults = Self::default();
        Self {
            decoder_start: read("decoder_start_token_id", defaults.decoder_start),
            eos: read("eos_token_id", defaults.eos),
            pad: read("pad_token_id", defaults.pad),
        }
    }
}

/// Index of the largest logit.
pub fn argmax(logits: &[f32]) -> Option<usize> {
    logits
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;
    use std::sync::Arc;

    use clauselens_core::{Error, Result};
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::Tokenizer;
    use tracing::{debug, info};

    use super::{argmax, Seq2SeqBackend, SpecialTokens};
    use crate::batch::truncate_keep_last;

    const MAX_INPUT_LEN: usize = 512;

    /// ONNX encoder/decoder generator.
    pub struct OnnxSeq2Seq {
        encoder: Arc<Mutex<Session>>,
        decoder: Arc<Mutex<Session>>,
        tokenizer: Tokenizer,
        special: SpecialTokens,
    }

    fn build_session(path: &Path) -> Result<Session> {
        Session::builder()
            .map_err(|e| Error::Inference(format!("Failed to create session builder: {}", e)))?
            .with_intra_threads(2)
            .map_err(|e| Error::Inference(format!("Failed to set threads: {}", e)))?
            .commit_from_file(path)
            .map_err(|e| Error::Inference(format!("Failed to load {}: {}", path.display(), e)))
    }

    impl OnnxSeq2Seq {
        pub fn load(model_dir: &Path) -> Result<Self> {
            let encoder_path = model_dir.join("encoder_model.onnx");
            let decoder_path = model_dir.join("decoder_model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            for path in [&encoder_path, &decoder_path, &tokenizer_path] {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Recommendation model file not found: {}",
                        path.display()
                    )));
                }
            }

            let special = match std::fs::read_to_string(model_dir.join("config.json")) {
                Ok(raw) => SpecialTokens::from_config(&serde_json::from_str(&raw)?),
                Err(_) => SpecialTokens::default(),
            };

            ort::init().commit();

            let encoder = build_session(&encoder_path)?;
            let decoder = build_session(&decoder_path)?;
            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| Error::Inference(format!("Failed to load tokenizer: {}", e)))?;

            info!("ONNX seq2seq generator loaded from {}", model_dir.display());

            Ok(Self {
                encoder: Arc::new(Mutex::new(encoder)),
                decoder: Arc::new(Mutex::new(decoder)),
                tokenizer,
                special,
            })
        }

        /// Run the encoder; returns hidden states, their shape and the mask.
        fn encode(&self, prompt: &str) -> Result<(Vec<f32>, Vec<usize>, Vec<i64>)> {
            let encoding = self
                .tokenizer
                .encode(prompt, true)
                .map_err(|e| Error::Inference(format!("Tokenization failed: {}", e)))?;
            let mut ids: Vec<i64> = truncate_keep_last(encoding.get_ids(), MAX_INPUT_LEN)
                .into_iter()
                .map(|i| i as i64)
                .collect();
            if ids.is_empty() {
                ids.push(self.special.eos as i64);
            }
            let mask = vec![1i64; ids.len()];

            let ids_tensor = Tensor::from_array(([1usize, ids.len()], ids.clone()))
                .map_err(|e| Error::Inference(format!("Failed to create ids tensor: {}", e)))?;
            let mask_tensor = Tensor::from_array(([1usize, mask.len()], mask.clone()))
                .map_err(|e| Error::Inference(format!("Failed to create mask tensor: {}", e)))?;

            let mut encoder = self.encoder.lock();
            let outputs = encoder
                .run(ort::inputs![
                    "input_ids" => ids_tensor,
                    "attention_mask" => mask_tensor
                ])
                .map_err(|e| Error::Inference(format!("Encoder failed: {}", e)))?;
            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::Inference(format!("Failed to extract encoder output: {}", e)))?;
            let dims: Vec<usize> = shape.iter().map(|&d| d as usize).collect();
            Ok((data.to_vec(), dims, mask))
        }

        fn generate_one(&self, prompt: &str, max_new_tokens: usize) -> Result<String> {
            let (hidden, hidden_shape, mask) = self.encode(prompt)?;
            let mut generated: Vec<u32> = vec![self.special.decoder_start];

            for _ in 0..max_new_tokens {
                let dec_ids: Vec<i64> = generated.iter().map(|&t| t as i64).collect();
                let dec_len = dec_ids.len();

                let ids_tensor = Tensor::from_array(([1usize, dec_len], dec_ids))
                    .map_err(|e| Error::Inference(format!("Failed to create decoder ids: {}", e)))?;
                let mask_tensor = Tensor::from_array(([1usize, mask.len()], mask.clone()))
                    .map_err(|e| Error::Inference(format!("Failed to create decoder mask: {}", e)))?;
                let hidden_tensor = Tensor::from_array((hidden_shape.clone(), hidden.clone()))
                    .map_err(|e| Error::Inference(format!("Failed to create hidden tensor: {}", e)))?;

                let next = {
                    let mut decoder = self.decoder.lock();
                    let outputs = decoder
                        .run(ort::inputs![
                            "input_ids" => ids_tensor,
                            "encoder_attention_mask" => mask_tensor,
                            "encoder_hidden_states" => hidden_tensor
                        ])
                        .map_err(|e| Error::Inference(format!("Decoder failed: {}", e)))?;
                    let (shape, logits) = outputs[0]
                        .try_extract_tensor::<f32>()
                        .map_err(|e| Error::Inference(format!("Failed to extract logits: {}", e)))?;
                    let vocab = shape.last().copied().unwrap_or(0) as usize;
                    if vocab == 0 || logits.len() < dec_len * vocab {
                        return Err(Error::Inference("Decoder returned empty logits".into()));
                    }
                    let last = &logits[(dec_len - 1) * vocab..dec_len * vocab];
                    argmax(last).unwrap_or(self.special.eos as usize) as u32
                };

                if next == self.special.eos {
                    break;
                }
                generated.push(next);
            }

            debug!("Generated {} tokens", generated.len() - 1);
            self.tokenizer
                .decode(&generated[1..], true)
                .map_err(|e| Error::Inference(format!("Decoding failed: {}", e)))
        }
    }

    impl Seq2SeqBackend for OnnxSeq2Seq {
        fn generate_batch(&self, prompts: &[String], max_new_tokens: usize) -> Result<Vec<String>> {
            prompts
                .iter()
                .map(|p| self.generate_one(p, max_new_tokens))
                .collect()
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxSeq2Seq;
