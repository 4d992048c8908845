//! ONNX token-classification NER (BERT-style BIO tagger).
//!
//! Requires the `onnx` feature. Model directory layout matches the
//! classifier: `model.onnx`, `tokenizer.json`, `config.json` with `id2label`.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;
    use std::sync::Arc;

    use clauselens_core::{Error, Result};
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::Tokenizer;
    use tracing::info;

    use crate::batch::truncate_keep_last;
    use crate::entities::{decode_bio, EntityMention, EntityRecognizer, MentionKind};
    use crate::labels::load_labels;

    const MAX_SEQ_LEN: usize = 512;

    pub struct OnnxRecognizer {
        session: Arc<Mutex<Session>>,
        tokenizer: Tokenizer,
        tags: Vec<String>,
    }

    impl OnnxRecognizer {
        pub fn load(model_dir: &Path) -> Result<Self> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(Error::Config(format!("NER model not found: {}", model_path.display())));
            }
            if !tokenizer_path.exists() {
                return Err(Error::Config(format!(
                    "NER tokenizer not found: {}",
                    tokenizer_path.display()
                )));
            }

            let tags = load_labels(model_dir)?;

            ort::init().commit();

            let session = Session::builder()
                .map_err(|e| Error::Inference(format!("Failed to create session builder: {}", e)))?
                .with_intra_threads(1)
                .map_err(|e| Error::Inference(format!("Failed to set threads: {}", e)))?
                .commit_from_file(&model_path)
                .map_err(|e| Error::Inference(format!("Failed to load NER model: {}", e)))?;

            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| Error::Inference(format!("Failed to load tokenizer: {}", e)))?;

            info!("ONNX NER loaded: tags={}, model={}", tags.len(), model_path.display());

            Ok(Self {
                session: Arc::new(Mutex::new(session)),
                tokenizer,
                tags,
            })
        }
    }

    impl EntityRecognizer for OnnxRecognizer {
        fn name(&self) -> &str {
            "onnx"
        }

        fn recognize(&self, sentence: &str) -> Result<Vec<EntityMention>> {
            let encoding = self
                .tokenizer
                .encode(sentence, true)
                .map_err(|e| Error::Inference(format!("Tokenization failed: {}", e)))?;

            let ids: Vec<i64> = truncate_keep_last(encoding.get_ids(), MAX_SEQ_LEN)
                .into_iter()
                .map(|i| i as i64)
                .collect();
            let seq_len = ids.len();
            if seq_len == 0 {
                return Ok(Vec::new());
            }
            let mask = vec![1i64; seq_len];
            // The closing special token keeps its own offset.
            let mut offsets: Vec<(usize, usize)> = encoding.get_offsets()[..seq_len - 1].to_vec();
            offsets.push(encoding.get_offsets().last().copied().unwrap_or((0, 0)));

            let ids_tensor = Tensor::from_array(([1usize, seq_len], ids))
                .map_err(|e| Error::Inference(format!("Failed to create ids tensor: {}", e)))?;
            let mask_tensor = Tensor::from_array(([1usize, seq_len], mask))
                .map_err(|e| Error::Inference(format!("Failed to create mask tensor: {}", e)))?;
            let type_ids_tensor = Tensor::from_array(([1usize, seq_len], vec![0i64; seq_len]))
                .map_err(|e| Error::Inference(format!("Failed to create type_ids tensor: {}", e)))?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_ids_tensor])
                .map_err(|e| Error::Inference(format!("NER inference failed: {}", e)))?;

            // Logits are [1, seq_len, num_tags].
            let (shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::Inference(format!("Failed to extract NER logits: {}", e)))?;
            let dims: Vec<i64> = shape.iter().copied().collect();
            if dims.len() != 3 || dims[2] as usize != self.tags.len() {
                return Err(Error::Inference(format!("Unexpected NER output shape: {:?}", dims)));
            }
            let num_tags = self.tags.len();

            let tokens: Vec<(String, usize, usize)> = (0..seq_len)
                .map(|i| {
                    let row = &data[i * num_tags..(i + 1) * num_tags];
                    let best = row
                        .iter()
                        .enumerate()
                        .max_by(|a, b| a.1.total_cmp(b.1))
                        .map(|(idx, _)| idx)
                        .unwrap_or(0);
                    let (start, end) = offsets[i];
                    (self.tags[best].clone(), start, end)
                })
                .collect();

            Ok(decode_bio(&tokens)
                .into_iter()
                .filter_map(|(tag, start, end)| {
                    sentence.get(start..end).map(|text| EntityMention {
                        text: text.trim().to_string(),
                        kind: MentionKind::from_tag(&tag),
                    })
                })
                .filter(|m| !m.text.is_empty())
                .collect())
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxRecognizer;
