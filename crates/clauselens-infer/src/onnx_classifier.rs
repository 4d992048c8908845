//! ONNX-based multi-label clause classifier.
//!
//! Loads a fine-tuned sequence classification model (legal BERT family)
//! exported to ONNX, with its tokenizer and label set. Requires the `onnx`
//! feature.

#[cfg(feature = "onnx")]
mod inner {
    use std::path::Path;
    use std::sync::Arc;

    use clauselens_core::{Error, Result};
    use ndarray::Array2;
    use ort::session::Session;
    use ort::value::Tensor;
    use parking_lot::Mutex;
    use tokenizers::Tokenizer;
    use tracing::{debug, info};

    use crate::batch::PaddedBatch;
    use crate::classifier::{sigmoid_rows, ClauseClassifier};
    use crate::labels::load_labels;

    /// Maximum clause length in tokens.
    const MAX_SEQ_LEN: usize = 256;

    /// Clauses per inference call.
    const BATCH_SIZE: usize = 16;

    /// ONNX clause classifier.
    pub struct OnnxClassifier {
        session: Arc<Mutex<Session>>,
        tokenizer: Tokenizer,
        labels: Vec<String>,
        pad_id: u32,
    }

    impl OnnxClassifier {
        /// Load a classifier from the given directory.
        ///
        /// Expects:
        /// - `model_dir/model.onnx`: the exported classifier
        /// - `model_dir/tokenizer.json`: the HuggingFace tokenizer
        /// - `model_dir/config.json` (`id2label`) or `model_dir/labels.json`
        pub fn load(model_dir: &Path) -> Result<Self> {
            let model_path = model_dir.join("model.onnx");
            let tokenizer_path = model_dir.join("tokenizer.json");

            if !model_path.exists() {
                return Err(Error::Config(format!(
                    "Classifier model not found: {}",
                    model_path.display()
                )));
            }
            if !tokenizer_path.exists() {
                return Err(Error::Config(format!(
                    "Classifier tokenizer not found: {}",
                    tokenizer_path.display()
                )));
            }

            let labels = load_labels(model_dir)?;

            // With load-dynamic, ORT_DYLIB_PATH must point to libonnxruntime.
            ort::init().commit();

            let session = Session::builder()
                .map_err(|e| Error::Inference(format!("Failed to create session builder: {}", e)))?
                .with_intra_threads(2)
                .map_err(|e| Error::Inference(format!("Failed to set threads: {}", e)))?
                .commit_from_file(&model_path)
                .map_err(|e| Error::Inference(format!("Failed to load classifier: {}", e)))?;

            let tokenizer = Tokenizer::from_file(&tokenizer_path)
                .map_err(|e| Error::Inference(format!("Failed to load tokenizer: {}", e)))?;
            let pad_id = tokenizer.get_padding().map(|p| p.pad_id).unwrap_or(0);

            info!(
                "ONNX classifier loaded: labels={}, model={}",
                labels.len(),
                model_path.display()
            );

            Ok(Self {
                session: Arc::new(Mutex::new(session)),
                tokenizer,
                labels,
                pad_id,
            })
        }

        fn run_batch(&self, clauses: &[String]) -> Result<Vec<Vec<f32>>> {
            let encodings = self
                .tokenizer
                .encode_batch(clauses.to_vec(), true)
                .map_err(|e| Error::Inference(format!("Tokenization failed: {}", e)))?;

            let pairs: Vec<(Vec<u32>, Vec<u32>)> = encodings
                .iter()
                .map(|e| (e.get_ids().to_vec(), e.get_attention_mask().to_vec()))
                .collect();
            let padded = PaddedBatch::from_encodings(&pairs, MAX_SEQ_LEN, self.pad_id);
            let shape = [padded.batch, padded.seq_len];

            let ids_tensor = Tensor::from_array((shape, padded.input_ids.clone()))
                .map_err(|e| Error::Inference(format!("Failed to create ids tensor: {}", e)))?;
            let mask_tensor = Tensor::from_array((shape, padded.attention_mask.clone()))
                .map_err(|e| Error::Inference(format!("Failed to create mask tensor: {}", e)))?;
            let type_ids_tensor = Tensor::from_array((shape, padded.token_type_ids()))
                .map_err(|e| Error::Inference(format!("Failed to create type_ids tensor: {}", e)))?;

            let mut session = self.session.lock();
            let outputs = session
                .run(ort::inputs![ids_tensor, mask_tensor, type_ids_tensor])
                .map_err(|e| Error::Inference(format!("Classifier inference failed: {}", e)))?;

            let (out_shape, data) = outputs[0]
                .try_extract_tensor::<f32>()
                .map_err(|e| Error::Inference(format!("Failed to extract logits: {}", e)))?;

            let dims: Vec<i64> = out_shape.iter().copied().collect();
            let expected = [padded.batch as i64, self.labels.len() as i64];
            if dims != expected {
                return Err(Error::Inference(format!(
                    "Unexpected logits shape {:?}, expected {:?}",
                    dims, expected
                )));
            }

            let logits = Array2::from_shape_vec((padded.batch, self.labels.len()), data.to_vec())
                .map_err(|e| Error::Inference(format!("Bad logits layout: {}", e)))?;
            Ok(sigmoid_rows(logits))
        }
    }

    impl ClauseClassifier for OnnxClassifier {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn classify(&self, clauses: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut probabilities = Vec::with_capacity(clauses.len());
            for chunk in clauses.chunks(BATCH_SIZE) {
                debug!("Classifying batch of {} clauses", chunk.len());
                probabilities.extend(self.run_batch(chunk)?);
            }
            Ok(probabilities)
        }
    }
}

#[cfg(feature = "onnx")]
pub use inner::OnnxClassifier;
