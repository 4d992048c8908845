//! ClauseLens Infer: clause classifier, named-entity recognition, local
//! seq2seq generation.
//!
//! Model exports live under the data directory's `models/` tree. With the
//! `onnx` feature the ONNX Runtime backends are available; the classifier is
//! mandatory while NER falls back to `HeuristicRecognizer`.

pub mod batch;
pub mod classifier;
pub mod entities;
pub mod labels;
pub mod onnx_classifier;
pub mod onnx_ner;
pub mod seq2seq;

pub use classifier::{sigmoid, ClauseClassifier};
pub use entities::{EntityMention, EntityRecognizer, HeuristicRecognizer, MentionKind};
pub use seq2seq::{Seq2SeqBackend, DEFAULT_MAX_NEW_TOKENS};

#[cfg(feature = "onnx")]
pub use onnx_classifier::OnnxClassifier;
#[cfg(feature = "onnx")]
pub use onnx_ner::OnnxRecognizer;
#[cfg(feature = "onnx")]
pub use seq2seq::OnnxSeq2Seq;

use std::path::Path;
use std::sync::Arc;

use clauselens_core::Result;

/// Load the clause classifier. Failure is fatal for the caller.
pub fn create_classifier(model_dir: &Path) -> Result<Arc<dyn ClauseClassifier>> {
    #[cfg(feature = "onnx")]
    {
        let classifier = OnnxClassifier::load(model_dir)?;
        Ok(Arc::new(classifier))
    }

    #[cfg(not(feature = "onnx"))]
    {
        Err(clauselens_core::Error::Config(format!(
            "ONNX feature disabled; cannot load classifier from {}",
            model_dir.display()
        )))
    }
}

/// Create the best available entity recognizer.
///
/// Tries ONNX first (if feature enabled and model files present), falls back
/// to the heuristic recognizer.
pub fn create_recognizer(model_dir: &Path) -> Arc<dyn EntityRecognizer> {
    #[cfg(feature = "onnx")]
    {
        if model_dir.join("model.onnx").exists() {
            match OnnxRecognizer::load(model_dir) {
                Ok(recognizer) => {
                    tracing::info!("Using ONNX entity recognizer");
                    return Arc::new(recognizer);
                }
                Err(e) => {
                    tracing::warn!("ONNX NER unavailable: {}. Falling back to heuristics.", e);
                }
            }
        }
    }

    #[cfg(not(feature = "onnx"))]
    {
        let _ = model_dir;
    }

    tracing::info!("Using heuristic entity recognizer");
    Arc::new(HeuristicRecognizer::new())
}

/// Load the local seq2seq recommendation model.
pub fn create_seq2seq(model_dir: &Path) -> Result<Arc<dyn Seq2SeqBackend>> {
    #[cfg(feature = "onnx")]
    {
        let model = OnnxSeq2Seq::load(model_dir)?;
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    {
        Err(clauselens_core::Error::Config(format!(
            "ONNX feature disabled; cannot load local recommender from {}",
            model_dir.display()
        )))
    }
}
