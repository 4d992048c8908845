//! Label sets shipped alongside exported models.
//!
//! HuggingFace exports carry `id2label` in `config.json`; a bare
//! `labels.json` array is accepted as well.

use std::collections::BTreeMap;
use std::path::Path;

use clauselens_core::{Error, Result};

/// Load the ordered label list for the model in `model_dir`.
pub fn load_labels(model_dir: &Path) -> Result<Vec<String>> {
    let config_path = model_dir.join("config.json");
    if config_path.exists() {
        let raw = std::fs::read_to_string(&config_path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        if let Some(map) = value.get("id2label").and_then(|v| v.as_object()) {
            return labels_from_id2label(map);
        }
    }

    let labels_path = model_dir.join("labels.json");
    if labels_path.exists() {
        let raw = std::fs::read_to_string(&labels_path)?;
        let labels: Vec<String> = serde_json::from_str(&raw)?;
        if labels.is_empty() {
            return Err(Error::Config(format!("{} is empty", labels_path.display())));
        }
        return Ok(labels);
    }

    Err(Error::Config(format!(
        "No label set found in {} (expected config.json id2label or labels.json)",
        model_dir.display()
    )))
}

fn labels_from_id2label(map: &serde_json::Map<String, serde_json::Value>) -> Result<Vec<String>> {
    let mut ordered: BTreeMap<usize, String> = BTreeMap::new();
    for (id, label) in map {
        let idx: usize = id
            .parse()
            .map_err(|_| Error::Config(format!("Non-numeric label id: {}", id)))?;
        let name = label
            .as_str()
            .ok_or_else(|| Error::Config(format!("Label {} is not a string", id)))?;
        ordered.insert(idx, name.to_string());
    }

    // Ids must be dense 0..n so that logit column i maps to label i.
    for (expected, idx) in ordered.keys().enumerate() {
        if *idx != expected {
            return Err(Error::Config(format!("Missing label id {}", expected)));
        }
    }
    if ordered.is_empty() {
        return Err(Error::Config("id2label is empty".into()));
    }
    Ok(ordered.into_values().collect())
}
