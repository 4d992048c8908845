//! Configuration and data directory management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 5000;
/// Default upload body limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 16;

/// Paths to all ClauseLens data locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Saved contract uploads (`data/uploads/`), also served statically.
    pub uploads: PathBuf,
    /// Model root (`data/models/`).
    pub models: PathBuf,
    /// Clause classifier export (`data/models/classifier/`).
    pub classifier_model: PathBuf,
    /// Local recommendation seq2seq export (`data/models/recommender/`).
    pub recommender_model: PathBuf,
    /// Optional token-classification NER export (`data/models/ner/`).
    pub ner_model: PathBuf,
    /// Append-only feedback log (`data/feedback_log.txt`).
    pub feedback_log: PathBuf,
    /// Application log file (`data/analysis.log`).
    pub app_log: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let models = root.join("models");
        let paths = Self {
            uploads: root.join("uploads"),
            classifier_model: models.join("classifier"),
            recommender_model: models.join("recommender"),
            ner_model: models.join("ner"),
            models,
            feedback_log: root.join("feedback_log.txt"),
            app_log: root.join("analysis.log"),
            root,
        };
        paths.ensure_dirs()?;
        Ok(paths)
    }

    fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.uploads)?;
        std::fs::create_dir_all(&self.models)?;
        Ok(())
    }
}

/// Top-level ClauseLens configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server port.
    pub port: u16,
    /// Public base URL used to build upload access URLs.
    pub backend_url: String,
    /// Maximum accepted request body for uploads, in bytes.
    pub max_upload_bytes: usize,
    /// Data directory paths.
    pub data_paths: DataPaths,
}

impl AppConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let backend_url = std::env::var("BACKEND_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("http://localhost:{}", port));

        let max_upload_mb = std::env::var("MAX_UPLOAD_MB")
            .ok()
            .and_then(|m| m.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        let mut config = Self::new(data_dir, port, backend_url)?;
        config.max_upload_bytes = upload_limit_bytes(max_upload_mb);
        Ok(config)
    }

    /// Create configuration with explicit values (no environment lookup).
    pub fn new(
        data_dir: impl AsRef<Path>,
        port: u16,
        backend_url: impl Into<String>,
    ) -> std::io::Result<Self> {
        let backend_url: String = backend_url.into();
        Ok(Self {
            port,
            backend_url: backend_url.trim_end_matches('/').to_string(),
            max_upload_bytes: upload_limit_bytes(DEFAULT_MAX_UPLOAD_MB),
            data_paths: DataPaths::new(data_dir)?,
        })
    }

    /// Public URL of a saved upload. The filename is percent-encoded as a
    /// single path segment.
    pub fn upload_url(&self, filename: &str) -> String {
        format!(
            "{}/uploads/{}",
            self.backend_url,
            urlencoding::encode(filename)
        )
    }
}

/// Megabytes to bytes, clamped at `usize::MAX`.
pub fn upload_limit_bytes(mb: usize) -> usize {
    mb.saturating_mul(1024 * 1024)
}
