//! Shared application state.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use clauselens_analyze::Analyzer;
use clauselens_core::{AppConfig, Result};
use clauselens_recommend::{GeneratorConfig, Recommender};
use parking_lot::Mutex;
use tracing::info;

/// Application context, built once at startup and shared by all handlers.
pub struct AppState {
    pub config: AppConfig,
    pub analyzer: Analyzer,
    pub feedback: FeedbackLog,
}

impl AppState {
    pub fn new(config: AppConfig, analyzer: Analyzer) -> Self {
        let feedback = FeedbackLog::new(&config.data_paths.feedback_log);
        Self {
            config,
            analyzer,
            feedback,
        }
    }

    /// Load the classifier, entity recognizer and recommendation generator
    /// from the configured model directories.
    pub fn load(config: AppConfig) -> Result<Self> {
        let paths = &config.data_paths;
        let classifier = clauselens_infer::create_classifier(&paths.classifier_model)?;
        info!(
            "Clause classifier loaded ({} labels)",
            classifier.labels().len()
        );
        let recognizer = clauselens_infer::create_recognizer(&paths.ner_model);
        let generator = GeneratorConfig::from_env(paths.recommender_model.clone())?.build()?;

        let analyzer = Analyzer::new(classifier, recognizer, Recommender::new(generator));
        Ok(Self::new(config, analyzer))
    }
}

/// Append-only feedback log, one timestamped JSON line per entry.
pub struct FeedbackLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `<RFC 3339 timestamp> <compact JSON>`. The file is opened and
    /// closed on every write.
    pub fn append(&self, entry: &serde_json::Value) -> Result<()> {
        let line = format!(
            "{} {}\n",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            serde_json::to_string(entry)?
        );
        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

pub type SharedState = Arc<AppState>;
