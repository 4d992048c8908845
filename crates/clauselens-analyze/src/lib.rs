//! Analysis pipeline: text → clauses → labels and scores → parties →
//! recommendations → `AnalysisResult`.

pub mod pipeline;
pub mod scoring;

pub use pipeline::{AnalyzeOptions, Analyzer};
pub use scoring::{overall_score, score_clause, type_weight, ClauseScore};
