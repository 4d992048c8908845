//! Clause recommendations and the overall summary.
//!
//! Generation never fails the analysis: per-clause errors become placeholder
//! text and a weak summary falls back to a template.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::generator::TextGenerator;
use crate::prompts::{clause_prompt, summary_prompt, Jurisdiction};

pub const NO_RECOMMENDATION: &str = "No specific recommendation generated for this clause.";
const MIN_OUTPUT_CHARS: usize = 10;
const MIN_SUMMARY_CHARS: usize = 40;
const MAX_FALLBACK_TYPES: usize = 3;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Aggregates the summary prompt is built from.
#[derive(Debug, Clone, Default)]
pub struct SummaryStats {
    pub total: usize,
    pub compliant: usize,
    pub risky: usize,
    /// Distinct risky clause types, in document order.
    pub risky_types: Vec<String>,
}

pub struct Recommender {
    generator: Arc<dyn TextGenerator>,
}

impl Recommender {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// One suggestion per clause, in clause order.
    pub async fn clause_recommendations(
        &self,
        clauses: &[String],
        contract_type: &str,
        jurisdiction: Option<Jurisdiction>,
    ) -> Vec<String> {
        let prompts: Vec<String> = clauses
            .iter()
            .map(|c| clause_prompt(c, contract_type, jurisdiction))
            .collect();
        debug!("Requesting {} clause recommendations from {}", prompts.len(), self.generator.name());

        self.generator
            .generate_batch(&prompts)
            .await
            .into_iter()
            .map(|result| match result {
                Ok(raw) => {
                    let cleaned = clean_output(&raw);
                    if is_degenerate(&cleaned) {
                        NO_RECOMMENDATION.to_string()
                    } else {
                        cleaned
                    }
                }
                Err(e) => {
                    warn!("Clause recommendation failed: {}", e);
                    format!("Recommendation unavailable: {}", e)
                }
            })
            .collect()
    }

    /// Overall recommendation; falls back to a template on short, degenerate
    /// or failed output.
    pub async fn overall_summary(
        &self,
        stats: &SummaryStats,
        contract_type: &str,
        jurisdiction: Option<Jurisdiction>,
    ) -> String {
        let prompt = summary_prompt(
            contract_type,
            jurisdiction,
            stats.total,
            stats.compliant,
            stats.risky,
            &stats.risky_types,
        );
        match self.generator.generate(&prompt).await {
            Ok(raw) => {
                let cleaned = clean_output(&raw);
                if is_degenerate(&cleaned) || cleaned.chars().count() < MIN_SUMMARY_CHARS {
                    debug!("Summary too weak ({} chars), using fallback", cleaned.chars().count());
                    fallback_summary(stats, contract_type)
                } else {
                    cleaned
                }
            }
            Err(e) => {
                warn!("Summary generation failed: {}", e);
                fallback_summary(stats, contract_type)
            }
        }
    }
}

/// Strip markdown emphasis and collapse whitespace.
pub fn clean_output(raw: &str) -> String {
    let without_headings: Vec<&str> = raw
        .lines()
        .map(|line| line.trim_start().trim_start_matches('#'))
        .collect();
    let text = without_headings
        .join("\n")
        .replace("**", "")
        .replace("__", "")
        .replace(['*', '`'], "");
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// No alphabetic character, or too short to be a suggestion.
pub fn is_degenerate(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.chars().count() < MIN_OUTPUT_CHARS || !trimmed.chars().any(char::is_alphabetic)
}

pub fn fallback_summary(stats: &SummaryStats, contract_type: &str) -> String {
    let mut summary = format!(
        "This {} contains {} clauses, of which {} appear compliant and {} need review.",
        contract_type, stats.total, stats.compliant, stats.risky
    );
    if stats.risky_types.is_empty() {
        summary.push_str(" No high-risk clause types were identified.");
    } else {
        let types: Vec<&str> = stats
            .risky_types
            .iter()
            .take(MAX_FALLBACK_TYPES)
            .map(String::as_str)
            .collect();
        summary.push_str(&format!(
            " Prioritise revising the {} clauses before signing.",
            types.join(", ")
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clauselens_core::{Error, Result};

    /// Replies with a fixed string, or fails when the prompt contains "FAIL".
    struct ScriptedGenerator {
        reply: String,
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("FAIL") {
                Err(Error::Generation("quota exceeded".into()))
            } else {
                Ok(self.reply.clone())
            }
        }
    }

    fn recommender(reply: &str) -> Recommender {
        Recommender::new(Arc::new(ScriptedGenerator {
            reply: reply.to_string(),
        }))
    }

    fn stats() -> SummaryStats {
        SummaryStats {
            total: 6,
            compliant: 2,
            risky: 4,
            risky_types: vec![
                "Termination".into(),
                "Liability".into(),
                "Indemnification".into(),
                "Confidentiality".into(),
            ],
        }
    }

    #[test]
    fn test_clean_output() {
        assert_eq!(
            clean_output("## **Add** a `cap` on   __liability__.\n* Keep notice at 30 days."),
            "Add a cap on liability. Keep notice at 30 days."
        );
    }

    #[test]
    fn test_is_degenerate() {
        assert!(is_degenerate(""));
        assert!(is_degenerate("1234567890123"));
        assert!(is_degenerate("Add cap"));
        assert!(!is_degenerate("Add a liability cap."));
    }

    #[tokio::test]
    async fn test_clause_recommendations_cleaned_in_order() {
        let recs = recommender("**Specify** a payment deadline.")
            .clause_recommendations(&["Pay fees.".into(), "Keep secrets.".into()], "NDA", None)
            .await;
        assert_eq!(recs, vec!["Specify a payment deadline.", "Specify a payment deadline."]);
    }

    #[tokio::test]
    async fn test_failures_and_degenerate_output_become_placeholders() {
        let rec = recommender("...");
        let recs = rec
            .clause_recommendations(&["Normal clause.".into(), "FAIL this one.".into()], "NDA", None)
            .await;
        assert_eq!(recs[0], NO_RECOMMENDATION);
        assert_eq!(
            recs[1],
            "Recommendation unavailable: Generation error: quota exceeded"
        );
    }

    #[tokio::test]
    async fn test_short_summary_falls_back() {
        let summary = recommender("Looks fine.")
            .overall_summary(&stats(), "service agreement", None)
            .await;
        assert_eq!(summary, fallback_summary(&stats(), "service agreement"));
        assert!(summary.contains("6 clauses, of which 2 appear compliant and 4 need review"));
        assert!(summary.contains("Termination, Liability, Indemnification clauses"));
        assert!(!summary.contains("Confidentiality"));
    }

    #[tokio::test]
    async fn test_good_summary_kept() {
        let text = "Tighten the termination clause and add a mutual liability cap to reduce exposure.";
        let summary = recommender(text).overall_summary(&stats(), "lease", None).await;
        assert_eq!(summary, text);
    }

    #[test]
    fn test_fallback_without_risky_types() {
        let summary = fallback_summary(
            &SummaryStats {
                total: 2,
                compliant: 2,
                risky: 0,
                risky_types: Vec::new(),
            },
            "lease",
        );
        assert!(summary.ends_with("No high-risk clause types were identified."));
    }
}
