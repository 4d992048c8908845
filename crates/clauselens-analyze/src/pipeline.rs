//! The analysis pipeline.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use clauselens_core::{
    AnalysisResult, Clause, ComplianceStatus, Error, Result, DEFAULT_CONTRACT_TYPE,
};
use clauselens_infer::{ClauseClassifier, EntityRecognizer};
use clauselens_ingest::{clauses_or_whole_text, extract_parties};
use clauselens_recommend::{Jurisdiction, Recommender, SummaryStats};
use tracing::{debug, info, warn};

use crate::scoring::{overall_score, score_clause, ClauseScore};

/// Per-request analysis options.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub contract_type: String,
    pub jurisdiction: Option<Jurisdiction>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            contract_type: DEFAULT_CONTRACT_TYPE.to_string(),
            jurisdiction: None,
        }
    }
}

impl AnalyzeOptions {
    /// Build from optional form values; blank contract types use the default
    /// and unrecognised jurisdictions frame against all three regimes.
    pub fn from_form(contract_type: Option<&str>, jurisdiction: Option<&str>) -> Self {
        let contract_type = contract_type
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CONTRACT_TYPE)
            .to_string();
        let jurisdiction = jurisdiction.filter(|j| !j.trim().is_empty()).and_then(|j| {
            let parsed = Jurisdiction::parse(j);
            if parsed.is_none() {
                warn!("Unknown jurisdiction '{}', using combined framing", j);
            }
            parsed
        });
        Self {
            contract_type,
            jurisdiction,
        }
    }
}

/// Runs the full clause analysis over extracted contract text.
pub struct Analyzer {
    classifier: Arc<dyn ClauseClassifier>,
    recognizer: Arc<dyn EntityRecognizer>,
    recommender: Recommender,
}

impl Analyzer {
    pub fn new(
        classifier: Arc<dyn ClauseClassifier>,
        recognizer: Arc<dyn EntityRecognizer>,
        recommender: Recommender,
    ) -> Self {
        Self {
            classifier,
            recognizer,
            recommender,
        }
    }

    /// Analyse `text`. Classification errors propagate; party extraction and
    /// recommendation failures degrade. File metadata is left unset.
    pub async fn analyze(&self, text: &str, options: &AnalyzeOptions) -> Result<AnalysisResult> {
        let clause_texts = clauses_or_whole_text(text);
        info!(
            "Analysing {} ({} chars, {} clauses, generator={})",
            options.contract_type,
            text.len(),
            clause_texts.len(),
            self.recommender.generator_name()
        );

        let probabilities = self.classify(&clause_texts).await?;
        let labels = self.classifier.labels();
        let scores: Vec<ClauseScore> = probabilities
            .iter()
            .map(|probs| score_clause(labels, probs))
            .collect();

        let parties = self.parties(text).await;

        let recommendations = self
            .recommender
            .clause_recommendations(&clause_texts, &options.contract_type, options.jurisdiction)
            .await;

        let clauses: Vec<Clause> = clause_texts
            .into_iter()
            .zip(scores.iter())
            .zip(recommendations)
            .enumerate()
            .map(|(i, ((text, score), recommendation))| Clause {
                id: i + 1,
                types: score.types.clone(),
                text,
                compliance_status: score.status,
                risk_level: score.risk,
                recommendation,
            })
            .collect();

        let total = clauses.len();
        let compliant = clauses
            .iter()
            .filter(|c| c.compliance_status == ComplianceStatus::Compliant)
            .count();

        let mut result = AnalysisResult {
            file_name: None,
            file_size: None,
            file_url: None,
            uploaded_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            contract_type: options.contract_type.clone(),
            extracted_text: text.to_string(),
            clauses,
            compliance_score: overall_score(&scores),
            total_clauses: total,
            compliant_clauses: compliant,
            risky_clauses: total - compliant,
            recommendations: String::new(),
            parties,
        };

        let stats = SummaryStats {
            total,
            compliant,
            risky: total - compliant,
            risky_types: result.risky_types(),
        };
        result.recommendations = self
            .recommender
            .overall_summary(&stats, &options.contract_type, options.jurisdiction)
            .await;

        info!(
            "Analysis complete: score={}, compliant={}/{}, parties={}",
            result.compliance_score,
            result.compliant_clauses,
            result.total_clauses,
            result.parties.len()
        );
        Ok(result)
    }

    async fn classify(&self, clauses: &[String]) -> Result<Vec<Vec<f32>>> {
        if clauses.is_empty() {
            return Ok(Vec::new());
        }
        let classifier = Arc::clone(&self.classifier);
        let batch = clauses.to_vec();
        let probabilities = tokio::task::spawn_blocking(move || classifier.classify(&batch))
            .await
            .map_err(|e| Error::Internal(format!("Classification task failed: {}", e)))??;

        if probabilities.len() != clauses.len() {
            return Err(Error::Inference(format!(
                "Classifier returned {} rows for {} clauses",
                probabilities.len(),
                clauses.len()
            )));
        }
        debug!("Classified {} clauses", clauses.len());
        Ok(probabilities)
    }

    async fn parties(&self, text: &str) -> Vec<clauselens_core::Party> {
        let recognizer = Arc::clone(&self.recognizer);
        let text = text.to_string();
        match tokio::task::spawn_blocking(move || extract_parties(&text, recognizer.as_ref())).await {
            Ok(parties) => parties,
            Err(e) => {
                warn!("Party extraction task failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clauselens_core::RiskLevel;
    use clauselens_infer::HeuristicRecognizer;
    use clauselens_recommend::TextGenerator;

    /// Scores clauses mentioning "pay" as confident Payment Terms, everything
    /// else as weak Termination.
    struct KeywordClassifier {
        labels: Vec<String>,
    }

    impl KeywordClassifier {
        fn new() -> Self {
            Self {
                labels: vec!["Payment Terms".into(), "Termination".into()],
            }
        }
    }

    impl ClauseClassifier for KeywordClassifier {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn classify(&self, clauses: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(clauses
                .iter()
                .map(|c| {
                    if c.contains("pay") {
                        vec![0.875, 0.8]
                    } else {
                        vec![0.2, 0.6]
                    }
                })
                .collect())
        }
    }

    struct BrokenClassifier;

    impl ClauseClassifier for BrokenClassifier {
        fn labels(&self) -> &[String] {
            &[]
        }

        fn classify(&self, _clauses: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(Error::Inference("session poisoned".into()))
        }
    }

    struct FixedGenerator;

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn generate(&self, prompt: &str) -> Result<String> {
            if prompt.contains("overall recommendation") {
                Ok("Revise the termination clause to require written notice and a cure period.".into())
            } else {
                Ok("Add a clear deadline for each obligation.".into())
            }
        }
    }

    fn analyzer(classifier: Arc<dyn ClauseClassifier>) -> Analyzer {
        Analyzer::new(
            classifier,
            Arc::new(HeuristicRecognizer::new()),
            Recommender::new(Arc::new(FixedGenerator)),
        )
    }

    #[tokio::test]
    async fn test_single_payment_clause() {
        let text = "A agrees to pay B $100. This clause is confidential and binding for 30 days.";
        let result = analyzer(Arc::new(KeywordClassifier::new()))
            .analyze(text, &AnalyzeOptions::default())
            .await
            .unwrap();

        assert_eq!(result.total_clauses, 1);
        let clause = &result.clauses[0];
        assert_eq!(clause.id, 1);
        assert_eq!(clause.text, text);
        assert_eq!(clause.types, vec!["Payment Terms", "Termination"]);
        assert_eq!(clause.compliance_status, ComplianceStatus::Compliant);
        assert_eq!(clause.risk_level, RiskLevel::Low);
        assert_eq!(clause.recommendation, "Add a clear deadline for each obligation.");
        assert_eq!(result.compliance_score, 87);
        assert_eq!(result.compliant_clauses, 1);
        assert_eq!(result.risky_clauses, 0);
        assert_eq!(result.contract_type, "general contract");
        assert!(result.file_name.is_none());
        assert!(result.uploaded_at.ends_with('Z'));
    }

    #[tokio::test]
    async fn test_counts_and_summary() {
        let text = "The Client shall pay all invoices within fifteen days of receipt. \
                    Either party may terminate this Agreement with thirty days notice. \
                    This Agreement is governed by the laws of India and its courts.";
        let result = analyzer(Arc::new(KeywordClassifier::new()))
            .analyze(text, &AnalyzeOptions::from_form(Some("service agreement"), Some("India")))
            .await
            .unwrap();

        assert_eq!(result.total_clauses, 3);
        assert_eq!(result.compliant_clauses, 1);
        assert_eq!(result.risky_clauses, 2);
        assert_eq!(result.total_clauses, result.clauses.len());
        assert_eq!(result.contract_type, "service agreement");
        assert!(result.recommendations.starts_with("Revise the termination clause"));
        let ids: Vec<usize> = result.clauses.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_short_text_is_one_clause() {
        let result = analyzer(Arc::new(KeywordClassifier::new()))
            .analyze("Term: one year.", &AnalyzeOptions::default())
            .await
            .unwrap();
        assert_eq!(result.total_clauses, 1);
        assert_eq!(result.clauses[0].text, "Term: one year.");
    }

    #[tokio::test]
    async fn test_empty_text_scores_zero() {
        let result = analyzer(Arc::new(BrokenClassifier))
            .analyze("   ", &AnalyzeOptions::default())
            .await
            .unwrap();
        assert_eq!(result.total_clauses, 0);
        assert_eq!(result.compliance_score, 0);
        assert!(!result.recommendations.is_empty());
    }

    #[tokio::test]
    async fn test_classifier_failure_propagates() {
        let err = analyzer(Arc::new(BrokenClassifier))
            .analyze("The Supplier shall deliver all goods to the Buyer's warehouse.", &AnalyzeOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));
    }

    #[test]
    fn test_options_from_form() {
        let opts = AnalyzeOptions::from_form(Some("  "), Some("atlantis"));
        assert_eq!(opts.contract_type, DEFAULT_CONTRACT_TYPE);
        assert_eq!(opts.jurisdiction, None);
        let opts = AnalyzeOptions::from_form(None, Some("EU"));
        assert_eq!(opts.jurisdiction, Some(Jurisdiction::EuGdpr));
    }
}
