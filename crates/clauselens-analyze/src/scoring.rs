//! Per-clause status/risk and the weighted overall compliance score.

use clauselens_core::{ComplianceStatus, RiskLevel, UNCATEGORIZED};

/// Probability a label must exceed to count as matched.
pub const MATCH_THRESHOLD: f32 = 0.5;
const HIGH_CONFIDENCE: f32 = 0.75;

const TYPE_WEIGHTS: &[(&str, f32)] = &[
    ("Indemnification", 2.0),
    ("Termination", 1.5),
    ("Confidentiality", 1.2),
    ("Payment Terms", 1.0),
    ("Liability", 1.0),
];
const DEFAULT_WEIGHT: f32 = 0.5;

/// Scoring outcome for one clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseScore {
    /// Matched labels in label order, or `["Uncategorized"]`.
    pub types: Vec<String>,
    pub status: ComplianceStatus,
    pub risk: RiskLevel,
    /// Highest label probability.
    pub max_probability: f32,
}

impl ClauseScore {
    pub fn primary_type(&self) -> &str {
        self.types.first().map(String::as_str).unwrap_or(UNCATEGORIZED)
    }
}

pub fn status_for(average: f32) -> ComplianceStatus {
    if average > HIGH_CONFIDENCE {
        ComplianceStatus::Compliant
    } else if average > MATCH_THRESHOLD {
        ComplianceStatus::ReviewNeeded
    } else {
        ComplianceStatus::NonCompliant
    }
}

pub fn risk_for(max: f32) -> RiskLevel {
    if max > HIGH_CONFIDENCE {
        RiskLevel::Low
    } else if max > MATCH_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// Score one clause from its label probabilities. An empty vector scores 0.
pub fn score_clause(labels: &[String], probabilities: &[f32]) -> ClauseScore {
    let mut types: Vec<String> = labels
        .iter()
        .zip(probabilities)
        .filter(|(_, p)| **p > MATCH_THRESHOLD)
        .map(|(label, _)| label.clone())
        .collect();
    if types.is_empty() {
        types.push(UNCATEGORIZED.to_string());
    }

    let (average, max) = if probabilities.is_empty() {
        (0.0, 0.0)
    } else {
        let sum: f32 = probabilities.iter().sum();
        let max = probabilities.iter().copied().fold(f32::MIN, f32::max);
        (sum / probabilities.len() as f32, max)
    };

    ClauseScore {
        types,
        status: status_for(average),
        risk: risk_for(max),
        max_probability: max,
    }
}

/// Weight of a clause type; unlisted labels and `Uncategorized` weigh 0.5.
pub fn type_weight(clause_type: &str) -> f32 {
    TYPE_WEIGHTS
        .iter()
        .find(|(name, _)| *name == clause_type)
        .map(|(_, w)| *w)
        .unwrap_or(DEFAULT_WEIGHT)
}

/// Weighted mean of max probabilities as an integer percentage, truncated.
/// No clauses scores 0.
pub fn overall_score(scores: &[ClauseScore]) -> u8 {
    let (weighted, total_weight) = scores.iter().fold((0.0f64, 0.0f64), |(acc, w), s| {
        let weight = type_weight(s.primary_type()) as f64;
        (acc + s.max_probability as f64 * weight, w + weight)
    });
    if total_weight <= 0.0 {
        return 0;
    }
    (100.0 * weighted / total_weight).floor().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        ["Payment Terms", "Confidentiality", "Termination"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_high_confidence_payment_clause() {
        let score = score_clause(&labels(), &[0.92, 0.81, 0.78]);
        assert_eq!(score.types, labels());
        assert_eq!(score.status, ComplianceStatus::Compliant);
        assert_eq!(score.risk, RiskLevel::Low);
        assert_eq!(score.primary_type(), "Payment Terms");
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        assert_eq!(status_for(0.75), ComplianceStatus::ReviewNeeded);
        assert_eq!(status_for(0.5), ComplianceStatus::NonCompliant);
        assert_eq!(risk_for(0.76), RiskLevel::Low);
        assert_eq!(risk_for(0.75), RiskLevel::Medium);
        assert_eq!(risk_for(0.5), RiskLevel::High);
    }

    #[test]
    fn test_no_match_is_uncategorized() {
        let score = score_clause(&labels(), &[0.1, 0.2, 0.5]);
        assert_eq!(score.types, vec![UNCATEGORIZED.to_string()]);
        assert_eq!(score.status, ComplianceStatus::NonCompliant);
        assert_eq!(score.risk, RiskLevel::High);
    }

    #[test]
    fn test_empty_probabilities() {
        let score = score_clause(&[], &[]);
        assert_eq!(score.max_probability, 0.0);
        assert_eq!(score.status, ComplianceStatus::NonCompliant);
        assert_eq!(score.risk, RiskLevel::High);
    }

    #[test]
    fn test_weights() {
        assert_eq!(type_weight("Indemnification"), 2.0);
        assert_eq!(type_weight("Termination"), 1.5);
        assert_eq!(type_weight(UNCATEGORIZED), 0.5);
        assert_eq!(type_weight("Force Majeure"), 0.5);
    }

    #[test]
    fn test_overall_score_weighted_by_first_label() {
        let scores = vec![
            score_clause(&labels(), &[0.9, 0.1, 0.1]),
            score_clause(&["Indemnification".to_string()], &[0.6]),
        ];
        // (0.9 * 1.0 + 0.6 * 2.0) / 3.0 = 0.7
        assert_eq!(overall_score(&scores), 70);
        assert_eq!(overall_score(&[]), 0);
    }

    #[test]
    fn test_overall_score_bounds() {
        let scores = vec![score_clause(&labels(), &[1.0, 1.0, 1.0])];
        assert_eq!(overall_score(&scores), 100);
    }
}
