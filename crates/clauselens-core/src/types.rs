//! Contract analysis data model, shared by the pipeline, the JSON API and
//! the report exporter.

use serde::{Deserialize, Serialize};

/// Label used when no clause type passes the match threshold.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Default contract type used in prompts when the client sends none.
pub const DEFAULT_CONTRACT_TYPE: &str = "general contract";

/// Derived compliance status of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    ReviewNeeded,
    NonCompliant,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliant => write!(f, "compliant"),
            Self::ReviewNeeded => write!(f, "review_needed"),
            Self::NonCompliant => write!(f, "non_compliant"),
        }
    }
}

/// Derived risk level of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Kind of a named entity that can be a contract party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Person,
    Org,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person => write!(f, "person"),
            Self::Org => write!(f, "org"),
        }
    }
}

/// One classified clause of a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    /// 1-based position in the document.
    pub id: usize,
    /// Matched clause types; `["Uncategorized"]` when nothing matched.
    #[serde(rename = "type")]
    pub types: Vec<String>,
    pub text: String,
    pub compliance_status: ComplianceStatus,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub recommendation: String,
}

impl Clause {
    /// First matched type, the one used for score weighting.
    pub fn primary_type(&self) -> &str {
        self.types.first().map(String::as_str).unwrap_or(UNCATEGORIZED)
    }
}

/// A person or organisation mentioned in the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Sentence the entity was first seen in.
    pub context: String,
}

/// Full result of analysing one uploaded contract.
///
/// Not stored server-side: clients send it back verbatim for PDF export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub file_name: Option<String>,
    /// Size of the saved upload in bytes.
    pub file_size: Option<u64>,
    #[serde(default)]
    pub file_url: Option<String>,
    /// RFC 3339 UTC timestamp, e.g. `2025-08-05T10:00:00.000Z`.
    pub uploaded_at: String,
    #[serde(default = "default_contract_type")]
    pub contract_type: String,
    pub extracted_text: String,
    pub clauses: Vec<Clause>,
    pub compliance_score: u8,
    pub total_clauses: usize,
    pub compliant_clauses: usize,
    pub risky_clauses: usize,
    /// Overall recommendation summary.
    pub recommendations: String,
    #[serde(default)]
    pub parties: Vec<Party>,
}

fn default_contract_type() -> String {
    DEFAULT_CONTRACT_TYPE.to_string()
}

impl AnalysisResult {
    /// Distinct primary types of non-compliant or review-needed clauses, in
    /// document order.
    pub fn risky_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for clause in &self.clauses {
            if clause.compliance_status != ComplianceStatus::Compliant {
                let t = clause.primary_type();
                if !types.iter().any(|existing| existing == t) {
                    types.push(t.to_string());
                }
            }
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(id: usize, types: &[&str], status: ComplianceStatus) -> Clause {
        Clause {
            id,
            types: types.iter().map(|t| t.to_string()).collect(),
            text: "The Client shall pay all invoices within thirty days.".into(),
            compliance_status: status,
            risk_level: RiskLevel::Medium,
            recommendation: String::new(),
        }
    }

    #[test]
    fn test_clause_json_shape() {
        let json = serde_json::to_value(clause(1, &["Payment Terms"], ComplianceStatus::ReviewNeeded))
            .unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["type"][0], "Payment Terms");
        assert_eq!(json["complianceStatus"], "review_needed");
        assert_eq!(json["riskLevel"], "medium");
        assert!(json["recommendation"].is_string());
    }

    #[test]
    fn test_party_json_shape() {
        let party = Party {
            name: "Alpha Tech Pvt. Ltd.".into(),
            kind: EntityKind::Org,
            context: "This Agreement is entered into by Alpha Tech Pvt. Ltd.".into(),
        };
        let json = serde_json::to_value(&party).unwrap();
        assert_eq!(json["type"], "org");
        assert_eq!(json["name"], "Alpha Tech Pvt. Ltd.");
    }

    #[test]
    fn test_risky_types_distinct_in_order() {
        let result = AnalysisResult {
            file_name: None,
            file_size: None,
            file_url: None,
            uploaded_at: "2025-08-05T10:00:00Z".into(),
            contract_type: DEFAULT_CONTRACT_TYPE.into(),
            extracted_text: String::new(),
            clauses: vec![
                clause(1, &["Termination"], ComplianceStatus::NonCompliant),
                clause(2, &["Payment Terms"], ComplianceStatus::Compliant),
                clause(3, &["Termination", "Liability"], ComplianceStatus::ReviewNeeded),
                clause(4, &["Liability"], ComplianceStatus::ReviewNeeded),
            ],
            compliance_score: 50,
            total_clauses: 4,
            compliant_clauses: 1,
            risky_clauses: 3,
            recommendations: String::new(),
            parties: Vec::new(),
        };
        assert_eq!(result.risky_types(), vec!["Termination", "Liability"]);
    }

    #[test]
    fn test_analysis_defaults_on_missing_optional_fields() {
        let json = serde_json::json!({
            "fileName": "nda.txt",
            "fileSize": 10,
            "uploadedAt": "2025-08-05T10:00:00Z",
            "extractedText": "",
            "clauses": [],
            "complianceScore": 0,
            "totalClauses": 0,
            "compliantClauses": 0,
            "riskyClauses": 0,
            "recommendations": "",
        });
        let parsed: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.contract_type, DEFAULT_CONTRACT_TYPE);
        assert!(parsed.parties.is_empty());
        assert!(parsed.file_url.is_none());
    }
}
