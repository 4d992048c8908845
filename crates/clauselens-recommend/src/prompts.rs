//! Prompt construction for clause and summary recommendations.

use serde::{Deserialize, Serialize};

/// Legal regime a recommendation is framed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Jurisdiction {
    India,
    EuGdpr,
    UsCcpa,
}

impl Jurisdiction {
    /// Lenient parse of a form value such as `"India"`, `"EU"` or `"ccpa"`.
    pub fn parse(value: &str) -> Option<Self> {
        let v = value.trim().to_lowercase();
        match v.as_str() {
            "india" | "in" | "indian" => Some(Self::India),
            "eu" | "gdpr" | "eu-gdpr" | "eu_gdpr" | "europe" => Some(Self::EuGdpr),
            "us" | "usa" | "ccpa" | "us-ccpa" | "us_ccpa" | "california" => Some(Self::UsCcpa),
            _ => None,
        }
    }

    fn framing(&self) -> &'static str {
        match self {
            Self::India => "Indian contract law (Indian Contract Act, 1872)",
            Self::EuGdpr => "the EU General Data Protection Regulation (GDPR)",
            Self::UsCcpa => "the California Consumer Privacy Act (CCPA)",
        }
    }
}

fn framing(jurisdiction: Option<Jurisdiction>) -> String {
    match jurisdiction {
        Some(j) => j.framing().to_string(),
        None => format!(
            "{}, {} and {}",
            Jurisdiction::India.framing(),
            Jurisdiction::EuGdpr.framing(),
            Jurisdiction::UsCcpa.framing()
        ),
    }
}

/// Instruction for a single clause suggestion.
pub fn clause_prompt(clause: &str, contract_type: &str, jurisdiction: Option<Jurisdiction>) -> String {
    format!(
        "You are a legal compliance reviewer. Review the following clause from a {} \
         for compliance with {}. Suggest one concrete improvement in 1-2 sentences \
         and at most 50 words. Reply with the suggestion only.\n\nClause:\n{}",
        contract_type,
        framing(jurisdiction),
        clause.trim()
    )
}

/// Instruction for the overall summary, built from aggregate counts.
pub fn summary_prompt(
    contract_type: &str,
    jurisdiction: Option<Jurisdiction>,
    total: usize,
    compliant: usize,
    risky: usize,
    risky_types: &[String],
) -> String {
    let types = if risky_types.is_empty() {
        "none".to_string()
    } else {
        risky_types.join(", ")
    };
    format!(
        "You are a legal compliance reviewer. A {} was checked against {}. \
         It has {} clauses: {} compliant and {} needing review. \
         Clause types needing attention: {}. \
         Write a short overall recommendation of 2-4 sentences on how to improve \
         the contract's compliance. Reply with the recommendation only.",
        contract_type,
        framing(jurisdiction),
        total,
        compliant,
        risky,
        types
    )
}
