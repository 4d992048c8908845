//! Named-entity recognition backends for contract party extraction.
//!
//! `EntityRecognizer` works on one sentence at a time so callers get the
//! containing sentence for free. Implementations:
//! - `OnnxRecognizer`: token-classification model (requires `onnx`)
//! - `HeuristicRecognizer`: regex patterns over capitalised names and
//!   corporate suffixes, used when no NER model is installed

use std::collections::HashSet;

use clauselens_core::Result;
use once_cell::sync::Lazy;
use regex::Regex;

/// Entity category as reported by a recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MentionKind {
    Person,
    Org,
    Other,
}

impl MentionKind {
    /// Map a model tag (`PER`, `PERSON`, `ORG`, ...) to a kind.
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "PER" | "PERSON" => Self::Person,
            "ORG" | "ORGANIZATION" | "ORGANISATION" => Self::Org,
            _ => Self::Other,
        }
    }
}

/// An entity mention inside one sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMention {
    pub text: String,
    pub kind: MentionKind,
}

/// Sentence-level NER.
pub trait EntityRecognizer: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &str;

    /// Entity mentions in `sentence`, in order of appearance.
    fn recognize(&self, sentence: &str) -> Result<Vec<EntityMention>>;
}

/// Group per-token BIO tags into entity spans.
///
/// `tokens` holds `(tag, byte_start, byte_end)` per token; `(0, 0)` offsets
/// mark special tokens and are skipped. Returns `(entity_type, start, end)`.
pub fn decode_bio(tokens: &[(String, usize, usize)]) -> Vec<(String, usize, usize)> {
    let mut spans: Vec<(String, usize, usize)> = Vec::new();
    let mut current: Option<(String, usize, usize)> = None;

    for (tag, start, end) in tokens {
        if *start == 0 && *end == 0 {
            continue;
        }
        let (prefix, entity) = match tag.split_once('-') {
            Some((p, e)) if p == "B" || p == "I" => (p, e),
            _ if tag == "O" => ("O", ""),
            _ => ("I", tag.as_str()),
        };

        match prefix {
            "B" => {
                if let Some(span) = current.take() {
                    spans.push(span);
                }
                current = Some((entity.to_string(), *start, *end));
            }
            "I" => match current.as_mut() {
                Some(span) if span.0 == entity => span.2 = *end,
                _ => {
                    if let Some(span) = current.take() {
                        spans.push(span);
                    }
                    current = Some((entity.to_string(), *start, *end));
                }
            },
            _ => {
                if let Some(span) = current.take() {
                    spans.push(span);
                }
            }
        }
    }
    if let Some(span) = current.take() {
        spans.push(span);
    }
    spans
}

static ORG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b[A-Z][\w&'-]*(?:\s+[A-Z][\w&'-]*)*\s+(?:Pvt\.\s+Ltd\.|Private\s+Limited|Inc\.|Inc\b|Corp\.|Corporation|LLC|LLP|Ltd\.|Limited|Co\.|GmbH|PLC)",
    )
    .expect("valid org regex")
});

static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)?)")
        .expect("valid title regex")
});

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+\s+[A-Z][a-z]+\b").expect("valid name regex"));

// Capitalised vocabulary that forms word pairs in contracts without naming anyone.
static CONTRACT_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "The", "This", "That", "These", "Such", "Any", "All", "Each", "Either", "Both", "No",
        "In", "On", "Upon", "If", "For", "By", "Of", "And", "Between", "Whereas", "Now",
        "Therefore", "Witness", "Agreement", "Contract", "Party", "Parties", "Service",
        "Services", "Provider", "Client", "Company", "Customer", "Vendor", "Supplier",
        "Contractor", "Consultant", "Employee", "Employer", "Licensor", "Licensee", "Buyer",
        "Seller", "Confidential", "Confidentiality", "Information", "Governing", "Law", "Laws",
        "Terms", "Term", "Termination", "Payment", "Payments", "Effective", "Date", "Section",
        "Clause", "Article", "Schedule", "Exhibit", "Annex", "Appendix", "Notice", "Written",
        "Intellectual", "Property", "Force", "Majeure", "Indemnification", "Indemnity",
        "Liability", "Limitation", "Warranty", "Warranties", "Dispute", "Resolution", "Entire",
        "Signature", "Name", "Title", "General", "Data", "Protection", "Regulation", "Privacy",
        "Act", "Court", "Courts", "State", "States", "United", "Kingdom", "European", "Union",
        "India", "Republic", "Software", "Website", "Statement", "Work", "Order", "Purchase",
        "Master", "Non", "Disclosure", "Maintenance", "Fees", "Price", "Invoice", "January",
        "February", "March", "April", "May", "June", "July", "August", "September", "October",
        "November", "December", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday",
        "Saturday", "Sunday",
    ]
    .into_iter()
    .collect()
});

const LEADING_WORDS: &[&str] = &["The", "This", "Between", "And", "By", "With", "Whereas"];

/// Regex-based recognizer for people and organisations.
#[derive(Debug, Default, Clone)]
pub struct HeuristicRecognizer;

impl HeuristicRecognizer {
    pub fn new() -> Self {
        Self
    }

    fn organizations(sentence: &str) -> Vec<(usize, usize, String)> {
        ORG_RE
            .find_iter(sentence)
            .filter_map(|m| {
                // Drop leading function words and all-caps headings swept up
                // by the name pattern.
                let mut rest = m.as_str();
                while let Some((first, tail)) = rest.split_once(char::is_whitespace) {
                    let heading = first.len() > 3 && first.chars().all(|c| c.is_ascii_uppercase());
                    if LEADING_WORDS.contains(&first) || heading {
                        rest = tail.trim_start();
                    } else {
                        break;
                    }
                }
                if rest.split_whitespace().count() < 2 {
                    return None;
                }
                Some((m.end() - rest.len(), m.end(), rest.to_string()))
            })
            .collect()
    }

    fn persons(sentence: &str, taken: &[(usize, usize, String)]) -> Vec<(usize, String)> {
        let overlaps = |s: usize, e: usize| taken.iter().any(|(ts, te, _)| s < *te && *ts < e);
        let mut persons: Vec<(usize, String)> = Vec::new();

        for cap in TITLE_RE.captures_iter(sentence) {
            if let Some(m) = cap.get(1) {
                if !overlaps(m.start(), m.end()) {
                    persons.push((m.start(), m.as_str().to_string()));
                }
            }
        }

        for m in NAME_RE.find_iter(sentence) {
            if overlaps(m.start(), m.end()) {
                continue;
            }
            if m.as_str().split_whitespace().any(|w| CONTRACT_WORDS.contains(w)) {
                continue;
            }
            let name = m.as_str().to_string();
            if !persons.iter().any(|(_, p)| p.contains(&name) || name.contains(p.as_str())) {
                persons.push((m.start(), name));
            }
        }
        persons
    }
}

impl EntityRecognizer for HeuristicRecognizer {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn recognize(&self, sentence: &str) -> Result<Vec<EntityMention>> {
        let orgs = Self::organizations(sentence);
        let persons = Self::persons(sentence, &orgs);

        let mut found: Vec<(usize, EntityMention)> = orgs
            .into_iter()
            .map(|(start, _, text)| {
                (
                    start,
                    EntityMention {
                        text,
                        kind: MentionKind::Org,
                    },
                )
            })
            .chain(persons.into_iter().map(|(start, text)| {
                (
                    start,
                    EntityMention {
                        text,
                        kind: MentionKind::Person,
                    },
                )
            }))
            .collect();
        found.sort_by_key(|(start, _)| *start);
        Ok(found.into_iter().map(|(_, m)| m).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(tag: &str, s: usize, e: usize) -> (String, usize, usize) {
        (tag.to_string(), s, e)
    }

    #[test]
    fn test_decode_bio_groups_spans() {
        // "[CLS] John Smith joined Acme [SEP]"
        let tokens = vec![
            tok("O", 0, 0),
            tok("B-PER", 0, 4),
            tok("I-PER", 5, 10),
            tok("O", 11, 17),
            tok("B-ORG", 18, 22),
            tok("O", 0, 0),
        ];
        let spans = decode_bio(&tokens);
        assert_eq!(spans, vec![("PER".to_string(), 0, 10), ("ORG".to_string(), 18, 22)]);
    }

    #[test]
    fn test_decode_bio_type_change_starts_new_span() {
        let tokens = vec![tok("I-ORG", 1, 5), tok("I-PER", 6, 9)];
        let spans = decode_bio(&tokens);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].0, "ORG");
        assert_eq!(spans[1].0, "PER");
    }

    #[test]
    fn test_mention_kind_from_tag() {
        assert_eq!(MentionKind::from_tag("PER"), MentionKind::Person);
        assert_eq!(MentionKind::from_tag("org"), MentionKind::Org);
        assert_eq!(MentionKind::from_tag("LOC"), MentionKind::Other);
    }

    #[test]
    fn test_heuristic_finds_organizations() {
        let sentence = "This Agreement is entered into on 05 August 2025 between Alpha Tech Pvt. Ltd. (\"Service Provider\") and Beta Solutions Inc. (\"Client\").";
        let mentions = HeuristicRecognizer::new().recognize(sentence).unwrap();
        let orgs: Vec<&str> = mentions
            .iter()
            .filter(|m| m.kind == MentionKind::Org)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(orgs, vec!["Alpha Tech Pvt. Ltd.", "Beta Solutions Inc."]);
        assert!(!mentions.iter().any(|m| m.text == "Service Provider"));
    }

    #[test]
    fn test_heuristic_finds_persons() {
        let sentence = "Signed by Dr. Priya Sharma and witnessed by John Carter on behalf of the Client.";
        let mentions = HeuristicRecognizer::new().recognize(sentence).unwrap();
        let persons: Vec<&str> = mentions
            .iter()
            .filter(|m| m.kind == MentionKind::Person)
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(persons, vec!["Priya Sharma", "John Carter"]);
    }

    #[test]
    fn test_heuristic_skips_contract_vocabulary() {
        let sentence = "Governing Law: This Agreement shall be governed by the laws of India.";
        let mentions = HeuristicRecognizer::new().recognize(sentence).unwrap();
        assert!(mentions.is_empty());
    }
}
