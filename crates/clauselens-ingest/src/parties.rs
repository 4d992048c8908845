//! Contract party extraction over sentence-level NER.

use std::collections::HashSet;

use clauselens_core::{EntityKind, Party};
use clauselens_infer::{EntityRecognizer, MentionKind};
use tracing::{debug, warn};

use crate::segment::split_sentences;

/// Collect people and organisations mentioned in `text`.
///
/// Mentions are deduplicated by exact surface text; the first occurrence
/// wins and carries its sentence as context. A recognizer failure yields an
/// empty list.
pub fn extract_parties(text: &str, recognizer: &dyn EntityRecognizer) -> Vec<Party> {
    let mut parties = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for sentence in split_sentences(text) {
        let mentions = match recognizer.recognize(&sentence) {
            Ok(m) => m,
            Err(e) => {
                warn!("Party extraction failed ({}): {}", recognizer.name(), e);
                return Vec::new();
            }
        };

        for mention in mentions {
            let kind = match mention.kind {
                MentionKind::Person => EntityKind::Person,
                MentionKind::Org => EntityKind::Org,
                MentionKind::Other => continue,
            };
            if seen.insert(mention.text.clone()) {
                parties.push(Party {
                    name: mention.text,
                    kind,
                    context: sentence.trim().to_string(),
                });
            }
        }
    }

    debug!("Extracted {} parties via {}", parties.len(), recognizer.name());
    parties
}
