//! Sentence and clause segmentation.
//!
//! Clauses are built by accumulating sentences until the joined buffer
//! passes `MIN_CLAUSE_CHARS`. The splitter is length-based, not semantic: a
//! legal clause spanning many sentences may come out split.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// A clause must be longer than this many characters after trimming.
pub const MIN_CLAUSE_CHARS: usize = 40;

// Abbreviations that end a UAX #29 sentence but rarely end a real one.
// Corporate suffixes are usually followed by a defined-term parenthetical.
const ABBREVIATIONS: &[&str] = &[
    "Pvt.", "Ltd.", "Inc.", "Corp.", "Co.", "LLC.", "LLP.", "PLC.", "Mr.", "Mrs.", "Ms.", "Dr.",
    "Prof.", "No.", "Nos.", "Sr.", "Jr.", "St.", "vs.", "e.g.", "i.e.", "Art.", "Sec.", "Cl.",
    "approx.",
];

static ENUMERATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\(?(?:\d{1,3}(?:\.\d{1,3})*|[ivxIVX]{1,4}|[a-zA-Z])[.)]$")
        .expect("valid enumerator regex")
});

/// Split text into trimmed sentences in document order.
///
/// Uses Unicode sentence boundaries, then re-joins segments that end in a
/// known abbreviation or consist only of a list enumerator (`1.`, `(a)`).
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut pending = String::new();

    for raw in text.unicode_sentences() {
        let segment = raw.trim();
        if segment.is_empty() {
            continue;
        }
        if !pending.is_empty() {
            pending.push(' ');
        }
        pending.push_str(segment);

        let continues = ENUMERATOR_RE.is_match(segment)
            || ABBREVIATIONS.iter().any(|abbr| ends_with_word(&pending, abbr));
        if !continues {
            sentences.push(std::mem::take(&mut pending));
        }
    }
    if !pending.is_empty() {
        sentences.push(pending);
    }
    sentences
}

fn ends_with_word(text: &str, word: &str) -> bool {
    text.strip_suffix(word)
        .map(|head| head.is_empty() || head.ends_with(|c: char| c.is_whitespace() || c == '('))
        .unwrap_or(false)
}

/// Group sentences into clauses longer than `MIN_CLAUSE_CHARS`.
///
/// Every returned clause is trimmed and has more than `MIN_CLAUSE_CHARS`
/// characters; a short tail that cannot reach the threshold is dropped.
pub fn split_into_clauses(text: &str) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut buffer: Vec<String> = Vec::new();

    for sentence in split_sentences(text) {
        buffer.push(sentence);
        let joined = buffer.join(" ");
        if joined.chars().count() > MIN_CLAUSE_CHARS {
            clauses.push(joined);
            buffer.clear();
        }
    }
    if !buffer.is_empty() {
        clauses.push(buffer.join(" "));
    }

    clauses
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| c.chars().count() > MIN_CLAUSE_CHARS)
        .collect()
}

/// Clauses for analysis: `split_into_clauses`, or the whole trimmed text as a
/// single clause when segmentation finds none. Blank text yields no clauses.
pub fn clauses_or_whole_text(text: &str) -> Vec<String> {
    let clauses = split_into_clauses(text);
    if !clauses.is_empty() {
        return clauses;
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_string()]
    }
}
