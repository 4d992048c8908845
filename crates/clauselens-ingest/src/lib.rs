//! ClauseLens Ingest: file text extraction, sentence and clause
//! segmentation, contract party extraction.

pub mod file;
pub mod parties;
pub mod segment;

pub use file::{extract_text, is_allowed, FileType, ALLOWED_EXTENSIONS};
pub use parties::extract_parties;
pub use segment::{clauses_or_whole_text, split_into_clauses, split_sentences, MIN_CLAUSE_CHARS};
