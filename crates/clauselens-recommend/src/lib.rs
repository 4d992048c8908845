//! Natural-language improvement suggestions for contract clauses.
//!
//! Generation goes through the `TextGenerator` capability: a remote
//! chat-completion API or a local seq2seq model, picked by configuration.

pub mod config;
pub mod generator;
pub mod local;
pub mod prompts;
pub mod providers;
pub mod recommender;
pub mod types;

pub use config::{GeneratorBackend, GeneratorConfig};
pub use generator::TextGenerator;
pub use local::LocalGenerator;
pub use prompts::Jurisdiction;
pub use providers::RemoteGenerator;
pub use recommender::{Recommender, SummaryStats};
pub use types::LLMProvider;
