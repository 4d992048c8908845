//! ClauseLens Core: configuration, contract analysis data model, errors.

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DataPaths};
pub use error::{Error, Result};
pub use types::{
    AnalysisResult, Clause, ComplianceStatus, EntityKind, Party, RiskLevel, DEFAULT_CONTRACT_TYPE,
    UNCATEGORIZED,
};
