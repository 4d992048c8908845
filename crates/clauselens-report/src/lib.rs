//! PDF report rendering for analysis results.

pub mod layout;
pub mod pdf;

pub use layout::{report_lines, Line};
pub use pdf::render_report;
