//! PDF report export.

use std::path::Path;

use axum::extract::rejection::JsonRejection;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use clauselens_core::AnalysisResult;
use tracing::info;

use crate::error::ApiError;
use crate::state::SharedState;

pub fn routes() -> Router<SharedState> {
    Router::new().route("/export-report", post(export_report))
}

/// POST /export-report: render an analysis result as a PDF download.
async fn export_report(
    payload: Result<Json<AnalysisResult>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(result) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let pdf = clauselens_report::render_report(&result)?;

    let file_name = result.file_name.as_deref().unwrap_or("contract");
    let disposition = format!("attachment; filename=\"{}\"", report_filename(file_name));
    info!("Exported report for {} ({} bytes)", file_name, pdf.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}

/// `<stem>_report.pdf`, restricted to header-safe characters.
fn report_filename(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("contract");
    let safe: String = stem
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();
    format!("{}_report.pdf", safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_filename() {
        assert_eq!(report_filename("msa.pdf"), "msa_report.pdf");
        assert_eq!(report_filename("Service Agreement.docx"), "Service Agreement_report.pdf");
        assert_eq!(report_filename("contrat\u{e9}\".txt"), "contrat___report.pdf");
    }
}
