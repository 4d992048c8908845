//! Contract upload and analysis.

use std::path::{Path, PathBuf};

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use clauselens_analyze::AnalyzeOptions;
use clauselens_core::{AnalysisResult, Error};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::ApiError;
use crate::state::SharedState;

const MAX_RENAME_ATTEMPTS: usize = 1000;

pub fn routes(max_upload_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/upload", post(upload_contract))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    contract_type: Option<String>,
    jurisdiction: Option<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        file: None,
        contract_type: None,
        jurisdiction: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::validation(format!("Failed to read upload: {}", e)))?;
                form.file = Some((filename, bytes.to_vec()));
            }
            "contract_type" | "jurisdiction" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::validation(format!("Invalid form field: {}", e)))?;
                if name == "contract_type" {
                    form.contract_type = Some(value);
                } else {
                    form.jurisdiction = Some(value);
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

/// POST /upload: save, extract and analyse a contract.
async fn upload_contract(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<AnalysisResult>, ApiError> {
    let form = read_form(multipart).await?;

    let (filename, bytes) = form
        .file
        .ok_or_else(|| ApiError::validation("No file part"))?;
    if filename.trim().is_empty() {
        return Err(ApiError::validation("No selected file"));
    }
    let safe_filename = sanitize_filename(&filename);
    if !clauselens_ingest::is_allowed(&safe_filename) {
        return Err(ApiError::validation("File type not allowed"));
    }

    let final_path = save_unique(&state.config.data_paths.uploads, &safe_filename, &bytes).await?;
    let final_filename = final_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(&safe_filename)
        .to_string();
    let file_size = tokio::fs::metadata(&final_path).await?.len();
    info!("Saved upload {} ({} bytes)", final_filename, file_size);

    let extract_path = final_path.clone();
    let text = tokio::task::spawn_blocking(move || clauselens_ingest::extract_text(&extract_path))
        .await
        .map_err(|e| Error::Internal(format!("Extraction task failed: {}", e)))?;

    let options = AnalyzeOptions::from_form(form.contract_type.as_deref(), form.jurisdiction.as_deref());
    let mut result = state.analyzer.analyze(&text, &options).await?;
    result.file_url = Some(state.config.upload_url(&final_filename));
    result.file_name = Some(final_filename);
    result.file_size = Some(file_size);

    Ok(Json(result))
}

/// Strip directory components from a client-supplied file name.
pub fn sanitize_filename(name: &str) -> String {
    let name = name
        .replace('/', "")
        .replace('\\', "")
        .replace("..", "")
        .replace(|c: char| c.is_control() || (c.is_whitespace() && c != ' '), "");

    Path::new(name.trim())
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unnamed")
        .to_string()
}

/// Candidate names for an upload: `name`, then `stem_<timestamp>.ext`,
/// then `stem_<timestamp>_<n>.ext` for n = 1, 2, ...
fn upload_candidate(name: &str, ts: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("file");
    let suffix = if attempt == 1 {
        ts.to_string()
    } else {
        format!("{}_{}", ts, attempt - 1)
    };
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}_{}.{}", stem, suffix, ext),
        _ => format!("{}_{}", stem, suffix),
    }
}

/// Write `bytes` under `dir` without replacing an existing file.
/// Creation is exclusive, so concurrent uploads of one name never collide.
async fn save_unique(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let ts = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();
    for attempt in 0..MAX_RENAME_ATTEMPTS {
        let path = dir.join(upload_candidate(name, &ts, attempt));
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.write_all(bytes).await?;
                file.flush().await?;
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::AlreadyExists,
        format!("No free upload name for {}", name),
    ))
}
