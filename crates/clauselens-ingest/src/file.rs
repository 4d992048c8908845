//! Contract text extraction for accepted upload formats.

use std::io::Read;
use std::path::Path;

use clauselens_core::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Upload extensions accepted by the API.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

/// Supported file types for text extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    PlainText,
    Pdf,
    Docx,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" => Self::PlainText,
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            _ => Self::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(path.extension().and_then(|e| e.to_str()).unwrap_or(""))
    }
}

/// Whether `filename` has an accepted extension.
pub fn is_allowed(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// Extract text from a saved upload.
///
/// Never fails: unreadable or corrupt files yield an empty string so the
/// analysis degrades instead of aborting.
pub fn extract_text(path: &Path) -> String {
    match try_extract_text(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Text extraction failed for {}: {}", path.display(), e);
            String::new()
        }
    }
}

/// Extract text, reporting failures.
pub fn try_extract_text(path: &Path) -> Result<String> {
    match FileType::from_path(path) {
        // pdf-extract panics on some malformed font tables.
        FileType::Pdf => std::panic::catch_unwind(|| pdf_extract::extract_text(path))
            .map_err(|_| Error::Extraction("PDF parser panicked".into()))?
            .map_err(|e| Error::Extraction(format!("PDF parse failed: {}", e))),
        FileType::Docx => extract_docx(path),
        FileType::PlainText | FileType::Unknown => {
            let bytes = std::fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

static DOCX_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|(</w:p>)|(<w:tab/>|<w:br/>)")
        .expect("valid docx token regex")
});

/// Read paragraphs from `word/document.xml` inside a DOCX container.
fn extract_docx(path: &Path) -> Result<String> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::Extraction(format!("Not a DOCX container: {}", e)))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| Error::Extraction(format!("DOCX has no document body: {}", e)))?
        .read_to_string(&mut xml)?;

    Ok(docx_xml_to_text(&xml))
}

fn docx_xml_to_text(xml: &str) -> String {
    let mut text = String::new();
    for cap in DOCX_TOKEN_RE.captures_iter(xml) {
        if let Some(run) = cap.get(1) {
            text.push_str(&unescape_xml(run.as_str()));
        } else if cap.get(2).is_some() {
            text.push('\n');
        } else {
            text.push(' ');
        }
    }
    text.trim_end().to_string()
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_allowed() {
        assert!(is_allowed("contract.pdf"));
        assert!(is_allowed("Contract.DOCX"));
        assert!(is_allowed("notes.txt"));
        assert!(!is_allowed("image.png"));
        assert!(!is_allowed("noextension"));
    }

    #[test]
    fn test_extract_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nda.txt");
        std::fs::write(&path, "The Recipient shall keep all information confidential.").unwrap();
        assert_eq!(
            extract_text(&path),
            "The Recipient shall keep all information confidential."
        );
    }

    #[test]
    fn test_extract_docx_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("msa.docx");
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(
            br#"<w:document><w:body><w:p><w:r><w:t>1. Payment:</w:t></w:r><w:r><w:t xml:space="preserve"> Fees &amp; costs</w:t></w:r></w:p><w:p><w:r><w:t>2. Term</w:t></w:r></w:p></w:body></w:document>"#,
        )
        .unwrap();
        zip.finish().unwrap();

        assert_eq!(extract_text(&path), "1. Payment: Fees & costs\n2. Term");
    }

    #[test]
    fn test_corrupt_pdf_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"not really a pdf").unwrap();
        assert_eq!(extract_text(&path), "");
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        assert_eq!(extract_text(Path::new("/nonexistent/contract.txt")), "");
    }
}
