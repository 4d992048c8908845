//! Report content as a flat list of styled, pre-wrapped lines.

use chrono::DateTime;
use clauselens_core::{AnalysisResult, Error, Result};

/// Printable width between the page margins, in points.
pub const CONTENT_WIDTH: f32 = 495.0;
// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.52;

pub const TITLE_SIZE: f32 = 18.0;
pub const HEADING_SIZE: f32 = 14.0;
pub const SUBHEADING_SIZE: f32 = 11.0;
pub const BODY_SIZE: f32 = 10.0;

/// One output line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    pub size: f32,
    pub bold: bool,
    /// Extra vertical space above the line, in points.
    pub space_before: f32,
}

impl Line {
    fn new(text: impl Into<String>, size: f32, bold: bool) -> Self {
        Self {
            text: text.into(),
            size,
            bold,
            space_before: 0.0,
        }
    }

    fn spaced(mut self, space: f32) -> Self {
        self.space_before = space;
        self
    }
}

/// Characters that fit on one line at `size`.
pub fn max_chars(size: f32) -> usize {
    ((CONTENT_WIDTH / (size * AVG_GLYPH_WIDTH)) as usize).max(10)
}

/// Greedy word wrap. Words longer than a line are hard-split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.extend(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

fn push_wrapped(lines: &mut Vec<Line>, text: &str, size: f32, bold: bool) {
    for (i, chunk) in wrap(text, max_chars(size)).into_iter().enumerate() {
        let line = Line::new(chunk, size, bold);
        lines.push(if i == 0 { line.spaced(2.0) } else { line });
    }
}

fn heading(lines: &mut Vec<Line>, text: &str) {
    lines.push(Line::new(text, HEADING_SIZE, true).spaced(14.0));
}

fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        Some(b) => format!("{:.1} KB", b as f64 / 1024.0),
        None => "Unknown".to_string(),
    }
}

fn format_date(uploaded_at: &str) -> String {
    DateTime::parse_from_rfc3339(uploaded_at)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|_| uploaded_at.to_string())
}

/// Lay out the full report. Fails when the result has no file name.
pub fn report_lines(result: &AnalysisResult) -> Result<Vec<Line>> {
    let file_name = result
        .file_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| Error::Validation("Missing fileName in analysis result".into()))?;

    let mut lines = vec![Line::new("Contract Analysis Report", TITLE_SIZE, true)];
    push_wrapped(&mut lines, &format!("File: {}", file_name), BODY_SIZE, false);
    push_wrapped(&mut lines, &format!("Size: {}", format_size(result.file_size)), BODY_SIZE, false);
    push_wrapped(&mut lines, &format!("Contract type: {}", result.contract_type), BODY_SIZE, false);
    push_wrapped(
        &mut lines,
        &format!("Analysis date: {}", format_date(&result.uploaded_at)),
        BODY_SIZE,
        false,
    );

    heading(&mut lines, "Executive Summary");
    for row in [
        format!("Compliance score: {}/100", result.compliance_score),
        format!("Total clauses: {}", result.total_clauses),
        format!("Compliant clauses: {}", result.compliant_clauses),
        format!("Risky clauses: {}", result.risky_clauses),
    ] {
        push_wrapped(&mut lines, &row, BODY_SIZE, false);
    }

    heading(&mut lines, "Parties");
    if result.parties.is_empty() {
        push_wrapped(&mut lines, "None identified", BODY_SIZE, false);
    } else {
        for party in &result.parties {
            push_wrapped(&mut lines, &format!("{} ({})", party.name, party.kind), BODY_SIZE, false);
        }
    }

    heading(&mut lines, "Overall Recommendation");
    push_wrapped(&mut lines, &result.recommendations, BODY_SIZE, false);

    heading(&mut lines, "Clause Analysis");
    for clause in &result.clauses {
        lines.push(
            Line::new(
                format!("Clause {}: {}", clause.id, clause.types.join(", ")),
                SUBHEADING_SIZE,
                true,
            )
            .spaced(10.0),
        );
        push_wrapped(
            &mut lines,
            &format!("Status: {}   Risk: {}", clause.compliance_status, clause.risk_level),
            BODY_SIZE,
            false,
        );
        push_wrapped(&mut lines, &clause.text, BODY_SIZE, false);
        if !clause.recommendation.is_empty() {
            push_wrapped(
                &mut lines,
                &format!("Recommendation: {}", clause.recommendation),
                BODY_SIZE,
                false,
            );
        }
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_respects_width() {
        let text = "The Service Provider agrees to deliver website maintenance services on a monthly basis.";
        let lines = wrap(text, 30);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 30));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap("aaaaaaaaaaaaaaaaaaaaaaaaa", 10);
        assert_eq!(lines, vec!["aaaaaaaaaa", "aaaaaaaaaa", "aaaaa"]);
    }

    #[test]
    fn test_wrap_keeps_paragraphs() {
        assert_eq!(wrap("one\n\ntwo", 20), vec!["one", "two"]);
    }

    #[test]
    fn test_size_and_date() {
        assert_eq!(format_size(Some(25_395)), "24.8 KB");
        assert_eq!(format_size(None), "Unknown");
        assert_eq!(format_date("2025-08-05T10:30:00.000Z"), "2025-08-05 10:30 UTC");
        assert_eq!(format_date("yesterday"), "yesterday");
    }
}
