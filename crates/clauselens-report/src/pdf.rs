//! PDF assembly with the standard Helvetica fonts.

use clauselens_core::{AnalysisResult, Error, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use crate::layout::{report_lines, Line};

// A4 in points.
const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN_LEFT: f32 = 50.0;
const TOP_Y: f32 = 800.0;
const BOTTOM_Y: f32 = 50.0;
const LINE_SPACING: f32 = 1.35;

/// Render `result` as a PDF document.
pub fn render_report(result: &AnalysisResult) -> Result<Vec<u8>> {
    let lines = report_lines(result)?;
    let pages = paginate(&lines);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in &pages {
        let content = Content {
            operations: page_operations(page),
        };
        let encoded = content
            .encode()
            .map_err(|e| Error::Report(format!("Failed to encode page content: {}", e)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| Error::Report(format!("Failed to write PDF: {}", e)))?;
    debug!("Rendered report: {} pages, {} bytes", page_count, bytes.len());
    Ok(bytes)
}

fn font(base: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// One positioned line on a page.
struct Placed<'a> {
    line: &'a Line,
    y: f32,
}

/// Assign baselines top-down, breaking to a new page at the bottom margin.
fn paginate(lines: &[Line]) -> Vec<Vec<Placed<'_>>> {
    let mut pages: Vec<Vec<Placed<'_>>> = vec![Vec::new()];
    let mut y = TOP_Y;

    for line in lines {
        let advance = line.size * LINE_SPACING;
        let on_fresh_page = pages.last().map(|p| p.is_empty()).unwrap_or(true);
        let mut next_y = if on_fresh_page { y } else { y - line.space_before - advance };
        if next_y < BOTTOM_Y {
            pages.push(Vec::new());
            next_y = TOP_Y;
        }
        y = next_y;
        if let Some(page) = pages.last_mut() {
            page.push(Placed { line, y });
        }
    }
    pages
}

fn page_operations(page: &[Placed<'_>]) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(page.len() * 5);
    for placed in page {
        let font = if placed.line.bold { "F2" } else { "F1" };
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![font.into(), placed.line.size.into()]));
        ops.push(Operation::new("Td", vec![MARGIN_LEFT.into(), placed.y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(to_win_ansi(&placed.line.text), StringFormat::Literal)],
        ));
        ops.push(Operation::new("ET", vec![]));
    }
    ops
}

/// Encode text for the WinAnsi standard fonts; unmappable characters become `?`.
fn to_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' => b'\'',
            '\u{201C}' | '\u{201D}' => b'"',
            '\u{2013}' | '\u{2014}' => b'-',
            '\u{2022}' => b'*',
            '\t' => b' ',
            c if (c as u32) < 0x20 => b' ',
            c if (c as u32) <= 0xFF => c as u8,
            _ => b'?',
        })
        .collect()
}
