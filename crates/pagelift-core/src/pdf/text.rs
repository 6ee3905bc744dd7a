//! Per-page text extraction: positioned run collection and line
//! reconstruction.

use lopdf::content::Content;
use lopdf::Object;
use tracing::trace;

use super::{decode_pdf_string, PdfDocument, Result};
use crate::error::PdfError;

/// Baseline jitter tolerance: runs whose vertical coordinate rounds to
/// the same multiple of this bucket size belong to one line.
const LINE_BUCKET_SIZE: f32 = 10.0;

/// One show-text instruction with its baseline position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Decoded string fragment.
    pub text: String,
    /// Vertical baseline coordinate in document units.
    pub baseline_y: f32,
}

/// The identity text matrix: [a, b, c, d, tx, ty].
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// Text-positioning state tracked while walking a content stream.
///
/// Only the pieces needed to recover baseline positions: the full
/// graphics stack, glyph widths and horizontal advances are not
/// modeled here.
struct TextState {
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    leading: f32,
}

impl TextState {
    fn new() -> Self {
        Self {
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            leading: 0.0,
        }
    }

    fn begin_text(&mut self) {
        self.text_matrix = IDENTITY_MATRIX;
        self.line_matrix = IDENTITY_MATRIX;
    }

    fn set_matrix(&mut self, m: [f32; 6]) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// Translate the line matrix by (tx, ty) and restart the text
    /// matrix from it (Td / TD / T*).
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn baseline_y(&self) -> f32 {
        self.text_matrix[5]
    }
}

fn operand_f32(operands: &[Object], index: usize) -> Option<f32> {
    operands.get(index).and_then(super::object_as_f32)
}

/// Collect the positioned text runs of one page, in content order.
///
/// A malformed content stream surfaces as
/// [`PdfError::TextExtraction`]; the pipeline treats that as a
/// per-page skip, not a job failure.
pub fn extract_runs(doc: &PdfDocument, page_number: u32) -> Result<Vec<TextRun>> {
    let page_id = doc.page_id(page_number)?;
    let data = doc
        .inner()
        .get_page_content(page_id)
        .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
    let content =
        Content::decode(&data).map_err(|e| PdfError::TextExtraction(e.to_string()))?;

    let mut state = TextState::new();
    let mut runs = Vec::new();

    let mut push_run = |text: String, y: f32| {
        if !text.is_empty() {
            runs.push(TextRun {
                text,
                baseline_y: y,
            });
        }
    };

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => state.begin_text(),
            "Tm" => {
                if op.operands.len() >= 6 {
                    let mut m = [0f32; 6];
                    for (slot, operand) in m.iter_mut().zip(op.operands.iter()) {
                        *slot = super::object_as_f32(operand).unwrap_or(0.0);
                    }
                    state.set_matrix(m);
                }
            }
            "Td" => {
                let tx = operand_f32(&op.operands, 0).unwrap_or(0.0);
                let ty = operand_f32(&op.operands, 1).unwrap_or(0.0);
                state.translate_line(tx, ty);
            }
            "TD" => {
                let tx = operand_f32(&op.operands, 0).unwrap_or(0.0);
                let ty = operand_f32(&op.operands, 1).unwrap_or(0.0);
                state.leading = -ty;
                state.translate_line(tx, ty);
            }
            "TL" => {
                state.leading = operand_f32(&op.operands, 0).unwrap_or(0.0);
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push_run(decode_pdf_string(bytes), state.baseline_y());
                }
            }
            "'" => {
                state.next_line();
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    push_run(decode_pdf_string(bytes), state.baseline_y());
                }
            }
            "\"" => {
                // aw ac string: spacing operands are irrelevant to
                // baseline recovery.
                state.next_line();
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    push_run(decode_pdf_string(bytes), state.baseline_y());
                }
            }
            "TJ" => {
                if let Some(Object::Array(parts)) = op.operands.first() {
                    let mut text = String::new();
                    for part in parts {
                        if let Object::String(bytes, _) = part {
                            text.push_str(&decode_pdf_string(bytes));
                        }
                    }
                    push_run(text, state.baseline_y());
                }
            }
            _ => {}
        }
    }

    trace!("page {}: {} text runs", page_number, runs.len());
    Ok(runs)
}

/// Rebuild newline-joined text from unordered positioned runs.
///
/// Runs are bucketed by their baseline rounded to the nearest multiple
/// of [`LINE_BUCKET_SIZE`], fragments keep insertion order within a
/// bucket and join with single spaces, and buckets are ordered by
/// descending first-seen baseline to approximate top-to-bottom reading
/// order. Columns are not detected; multi-column pages interleave.
pub fn reconstruct_lines(runs: &[TextRun]) -> String {
    let mut buckets: Vec<(i64, f32, Vec<&str>)> = Vec::new();

    for run in runs {
        let quantized = (run.baseline_y / LINE_BUCKET_SIZE).round() as i64;
        match buckets.iter_mut().find(|(key, _, _)| *key == quantized) {
            Some((_, _, fragments)) => fragments.push(&run.text),
            None => buckets.push((quantized, run.baseline_y, vec![&run.text])),
        }
    }

    buckets.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    buckets
        .iter()
        .map(|(_, _, fragments)| fragments.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}
