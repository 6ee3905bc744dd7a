//! PDF processing: loading, text reconstruction, rasterization and
//! embedded image extraction using lopdf.

mod images;
mod render;
mod text;

pub use images::{classify_layout, encode_rgba, extract_embedded, normalize_to_rgba, PixelLayout};
pub use render::render_page;
pub use text::{extract_runs, reconstruct_lines, TextRun};

use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A loaded source document.
///
/// Owns the parsed container for the duration of one job; dropping it
/// releases the parsed object tree.
pub struct PdfDocument {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl PdfDocument {
    /// Parse a PDF from raw bytes.
    ///
    /// Fails with [`PdfError::Parse`] when the bytes are not a
    /// well-formed PDF container. Encrypted documents are opened with
    /// the empty password where possible, otherwise rejected.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty-password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("decrypted PDF with empty password");
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("loaded PDF with {} pages", pages.len());
        Ok(Self { doc, pages })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Object id for a 1-indexed page number.
    ///
    /// The selector guarantees validity in the pipeline, but an
    /// out-of-range number still fails safely rather than panicking.
    pub fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        self.pages
            .get(&page_number)
            .copied()
            .ok_or(PdfError::InvalidPage(page_number))
    }

    /// Page dimensions in document units, from the (possibly inherited)
    /// MediaBox. Falls back to US Letter when absent or malformed.
    pub fn media_box(&self, page_number: u32) -> Result<(f32, f32)> {
        let page_id = self.page_id(page_number)?;
        let rect = inherited_attribute(&self.doc, page_id, b"MediaBox")
            .and_then(|obj| media_box_dimensions(&self.doc, &obj));
        Ok(rect.unwrap_or((612.0, 792.0)))
    }

    /// Access the underlying lopdf document.
    pub(crate) fn inner(&self) -> &Document {
        &self.doc
    }
}

/// Look up a page attribute, walking up the page tree for inherited
/// values (Resources, MediaBox and friends live on ancestors in many
/// producers).
pub(crate) fn inherited_attribute(doc: &Document, node_id: ObjectId, key: &[u8]) -> Option<Object> {
    let node = doc.get_object(node_id).ok()?;
    if let Object::Dictionary(dict) = node {
        if let Ok(value) = dict.get(key) {
            if let Ok((_, resolved)) = doc.dereference(value) {
                return Some(resolved.clone());
            }
        }
        if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent") {
            return inherited_attribute(doc, *parent_id, key);
        }
    }
    None
}

/// Resources dictionary for a page, handling inheritance.
pub(crate) fn page_resources(doc: &Document, page_id: ObjectId) -> Option<lopdf::Dictionary> {
    match inherited_attribute(doc, page_id, b"Resources")? {
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Convert a numeric PDF object (Integer or Real) to f32.
pub(crate) fn object_as_f32(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(f) => Some(*f),
        _ => None,
    }
}

/// Decode a PDF string: UTF-16BE when BOM-prefixed, byte-per-char
/// fallback otherwise. Font-specific encodings are not resolved.
pub(crate) fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks(2)
            .filter(|c| c.len() == 2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

fn media_box_dimensions(doc: &Document, obj: &Object) -> Option<(f32, f32)> {
    let array = match obj {
        Object::Array(array) => array,
        _ => return None,
    };
    if array.len() != 4 {
        return None;
    }
    let mut coords = [0f32; 4];
    for (slot, value) in coords.iter_mut().zip(array.iter()) {
        let value = match value {
            Object::Reference(id) => doc.get_object(*id).ok()?,
            other => other,
        };
        *slot = object_as_f32(value)?;
    }
    let width = (coords[2] - coords[0]).abs();
    let height = (coords[3] - coords[1]).abs();
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    Some((width, height))
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn load_counts_pages() {
        let bytes = pdf_with_content_streams(&["BT ET", "BT ET", "BT ET"]);
        let doc = PdfDocument::load(&bytes).unwrap();
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn load_rejects_garbage() {
        let result = PdfDocument::load(b"this is not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn load_rejects_empty_input() {
        assert!(matches!(PdfDocument::load(b""), Err(PdfError::Parse(_))));
    }

    #[test]
    fn page_id_fails_safely_out_of_range() {
        let bytes = pdf_with_content_streams(&["BT ET"]);
        let doc = PdfDocument::load(&bytes).unwrap();
        assert!(doc.page_id(1).is_ok());
        assert!(matches!(doc.page_id(0), Err(PdfError::InvalidPage(0))));
        assert!(matches!(doc.page_id(2), Err(PdfError::InvalidPage(2))));
    }

    #[test]
    fn media_box_reads_page_dimensions() {
        let bytes = pdf_with_content_streams(&["BT ET"]);
        let doc = PdfDocument::load(&bytes).unwrap();
        assert_eq!(doc.media_box(1).unwrap(), (612.0, 792.0));
    }

    #[test]
    fn decode_pdf_string_handles_utf16be() {
        let bytes = [0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69];
        assert_eq!(decode_pdf_string(&bytes), "Hi");
        assert_eq!(decode_pdf_string(b"plain"), "plain");
    }
}
