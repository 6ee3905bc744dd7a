//! Embedded image extraction: walks a page's drawing instructions,
//! normalizes raw pixel encodings to RGBA and encodes to the job's
//! output format.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageBuffer, Rgba, RgbaImage};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};
use tracing::{trace, warn};

use super::{page_resources, PdfDocument, Result};
use crate::error::{ExportError, PdfError};
use crate::models::config::ImageFormat;

/// The identity transformation matrix [a, b, c, d, e, f].
const IDENTITY_CTM: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// A `Do` instruction referencing an XObject, with the transformation
/// matrix in effect when it was painted.
#[derive(Debug, Clone)]
pub(crate) struct ImagePlacement {
    pub name: Vec<u8>,
    pub ctm: [f32; 6],
}

/// Concatenate `m` onto `ctm` (row-vector convention: a point is
/// transformed by `m` first, then by `ctm`).
fn concat_matrix(m: &[f32; 6], ctm: &[f32; 6]) -> [f32; 6] {
    [
        m[0] * ctm[0] + m[1] * ctm[2],
        m[0] * ctm[1] + m[1] * ctm[3],
        m[2] * ctm[0] + m[3] * ctm[2],
        m[2] * ctm[1] + m[3] * ctm[3],
        m[4] * ctm[0] + m[5] * ctm[2] + ctm[4],
        m[4] * ctm[1] + m[5] * ctm[3] + ctm[5],
    ]
}

/// Ordered XObject paint instructions for one page.
pub(crate) fn image_placements(doc: &PdfDocument, page_number: u32) -> Result<Vec<ImagePlacement>> {
    let page_id = doc.page_id(page_number)?;
    let data = doc
        .inner()
        .get_page_content(page_id)
        .map_err(|e| PdfError::ImageExtraction(e.to_string()))?;
    let content =
        Content::decode(&data).map_err(|e| PdfError::ImageExtraction(e.to_string()))?;

    let mut ctm = IDENTITY_CTM;
    let mut stack: Vec<[f32; 6]> = Vec::new();
    let mut placements = Vec::new();

    for op in &content.operations {
        match op.operator.as_str() {
            "q" => stack.push(ctm),
            "Q" => {
                if let Some(saved) = stack.pop() {
                    ctm = saved;
                }
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let mut m = [0f32; 6];
                    for (slot, operand) in m.iter_mut().zip(op.operands.iter()) {
                        *slot = super::object_as_f32(operand).unwrap_or(0.0);
                    }
                    ctm = concat_matrix(&m, &ctm);
                }
            }
            "Do" => {
                if let Some(Object::Name(name)) = op.operands.first() {
                    placements.push(ImagePlacement {
                        name: name.clone(),
                        ctm,
                    });
                }
            }
            _ => {}
        }
    }

    Ok(placements)
}

/// Raw pixel buffer classification, keyed on byte length alone.
///
/// First matching branch wins. `Grayscale` is a catch-all for any
/// length that is neither `w*h*4` nor `w*h*3` — it is not a verified
/// gray detection, and CMYK or indexed palettes are not recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// `w*h*4` bytes: interleaved RGBA, used verbatim.
    Rgba,
    /// `w*h*3` bytes: interleaved RGB, expanded with opaque alpha.
    Rgb,
    /// Anything else: one byte per pixel, replicated into RGB.
    Grayscale,
}

/// Classify a raw buffer by its length relative to the pixel count.
pub fn classify_layout(len: usize, width: u32, height: u32) -> PixelLayout {
    let pixels = width as usize * height as usize;
    if len == pixels * 4 {
        PixelLayout::Rgba
    } else if len == pixels * 3 {
        PixelLayout::Rgb
    } else {
        PixelLayout::Grayscale
    }
}

/// Normalize a raw pixel buffer to canonical interleaved RGBA.
pub fn normalize_to_rgba(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let pixels = width as usize * height as usize;
    match classify_layout(data.len(), width, height) {
        PixelLayout::Rgba => data.to_vec(),
        PixelLayout::Rgb => {
            let mut rgba = Vec::with_capacity(pixels * 4);
            for chunk in data.chunks_exact(3) {
                rgba.push(chunk[0]);
                rgba.push(chunk[1]);
                rgba.push(chunk[2]);
                rgba.push(255);
            }
            rgba
        }
        PixelLayout::Grayscale => {
            let mut rgba = Vec::with_capacity(pixels * 4);
            for i in 0..pixels {
                let gray = data.get(i).copied().unwrap_or(0);
                rgba.push(gray);
                rgba.push(gray);
                rgba.push(gray);
                rgba.push(255);
            }
            rgba
        }
    }
}

/// Decode an image XObject stream into an RGBA buffer.
///
/// DCTDecode streams go through the JPEG decoder; JPEG 2000, CCITT
/// and JBIG2 streams are skipped. Everything else is treated as raw
/// pixels and normalized by byte length.
fn decode_image_xobject(stream: &lopdf::Stream) -> Option<RgbaImage> {
    let dict = &stream.dict;

    let subtype = dict.get(b"Subtype").ok()?;
    if subtype.as_name().ok()? != b"Image" {
        return None;
    }

    let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
    let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
    if width == 0 || height == 0 {
        return None;
    }

    trace!("image xobject: {}x{}", width, height);

    if let Ok(filter) = dict.get(b"Filter") {
        let filter_name = match filter {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) if !arr.is_empty() => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        };

        match filter_name {
            Some(b"DCTDecode") => {
                // JPEG data - decode the raw stream content directly
                return image::load_from_memory_with_format(
                    &stream.content,
                    image::ImageFormat::Jpeg,
                )
                .ok()
                .map(|img| img.to_rgba8());
            }
            Some(b"JPXDecode") => {
                trace!("skipping JPEG2000 image (not supported)");
                return None;
            }
            Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("skipping fax/JBIG2 image (not supported)");
                return None;
            }
            _ => {}
        }
    }

    let data = match stream.decompressed_content() {
        Ok(d) => d,
        Err(_) => stream.content.clone(),
    };

    let rgba = normalize_to_rgba(&data, width, height);
    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba)
}

/// Resolve an XObject by resource name and decode it if it is an image.
pub(crate) fn resolve_xobject_image(
    doc: &Document,
    page_id: ObjectId,
    name: &[u8],
) -> Option<RgbaImage> {
    let resources = page_resources(doc, page_id)?;
    let xobjects = resources.get(b"XObject").ok()?;
    let (_, xobjects) = doc.dereference(xobjects).ok()?;
    let xobject_dict = match xobjects {
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let entry = xobject_dict.get(name).ok()?;
    let (_, entry) = doc.dereference(entry).ok()?;
    match entry {
        Object::Stream(stream) => decode_image_xobject(stream),
        _ => None,
    }
}

/// Extract the embedded images of one page, in paint order.
///
/// Individual objects that fail to resolve or decode are skipped;
/// only an unreadable content stream fails the whole call (and even
/// that is absorbed per page by the pipeline).
pub fn extract_embedded(doc: &PdfDocument, page_number: u32) -> Result<Vec<RgbaImage>> {
    let page_id = doc.page_id(page_number)?;
    let placements = image_placements(doc, page_number)?;

    let mut images = Vec::new();
    for placement in &placements {
        match resolve_xobject_image(doc.inner(), page_id, &placement.name) {
            Some(image) => images.push(image),
            None => {
                warn!(
                    "page {}: skipping unreadable XObject {}",
                    page_number,
                    String::from_utf8_lossy(&placement.name)
                );
            }
        }
    }

    trace!("page {}: {} embedded images", page_number, images.len());
    Ok(images)
}

/// Encode an RGBA buffer to the requested output format.
///
/// `quality` applies to JPEG only; PNG is lossless and the image
/// crate's WebP encoder is lossless as well.
pub fn encode_rgba(
    image: &RgbaImage,
    format: ImageFormat,
    quality: u8,
) -> crate::error::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);

    let result = match format {
        ImageFormat::Png => image.write_to(&mut cursor, image::ImageFormat::Png),
        ImageFormat::WebP => image.write_to(&mut cursor, image::ImageFormat::WebP),
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut cursor, quality.clamp(1, 100));
            encoder.encode_image(&rgb)
        }
    };

    result.map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn classify_by_byte_length() {
        assert_eq!(classify_layout(2 * 2 * 4, 2, 2), PixelLayout::Rgba);
        assert_eq!(classify_layout(2 * 2 * 3, 2, 2), PixelLayout::Rgb);
        assert_eq!(classify_layout(2 * 2, 2, 2), PixelLayout::Grayscale);
        // Any unrecognized length falls back to the grayscale branch.
        assert_eq!(classify_layout(7, 2, 2), PixelLayout::Grayscale);
    }

    #[test]
    fn normalize_rgba_is_verbatim() {
        let data: Vec<u8> = (0..16).collect();
        assert_eq!(normalize_to_rgba(&data, 2, 2), data);
    }

    #[test]
    fn normalize_rgb_inserts_opaque_alpha() {
        let data = vec![10, 20, 30, 40, 50, 60];
        let rgba = normalize_to_rgba(&data, 2, 1);
        assert_eq!(rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
        for (i, &byte) in rgba.iter().enumerate() {
            if i % 4 == 3 {
                assert_eq!(byte, 255);
            }
        }
    }

    #[test]
    fn normalize_grayscale_replicates_channels() {
        let data = vec![7, 200];
        let rgba = normalize_to_rgba(&data, 2, 1);
        assert_eq!(rgba, vec![7, 7, 7, 255, 200, 200, 200, 255]);
    }

    #[test]
    fn normalize_short_buffer_pads_with_black() {
        let rgba = normalize_to_rgba(&[9], 2, 1);
        assert_eq!(rgba, vec![9, 9, 9, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn extract_embedded_reads_rgb_xobject() {
        let content = "q 100 0 0 50 50 600 cm /Im1 Do Q".to_string();
        let rgb: Vec<u8> = vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 9, 9, 9];
        let bytes = pdf_with_pages(vec![(content, vec![(2, 2, rgb)])]);
        let doc = PdfDocument::load(&bytes).unwrap();

        let images = extract_embedded(&doc, 1).unwrap();
        assert_eq!(images.len(), 1);
        let image = &images[0];
        assert_eq!((image.width(), image.height()), (2, 2));
        assert!(image.pixels().all(|p| p.0[3] == 255));
        assert_eq!(image.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn extract_embedded_preserves_paint_order() {
        let content = "q /Im2 Do Q q /Im1 Do Q".to_string();
        let gray_a = vec![1, 1, 1, 1];
        let gray_b = vec![2, 2, 2, 2];
        let bytes = pdf_with_pages(vec![(content, vec![(2, 2, gray_a), (2, 2, gray_b)])]);
        let doc = PdfDocument::load(&bytes).unwrap();

        let images = extract_embedded(&doc, 1).unwrap();
        assert_eq!(images.len(), 2);
        // Im2 painted first
        assert_eq!(images[0].get_pixel(0, 0).0, [2, 2, 2, 255]);
        assert_eq!(images[1].get_pixel(0, 0).0, [1, 1, 1, 255]);
    }

    #[test]
    fn extract_embedded_skips_missing_xobject() {
        let content = "q /Nope Do Q q /Im1 Do Q".to_string();
        let bytes = pdf_with_pages(vec![(content, vec![(1, 1, vec![42])])]);
        let doc = PdfDocument::load(&bytes).unwrap();

        let images = extract_embedded(&doc, 1).unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].get_pixel(0, 0).0, [42, 42, 42, 255]);
    }

    #[test]
    fn encode_roundtrips_png() {
        let image: RgbaImage = ImageBuffer::from_pixel(3, 2, Rgba([1, 2, 3, 255]));
        let bytes = encode_rgba(&image, ImageFormat::Png, 80).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn encode_jpeg_accepts_quality() {
        let image: RgbaImage = ImageBuffer::from_pixel(4, 4, Rgba([120, 130, 140, 255]));
        let bytes = encode_rgba(&image, ImageFormat::Jpeg, 60).unwrap();
        // JPEG magic
        assert_eq!(bytes[..2].to_vec(), vec![0xFF, 0xD8]);
    }
}
