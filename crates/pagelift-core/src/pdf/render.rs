//! Full-page rasterization: paints a page's raster content onto an
//! offscreen RGBA surface sized from the page's media box.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};
use tracing::{trace, warn};

use super::images::{image_placements, resolve_xobject_image};
use super::{PdfDocument, Result};
use crate::error::PdfError;

/// Render one page to a pixel surface at the given scale.
///
/// The surface is `media_box * scale`, filled white, with every
/// embedded image composited at its transformed position. Glyphs and
/// vector paths are not painted; a text-only page yields a blank
/// surface of the correct dimensions. Skew components of the
/// transformation matrix are ignored.
pub fn render_page(doc: &PdfDocument, page_number: u32, scale: f64) -> Result<RgbaImage> {
    let (page_width, page_height) = doc.media_box(page_number)?;
    let scale = scale as f32;

    let canvas_width = (page_width * scale).round().max(1.0) as u32;
    let canvas_height = (page_height * scale).round().max(1.0) as u32;
    if canvas_width > 20_000 || canvas_height > 20_000 {
        return Err(PdfError::Render(format!(
            "surface {}x{} exceeds the size limit",
            canvas_width, canvas_height
        )));
    }

    let mut canvas: RgbaImage =
        ImageBuffer::from_pixel(canvas_width, canvas_height, Rgba([255, 255, 255, 255]));

    let placements =
        image_placements(doc, page_number).map_err(|e| PdfError::Render(e.to_string()))?;
    let page_id = doc.page_id(page_number)?;

    for placement in &placements {
        let Some(source) = resolve_xobject_image(doc.inner(), page_id, &placement.name) else {
            warn!(
                "page {}: render skipping unreadable XObject {}",
                page_number,
                String::from_utf8_lossy(&placement.name)
            );
            continue;
        };

        let [a, _b, _c, d, e, f] = placement.ctm;

        // The unit square maps to a rect of width |a| and height |d|
        // anchored at the matrix translation.
        let dest_width = (a.abs() * scale).round().max(1.0) as u32;
        let dest_height = (d.abs() * scale).round().max(1.0) as u32;
        let left = e + a.min(0.0);
        let bottom = f + d.min(0.0);

        let dest_x = (left * scale).round() as i64;
        let dest_y = ((page_height - bottom - d.abs()) * scale).round() as i64;

        let mut tile = imageops::resize(&source, dest_width, dest_height, FilterType::Triangle);
        if a < 0.0 {
            tile = imageops::flip_horizontal(&tile);
        }
        if d < 0.0 {
            tile = imageops::flip_vertical(&tile);
        }

        trace!(
            "page {}: compositing {}x{} at ({}, {})",
            page_number,
            dest_width,
            dest_height,
            dest_x,
            dest_y
        );
        imageops::overlay(&mut canvas, &tile, dest_x, dest_y);
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn render_sizes_canvas_from_media_box_and_scale() {
        let bytes = pdf_with_content_streams(&["BT ET"]);
        let doc = PdfDocument::load(&bytes).unwrap();

        let surface = render_page(&doc, 1, 1.0).unwrap();
        assert_eq!((surface.width(), surface.height()), (612, 792));

        let surface = render_page(&doc, 1, 0.5).unwrap();
        assert_eq!((surface.width(), surface.height()), (306, 396));
    }

    #[test]
    fn render_blank_page_is_white() {
        let bytes = pdf_with_content_streams(&["BT ET"]);
        let doc = PdfDocument::load(&bytes).unwrap();
        let surface = render_page(&doc, 1, 0.1).unwrap();
        assert!(surface.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn render_composites_embedded_image() {
        // A 1x1 black pixel stretched over the lower-left quarter.
        let content = "q 306 0 0 396 0 0 cm /Im1 Do Q".to_string();
        let bytes = pdf_with_pages(vec![(content, vec![(1, 1, vec![0])])]);
        let doc = PdfDocument::load(&bytes).unwrap();

        let surface = render_page(&doc, 1, 1.0).unwrap();
        // Inside the painted region (bottom-left in PDF space is the
        // lower half of the canvas).
        assert_eq!(surface.get_pixel(10, 700).0, [0, 0, 0, 255]);
        // Outside it the canvas stays white.
        assert_eq!(surface.get_pixel(400, 100).0, [255, 255, 255, 255]);
    }
}
