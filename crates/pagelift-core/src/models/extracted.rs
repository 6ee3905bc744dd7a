//! Extraction results: per-page content and job-level output.

use serde::{Deserialize, Serialize};

use super::config::ImageFormat;

/// An encoded image produced by the extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// Job-wide identifier, unique across all pages.
    pub id: u32,
    /// 1-indexed source page this image came from.
    pub page_number: u32,
    /// Position in the page's image list. Index 0 is reserved for the
    /// synthetic full-page render entry; embedded images are numbered
    /// from 1 so the index matches the `k` in the file name.
    pub image_index: u32,
    /// Encoded image bytes in the job's output format.
    pub data: Vec<u8>,
    /// Deterministic file name, unique within the job.
    pub file_name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ExtractedImage {
    /// File name for a full-page render: `page_{n}.{ext}`.
    pub fn render_file_name(page_number: u32, format: ImageFormat) -> String {
        format!("page_{}.{}", page_number, format.extension())
    }

    /// File name for the k-th embedded image (1-indexed):
    /// `page_{n}_img_{k}.{ext}`.
    pub fn embedded_file_name(page_number: u32, k: u32, format: ImageFormat) -> String {
        format!("page_{}_img_{}.{}", page_number, k, format.extension())
    }
}

/// Content extracted from a single selected page.
///
/// Created empty when the page loop reaches the page and populated by
/// the independent text/render/embedded sub-steps; absent fields mean
/// the step was skipped or failed non-fatally.
#[derive(Debug, Clone, Default)]
pub struct ExtractedPage {
    /// 1-indexed page number in the source document.
    pub page_number: u32,
    /// Reconstructed text, present iff text extraction ran and succeeded.
    pub text: Option<String>,
    /// Full-page raster, present iff a render was requested and succeeded.
    pub rendered_image: Option<ExtractedImage>,
    /// Embedded images in paint order. Empty if not requested or none found.
    pub images: Vec<ExtractedImage>,
}

impl ExtractedPage {
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            ..Default::default()
        }
    }

    /// True when the page contributed no non-empty text, no render and
    /// no embedded images.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().unwrap_or("").is_empty()
            && self.rendered_image.is_none()
            && self.images.is_empty()
    }

    /// Number of images this page contributed (render + embedded).
    pub fn image_count(&self) -> usize {
        self.images.len() + usize::from(self.rendered_image.is_some())
    }
}

/// Aggregate statistics for one conversion job.
///
/// Counts reflect only what actually succeeded; skipped pages and
/// images are simply absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStats {
    /// Pages processed (length of the resolved selection).
    pub total_pages: usize,
    /// Render images plus embedded images, summed across pages.
    pub total_images: usize,
    /// Sum of extracted text lengths across pages.
    pub total_characters: usize,
}

/// The materialized deliverable of a conversion job.
#[derive(Debug, Clone)]
pub enum JobOutput {
    /// A self-contained HTML document with all images inlined.
    SingleFile { html: String },
    /// A ZIP archive: `index.html` plus an `images/` directory.
    Package { archive: Vec<u8> },
}

impl JobOutput {
    /// Suggested file extension for the deliverable.
    pub fn extension(&self) -> &'static str {
        match self {
            JobOutput::SingleFile { .. } => "html",
            JobOutput::Package { .. } => "zip",
        }
    }

    /// Consume the output and return its raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            JobOutput::SingleFile { html } => html.into_bytes(),
            JobOutput::Package { archive } => archive,
        }
    }
}

/// Result of a successful conversion job.
///
/// Owns every retained buffer; dropping the result releases them.
#[derive(Debug, Clone)]
pub struct ConversionResult {
    /// Per-page extraction results, in selection order.
    pub pages: Vec<ExtractedPage>,
    /// The packaged deliverable.
    pub output: JobOutput,
    /// Aggregate statistics.
    pub stats: JobStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn file_names_are_deterministic() {
        assert_eq!(
            ExtractedImage::render_file_name(3, ImageFormat::Png),
            "page_3.png"
        );
        assert_eq!(
            ExtractedImage::embedded_file_name(3, 2, ImageFormat::Jpeg),
            "page_3_img_2.jpg"
        );
        assert_eq!(
            ExtractedImage::embedded_file_name(12, 1, ImageFormat::WebP),
            "page_12_img_1.webp"
        );
    }

    #[test]
    fn empty_page_detection() {
        let mut page = ExtractedPage::new(1);
        assert!(page.is_empty());

        page.text = Some(String::new());
        assert!(page.is_empty());

        page.text = Some("hello".to_string());
        assert!(!page.is_empty());
    }

    #[test]
    fn image_count_includes_render() {
        let mut page = ExtractedPage::new(1);
        assert_eq!(page.image_count(), 0);
        page.rendered_image = Some(ExtractedImage {
            id: 1,
            page_number: 1,
            image_index: 0,
            data: vec![1, 2, 3],
            file_name: "page_1.png".to_string(),
            width: 10,
            height: 10,
        });
        assert_eq!(page.image_count(), 1);
    }
}
