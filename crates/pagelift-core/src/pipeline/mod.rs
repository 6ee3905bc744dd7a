//! The conversion pipeline: load -> select -> extract per page ->
//! assemble -> package.

pub mod progress;

use tracing::{debug, warn};

use crate::error::{PageliftError, Result};
use crate::models::config::{ImageMode, Settings};
use crate::models::extracted::{
    ConversionResult, ExtractedImage, ExtractedPage, JobStats,
};
use crate::output;
use crate::pdf::{self, PdfDocument};
use progress::{CancelToken, NullSink, ProgressSink};

/// One conversion job: owns the settings, a progress sink and a
/// cancellation token.
///
/// Pages are processed sequentially in selection order; each page's
/// text/render/embedded sub-steps run in turn. A failing sub-step is
/// logged and skipped - only a load failure, an empty selection, a
/// packaging failure or cancellation abort the job.
pub struct Pipeline {
    settings: Settings,
    progress: Box<dyn ProgressSink>,
    cancel: CancelToken,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            progress: Box::new(NullSink),
            cancel: CancelToken::new(),
        }
    }

    /// Attach a progress sink. Reports arrive after load (10%), after
    /// each page (interpolated up to 70%), after assembly (85%) and
    /// after packaging (100%).
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(sink);
        self
    }

    /// Attach a cancellation token checked between pages and before
    /// packaging.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Run the whole conversion over an in-memory PDF.
    pub fn run(&self, data: &[u8], title: &str) -> Result<ConversionResult> {
        self.settings.validate()?;

        let doc = PdfDocument::load(data)?;
        self.progress.report(10, "Loaded document", None);

        let selected = self.settings.pages.resolve(doc.page_count())?;
        debug!("processing {} of {} pages", selected.len(), doc.page_count());

        let total = selected.len();
        let mut pages = Vec::with_capacity(total);
        let mut next_image_id = 1u32;

        for (index, &page_number) in selected.iter().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(PageliftError::Cancelled);
            }

            pages.push(self.process_page(&doc, page_number, &mut next_image_id));

            let percent = 10 + ((index + 1) * 60 / total) as u8;
            self.progress.report(
                percent,
                &format!("Processed page {page_number}"),
                Some(page_number),
            );
        }

        let stats = JobStats {
            total_pages: pages.len(),
            total_images: pages.iter().map(ExtractedPage::image_count).sum(),
            total_characters: pages
                .iter()
                .map(|p| p.text.as_deref().map_or(0, str::len))
                .sum(),
        };

        if self.cancel.is_cancelled() {
            return Err(PageliftError::Cancelled);
        }

        let html = output::assembled_html(&pages, &self.settings, title, &stats);
        self.progress.report(85, "Assembled document", None);

        if self.cancel.is_cancelled() {
            return Err(PageliftError::Cancelled);
        }

        let output = output::materialize(html, &pages, self.settings.output_mode)?;
        self.progress.report(100, "Conversion complete", None);

        Ok(ConversionResult {
            pages,
            output,
            stats,
        })
    }

    /// Extract one page. Every sub-step failure is absorbed here: the
    /// corresponding field stays absent and the job carries on.
    fn process_page(
        &self,
        doc: &PdfDocument,
        page_number: u32,
        next_image_id: &mut u32,
    ) -> ExtractedPage {
        let mut page = ExtractedPage::new(page_number);
        let settings = &self.settings;

        if settings.extract_text {
            match pdf::extract_runs(doc, page_number) {
                Ok(runs) => page.text = Some(pdf::reconstruct_lines(&runs)),
                Err(e) => warn!("page {}: text extraction failed: {}", page_number, e),
            }
        }

        let want_render = matches!(settings.extract_images, ImageMode::RenderPages | ImageMode::Both);
        let want_embedded = matches!(settings.extract_images, ImageMode::Embedded | ImageMode::Both);

        if want_render {
            match pdf::render_page(doc, page_number, settings.image_scale) {
                Ok(surface) => {
                    match pdf::encode_rgba(&surface, settings.image_format, settings.image_quality)
                    {
                        Ok(data) => {
                            page.rendered_image = Some(ExtractedImage {
                                id: *next_image_id,
                                page_number,
                                image_index: 0,
                                file_name: ExtractedImage::render_file_name(
                                    page_number,
                                    settings.image_format,
                                ),
                                width: surface.width(),
                                height: surface.height(),
                                data,
                            });
                            *next_image_id += 1;
                        }
                        Err(e) => warn!("page {}: render encoding failed: {}", page_number, e),
                    }
                }
                Err(e) => warn!("page {}: render failed: {}", page_number, e),
            }
        }

        if want_embedded {
            match pdf::extract_embedded(doc, page_number) {
                Ok(images) => {
                    for surface in &images {
                        let k = page.images.len() as u32 + 1;
                        match pdf::encode_rgba(
                            surface,
                            settings.image_format,
                            settings.image_quality,
                        ) {
                            Ok(data) => {
                                page.images.push(ExtractedImage {
                                    id: *next_image_id,
                                    page_number,
                                    image_index: k,
                                    file_name: ExtractedImage::embedded_file_name(
                                        page_number,
                                        k,
                                        settings.image_format,
                                    ),
                                    width: surface.width(),
                                    height: surface.height(),
                                    data,
                                });
                                *next_image_id += 1;
                            }
                            Err(e) => {
                                warn!("page {}: image encoding failed: {}", page_number, e)
                            }
                        }
                    }
                }
                Err(e) => warn!("page {}: image extraction failed: {}", page_number, e),
            }
        }

        page
    }
}
