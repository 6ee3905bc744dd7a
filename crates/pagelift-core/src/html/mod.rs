//! HTML assembly: turns per-page extraction results into one styled
//! document. Pure and deterministic - no I/O happens here.

pub mod themes;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::models::config::{ImageFormat, Settings};
use crate::models::extracted::{ExtractedImage, ExtractedPage, JobStats};

/// Escape HTML special characters.
///
/// Replaces &, <, >, " and ' with their entity equivalents. Required
/// before embedding extracted text: a stray `<` or `&` would corrupt
/// the document.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Reference to an image: an inline data URI, or a relative path into
/// the package's `images/` directory.
fn image_ref(image: &ExtractedImage, format: ImageFormat, use_relative_paths: bool) -> String {
    if use_relative_paths {
        format!("images/{}", image.file_name)
    } else {
        format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(&image.data))
    }
}

fn push_figure(
    out: &mut String,
    image: &ExtractedImage,
    format: ImageFormat,
    use_relative_paths: bool,
    class: &str,
    alt: &str,
) {
    out.push_str(&format!(
        "<figure class=\"{}\"><img src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\"></figure>\n",
        class,
        image_ref(image, format, use_relative_paths),
        alt,
        image.width,
        image.height
    ));
}

/// Assemble the extracted pages into a complete HTML document.
///
/// Per page, in selection order: full-page render, text block,
/// embedded-image gallery - whichever are present, always in that
/// order. Pages with no content at all get an explicit placeholder so
/// an empty page is distinguishable from a skipped extraction step.
pub fn assemble(
    pages: &[ExtractedPage],
    settings: &Settings,
    title: &str,
    stats: &JobStats,
    use_relative_paths: bool,
) -> String {
    let mut out = String::new();
    let escaped_title = escape_html(title);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{escaped_title}</title>\n"));
    out.push_str(&format!("<style>\n{}\n</style>\n", themes::stylesheet(settings.theme)));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!("<header><h1>{escaped_title}</h1></header>\n"));
    out.push_str("<main>\n");

    for page in pages {
        out.push_str(&format!(
            "<section class=\"page\" id=\"page-{}\">\n",
            page.page_number
        ));

        if settings.include_page_numbers {
            out.push_str(&format!(
                "<h2 class=\"page-number\">Page {}</h2>\n",
                page.page_number
            ));
        }

        if let Some(render) = &page.rendered_image {
            push_figure(
                &mut out,
                render,
                settings.image_format,
                use_relative_paths,
                "page-render",
                &format!("Rendering of page {}", page.page_number),
            );
        }

        let text = page.text.as_deref().unwrap_or("");
        if !text.is_empty() {
            out.push_str("<div class=\"page-text\">\n");
            for line in text.lines() {
                out.push_str(&format!("<p>{}</p>\n", escape_html(line)));
            }
            out.push_str("</div>\n");
        }

        if !page.images.is_empty() {
            out.push_str("<div class=\"image-gallery\">\n");
            for image in &page.images {
                push_figure(
                    &mut out,
                    image,
                    settings.image_format,
                    use_relative_paths,
                    "page-image",
                    &format!("Image {} on page {}", image.image_index, page.page_number),
                );
            }
            out.push_str("</div>\n");
        }

        if page.is_empty() {
            out.push_str("<p class=\"empty-page\">No extractable content on this page.</p>\n");
        }

        out.push_str("</section>\n");
    }

    out.push_str("</main>\n");
    out.push_str(&format!(
        "<footer class=\"job-stats\">{} pages &middot; {} images &middot; {} characters</footer>\n",
        stats.total_pages, stats.total_images, stats.total_characters
    ));
    out.push_str("</body>\n</html>\n");
    out
}
