//! Output packaging: materializes the assembled document as a single
//! self-contained HTML file or as a ZIP archive with sibling images.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ExportError, Result};
use crate::html;
use crate::models::config::{OutputMode, Settings};
use crate::models::extracted::{ExtractedPage, JobOutput, JobStats};

/// Run the single assembly pass for the job's output mode.
///
/// Single-file output embeds images inline; package output references
/// them by relative path. The same extraction input produces the same
/// stats either way - only the packaging differs.
pub fn assembled_html(
    pages: &[ExtractedPage],
    settings: &Settings,
    title: &str,
    stats: &JobStats,
) -> String {
    let use_relative_paths = settings.output_mode == OutputMode::Package;
    html::assemble(pages, settings, title, stats, use_relative_paths)
}

/// Wrap the assembled document into the final deliverable.
///
/// `html` must come from [`assembled_html`] with the same `mode`, so
/// that inline/relative references match the packaging. Archive
/// failures are fatal to the job.
pub fn materialize(html: String, pages: &[ExtractedPage], mode: OutputMode) -> Result<JobOutput> {
    match mode {
        OutputMode::SingleFile => Ok(JobOutput::SingleFile { html }),
        OutputMode::Package => {
            let archive = build_archive(&html, pages)?;
            Ok(JobOutput::Package { archive })
        }
    }
}

/// Write `index.html` plus every image into a deflate ZIP.
///
/// A repeated page selection repeats file names; each unique name is
/// written once so the archive never carries duplicate entries.
fn build_archive(html: &str, pages: &[ExtractedPage]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let archive_err = |e: zip::result::ZipError| ExportError::Archive(e.to_string());

    writer.start_file("index.html", options).map_err(archive_err)?;
    writer
        .write_all(html.as_bytes())
        .map_err(|e| ExportError::Archive(e.to_string()))?;

    let mut written: HashSet<&str> = HashSet::new();
    for page in pages {
        let images = page.rendered_image.iter().chain(page.images.iter());
        for image in images {
            if !written.insert(&image.file_name) {
                continue;
            }
            writer
                .start_file(format!("images/{}", image.file_name), options)
                .map_err(archive_err)?;
            writer
                .write_all(&image.data)
                .map_err(|e| ExportError::Archive(e.to_string()))?;
        }
    }

    let cursor = writer.finish().map_err(archive_err)?;
    let archive = cursor.into_inner();
    debug!(
        "packaged {} images into a {}-byte archive",
        written.len(),
        archive.len()
    );
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::extracted::ExtractedImage;
    use std::io::Read;

    fn image(page: u32, index: u32, file_name: &str) -> ExtractedImage {
        ExtractedImage {
            id: page * 10 + index,
            page_number: page,
            image_index: index,
            data: vec![index as u8; 8],
            file_name: file_name.to_string(),
            width: 2,
            height: 1,
        }
    }

    fn sample_pages() -> Vec<ExtractedPage> {
        let mut first = ExtractedPage::new(1);
        first.rendered_image = Some(image(1, 0, "page_1.png"));
        first.text = Some("hello".to_string());
        first.images = vec![image(1, 1, "page_1_img_1.png")];

        let mut second = ExtractedPage::new(2);
        second.images = vec![image(2, 1, "page_2_img_1.png")];

        vec![first, second]
    }

    fn packaged(pages: &[ExtractedPage]) -> Vec<u8> {
        let settings = Settings {
            output_mode: OutputMode::Package,
            ..Settings::default()
        };
        let html = assembled_html(pages, &settings, "Doc", &JobStats::default());
        match materialize(html, pages, OutputMode::Package).unwrap() {
            JobOutput::Package { archive } => archive,
            JobOutput::SingleFile { .. } => panic!("expected package output"),
        }
    }

    #[test]
    fn single_file_mode_is_self_contained() {
        let settings = Settings::default();
        let pages = sample_pages();
        let html = assembled_html(&pages, &settings, "Doc", &JobStats::default());
        let output = materialize(html, &pages, OutputMode::SingleFile).unwrap();
        match output {
            JobOutput::SingleFile { html } => {
                assert!(html.contains("data:image/png;base64,"));
                assert!(!html.contains("images/page_1.png"));
            }
            JobOutput::Package { .. } => panic!("expected single-file output"),
        }
    }

    #[test]
    fn archive_contains_every_referenced_image_and_nothing_else() {
        let pages = sample_pages();
        let archive = packaged(&pages);

        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();

        let mut html = String::new();
        zip.by_name("index.html")
            .unwrap()
            .read_to_string(&mut html)
            .unwrap();

        let names: Vec<String> = zip.file_names().map(|n| n.to_string()).collect();

        // Every file referenced by the payload exists in the archive.
        for file_name in ["page_1.png", "page_1_img_1.png", "page_2_img_1.png"] {
            assert!(html.contains(&format!("images/{file_name}")));
            assert!(names.contains(&format!("images/{file_name}")));
        }

        // And the archive carries no unreferenced image.
        for name in &names {
            if let Some(file_name) = name.strip_prefix("images/") {
                assert!(
                    html.contains(&format!("images/{file_name}")),
                    "orphaned archive entry: {name}"
                );
            }
        }
    }

    #[test]
    fn duplicate_file_names_are_written_once() {
        // The same page selected twice produces identical file names.
        let mut page = ExtractedPage::new(5);
        page.images = vec![image(5, 1, "page_5_img_1.png")];
        let archive = packaged(&[page.clone(), page]);

        let zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let count = zip
            .file_names()
            .filter(|n| *n == "images/page_5_img_1.png")
            .count();
        assert_eq!(count, 1);
    }
}
