//! Core library for converting PDF documents into themeable HTML.
//!
//! This crate provides:
//! - PDF loading and page selection
//! - Per-page text reconstruction from positioned glyph runs
//! - Full-page rasterization and embedded image extraction
//! - HTML assembly with a closed set of style presets
//! - Output packaging as a self-contained HTML file or a ZIP archive
//!
//! The entry point is [`Pipeline`], which runs the whole
//! load -> select -> extract -> assemble -> package flow and reports
//! progress along the way.

pub mod error;
pub mod html;
pub mod models;
pub mod output;
pub mod pdf;
pub mod pipeline;

pub use error::{ExportError, PageliftError, PdfError, Result};
pub use models::config::{
    ImageFormat, ImageMode, OutputMode, PageSelection, Settings, Theme,
};
pub use models::extracted::{
    ConversionResult, ExtractedImage, ExtractedPage, JobOutput, JobStats,
};
pub use pdf::PdfDocument;
pub use pipeline::progress::{CancelToken, ProgressSink};
pub use pipeline::Pipeline;
