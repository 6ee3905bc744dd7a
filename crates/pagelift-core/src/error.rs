//! Error types for the pagelift-core library.

use thiserror::Error;

/// Main error type for the pagelift library.
#[derive(Error, Debug)]
pub enum PageliftError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// The resolved page selection is empty.
    #[error("no pages matched the requested selection")]
    NoPagesSelected,

    /// Output assembly or packaging error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// The job was cancelled by the caller.
    #[error("conversion cancelled")]
    Cancelled,
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF container.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),

    /// Failed to extract text from a page.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract images from a page.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// Failed to render a page to a pixel surface.
    #[error("failed to render page: {0}")]
    Render(String),
}

/// Errors related to output assembly and packaging.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Failed to encode an image to the requested output format.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// Failed to generate the output archive.
    #[error("failed to build archive: {0}")]
    Archive(String),
}

/// Result type for the pagelift library.
pub type Result<T> = std::result::Result<T, PageliftError>;
