//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod convert;
pub mod info;

use std::path::{Path, PathBuf};

use pagelift_core::{ImageFormat, ImageMode, OutputMode, Settings, Theme};

/// Image extraction mode argument.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ImagesArg {
    /// Skip image extraction
    None,
    /// Rasterize each page
    Render,
    /// Extract embedded images
    Embedded,
    /// Page rasters and embedded images
    Both,
}

impl From<ImagesArg> for ImageMode {
    fn from(value: ImagesArg) -> Self {
        match value {
            ImagesArg::None => ImageMode::None,
            ImagesArg::Render => ImageMode::RenderPages,
            ImagesArg::Embedded => ImageMode::Embedded,
            ImagesArg::Both => ImageMode::Both,
        }
    }
}

/// Image encoding argument.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum FormatArg {
    Png,
    Jpeg,
    Webp,
}

impl From<FormatArg> for ImageFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Png => ImageFormat::Png,
            FormatArg::Jpeg => ImageFormat::Jpeg,
            FormatArg::Webp => ImageFormat::WebP,
        }
    }
}

/// Output packaging argument.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    /// One self-contained HTML file
    Single,
    /// ZIP archive with an images directory
    Package,
}

impl From<ModeArg> for OutputMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Single => OutputMode::SingleFile,
            ModeArg::Package => OutputMode::Package,
        }
    }
}

/// Style preset argument.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
    Sepia,
}

impl From<ThemeArg> for Theme {
    fn from(value: ThemeArg) -> Self {
        match value {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
            ThemeArg::Sepia => Theme::Sepia,
        }
    }
}

/// Load base settings from an explicit config file, the default config
/// location, or the built-in defaults.
pub fn load_settings(config_path: Option<&str>) -> anyhow::Result<Settings> {
    if let Some(path) = config_path {
        return Ok(Settings::from_file(Path::new(path))?);
    }
    let default_path = config::default_config_path();
    if default_path.exists() {
        return Ok(Settings::from_file(&default_path)?);
    }
    Ok(Settings::default())
}

/// Default output path: input stem plus the deliverable's extension.
pub fn derive_output_path(input: &Path, extension: &str) -> PathBuf {
    input.with_extension(extension)
}

/// Title shown in the assembled document: the input file stem.
pub fn derive_title(input: &Path) -> String {
    input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Document")
        .to_string()
}
