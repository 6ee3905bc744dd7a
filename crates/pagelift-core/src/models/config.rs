//! Configuration structures for the conversion pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{PageliftError, Result};

/// Which pages of the document a job should process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSelection {
    /// Every page, in document order.
    All,
    /// A contiguous 1-indexed, inclusive range, clamped to the document.
    Range { start: u32, end: u32 },
    /// An explicit list of 1-indexed pages. Order and duplicates are
    /// preserved; out-of-range entries are dropped.
    Pages(Vec<u32>),
}

impl Default for PageSelection {
    fn default() -> Self {
        PageSelection::All
    }
}

impl PageSelection {
    /// Resolve the selection against a concrete page count.
    ///
    /// Returns the ordered list of page numbers to process, or
    /// [`PageliftError::NoPagesSelected`] if nothing survives
    /// clamping/filtering. Every returned number is in
    /// `1..=page_count`.
    pub fn resolve(&self, page_count: u32) -> Result<Vec<u32>> {
        let pages: Vec<u32> = match self {
            PageSelection::All => (1..=page_count).collect(),
            PageSelection::Range { start, end } => {
                let start = (*start).max(1);
                let end = (*end).min(page_count);
                if start > end {
                    return Err(PageliftError::NoPagesSelected);
                }
                (start..=end).collect()
            }
            PageSelection::Pages(indices) => indices
                .iter()
                .copied()
                .filter(|&n| n >= 1 && n <= page_count)
                .collect(),
        };

        if pages.is_empty() {
            return Err(PageliftError::NoPagesSelected);
        }
        Ok(pages)
    }
}

impl std::str::FromStr for PageSelection {
    type Err = PageliftError;

    /// Parse `"all"`, a range `"2-5"`, or a comma list `"1,3,5"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            let start = start
                .trim()
                .parse::<u32>()
                .map_err(|_| PageliftError::Config(format!("invalid page range: {s}")))?;
            let end = end
                .trim()
                .parse::<u32>()
                .map_err(|_| PageliftError::Config(format!("invalid page range: {s}")))?;
            return Ok(PageSelection::Range { start, end });
        }

        let pages = s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u32>()
                    .map_err(|_| PageliftError::Config(format!("invalid page list: {s}")))
            })
            .collect::<Result<Vec<u32>>>()?;
        Ok(PageSelection::Pages(pages))
    }
}

/// Which image content to pull out of each page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    /// Skip image extraction entirely.
    None,
    /// Rasterize each full page to a single image.
    RenderPages,
    /// Pull out the raster objects embedded in each page.
    Embedded,
    /// Both the full-page raster and the embedded objects.
    Both,
}

/// Target encoding for every emitted image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// File extension used in deterministic image file names.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::WebP => "webp",
        }
    }

    /// MIME type for inline data-URI references.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }
}

/// How the assembled document is materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One self-contained HTML file with images inlined as data URIs.
    SingleFile,
    /// A ZIP archive: `index.html` at the root plus an `images/` folder.
    Package,
}

/// Visual style preset applied to the assembled document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Sepia,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
            Theme::Sepia => write!(f, "sepia"),
        }
    }
}

/// Caller-supplied configuration for one conversion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pages to process.
    pub pages: PageSelection,

    /// Extract text content from each page.
    pub extract_text: bool,

    /// Image extraction mode.
    pub extract_images: ImageMode,

    /// Encoding for emitted images.
    pub image_format: ImageFormat,

    /// Quality for lossy encodings (0-100). Ignored for PNG.
    pub image_quality: u8,

    /// Scale factor applied to full-page renders. Must be positive.
    pub image_scale: f64,

    /// Emit a page-number heading above each page's content.
    pub include_page_numbers: bool,

    /// Output packaging mode.
    pub output_mode: OutputMode,

    /// Style preset for the assembled document.
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pages: PageSelection::All,
            extract_text: true,
            extract_images: ImageMode::Embedded,
            image_format: ImageFormat::Png,
            image_quality: 80,
            image_scale: 1.0,
            include_page_numbers: true,
            output_mode: OutputMode::SingleFile,
            theme: Theme::Light,
        }
    }
}

impl Settings {
    /// Check invariants that hold for every pipeline run.
    pub fn validate(&self) -> Result<()> {
        if !self.image_scale.is_finite() || self.image_scale <= 0.0 {
            return Err(PageliftError::Config(format!(
                "image_scale must be positive, got {}",
                self.image_scale
            )));
        }
        if self.image_quality > 100 {
            return Err(PageliftError::Config(format!(
                "image_quality must be 0-100, got {}",
                self.image_quality
            )));
        }
        Ok(())
    }

    /// Load settings from a JSON file.
    pub fn from_file(path: &std::path::Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save settings to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> std::io::Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolve_all() {
        let pages = PageSelection::All.resolve(4).unwrap();
        assert_eq!(pages, vec![1, 2, 3, 4]);
    }

    #[test]
    fn resolve_range_clamps_to_bounds() {
        let selection = PageSelection::Range { start: 0, end: 99 };
        assert_eq!(selection.resolve(3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn resolve_inverted_range_is_empty() {
        let selection = PageSelection::Range { start: 5, end: 2 };
        assert!(matches!(
            selection.resolve(10),
            Err(PageliftError::NoPagesSelected)
        ));
    }

    #[test]
    fn resolve_range_past_document_is_empty() {
        let selection = PageSelection::Range { start: 7, end: 9 };
        assert!(matches!(
            selection.resolve(3),
            Err(PageliftError::NoPagesSelected)
        ));
    }

    #[test]
    fn resolve_explicit_preserves_order_and_duplicates() {
        let selection = PageSelection::Pages(vec![5, 2, 5]);
        assert_eq!(selection.resolve(10).unwrap(), vec![5, 2, 5]);
    }

    #[test]
    fn resolve_explicit_drops_out_of_range() {
        let selection = PageSelection::Pages(vec![0, 3, 11]);
        assert_eq!(selection.resolve(10).unwrap(), vec![3]);
    }

    #[test]
    fn resolve_explicit_all_invalid_is_empty() {
        let selection = PageSelection::Pages(vec![0, 99]);
        assert!(matches!(
            selection.resolve(10),
            Err(PageliftError::NoPagesSelected)
        ));
    }

    #[test]
    fn resolve_never_yields_out_of_bounds() {
        let selections = [
            PageSelection::All,
            PageSelection::Range { start: 0, end: 200 },
            PageSelection::Pages(vec![0, 1, 5, 7, 7, 200]),
        ];
        for selection in &selections {
            for page_count in 1..=8 {
                if let Ok(pages) = selection.resolve(page_count) {
                    assert!(!pages.is_empty());
                    assert!(pages.iter().all(|&n| n >= 1 && n <= page_count));
                }
            }
        }
    }

    #[test]
    fn parse_selection_strings() {
        assert_eq!("all".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!(
            "2-5".parse::<PageSelection>().unwrap(),
            PageSelection::Range { start: 2, end: 5 }
        );
        assert_eq!(
            "1,3,5".parse::<PageSelection>().unwrap(),
            PageSelection::Pages(vec![1, 3, 5])
        );
        assert!("2-x".parse::<PageSelection>().is_err());
        assert!("1,b".parse::<PageSelection>().is_err());
    }

    #[test]
    fn validate_rejects_bad_scale() {
        let mut settings = Settings::default();
        settings.image_scale = 0.0;
        assert!(settings.validate().is_err());
        settings.image_scale = -1.5;
        assert!(settings.validate().is_err());
        settings.image_scale = 2.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn settings_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let settings = Settings {
            image_quality: 55,
            ..Settings::default()
        };
        settings.save(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded.image_quality, 55);
        assert_eq!(loaded.pages, PageSelection::All);
    }

    #[test]
    fn settings_roundtrip_json() {
        let settings = Settings {
            pages: PageSelection::Range { start: 1, end: 3 },
            output_mode: OutputMode::Package,
            theme: Theme::Dark,
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.pages, settings.pages);
        assert_eq!(back.output_mode, settings.output_mode);
        assert_eq!(back.theme, settings.theme);
    }
}
