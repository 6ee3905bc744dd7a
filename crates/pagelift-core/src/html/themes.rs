//! Closed set of style presets for the assembled document.

use crate::models::config::Theme;

/// Stylesheet for a preset: shared layout rules plus the preset's
/// palette overrides.
pub fn stylesheet(theme: Theme) -> String {
    let palette = match theme {
        Theme::Light => LIGHT_PALETTE,
        Theme::Dark => DARK_PALETTE,
        Theme::Sepia => SEPIA_PALETTE,
    };
    format!("{BASE}\n{palette}")
}

const BASE: &str = r#"* { box-sizing: border-box; }
body {
  margin: 0 auto;
  max-width: 52rem;
  padding: 2rem 1.25rem 4rem;
  font-family: Georgia, 'Times New Roman', serif;
  line-height: 1.6;
}
header h1 {
  font-size: 1.6rem;
  margin-bottom: 0.25rem;
}
section.page {
  margin: 2.5rem 0;
  padding-top: 1.5rem;
  border-top: 1px solid;
}
h2.page-number {
  font-size: 0.95rem;
  font-weight: 600;
  letter-spacing: 0.08em;
  text-transform: uppercase;
  opacity: 0.7;
}
figure {
  margin: 1.25rem 0;
}
figure img {
  max-width: 100%;
  height: auto;
  display: block;
  box-shadow: 0 1px 4px rgba(0, 0, 0, 0.25);
}
.page-text p {
  margin: 0.3rem 0;
}
.image-gallery {
  display: flex;
  flex-wrap: wrap;
  gap: 0.75rem;
}
.image-gallery figure {
  margin: 0;
}
.image-gallery img {
  max-width: 16rem;
}
p.empty-page {
  font-style: italic;
  opacity: 0.6;
}
footer.job-stats {
  margin-top: 3rem;
  font-size: 0.85rem;
  opacity: 0.7;
}"#;

const LIGHT_PALETTE: &str = r#"body { background: #ffffff; color: #1c1c1c; }
section.page { border-color: #e2e2e2; }
a { color: #0b5fa5; }"#;

const DARK_PALETTE: &str = r#"body { background: #16181d; color: #d8dade; }
section.page { border-color: #31353d; }
figure img { box-shadow: 0 1px 4px rgba(0, 0, 0, 0.6); }
a { color: #6cb2f7; }"#;

const SEPIA_PALETTE: &str = r#"body { background: #f6efdf; color: #433422; }
section.page { border-color: #dccfb4; }
a { color: #8a5a2b; }"#;
