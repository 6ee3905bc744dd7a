//! Convert command - turn a single PDF into HTML.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use pagelift_core::{PageSelection, Pipeline, Settings};

use super::{derive_output_path, derive_title, load_settings, FormatArg, ImagesArg, ModeArg, ThemeArg};

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: input name with .html/.zip extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pages to convert: "all", a range "2-5" or a list "1,3,5"
    #[arg(short, long)]
    pages: Option<String>,

    /// Output packaging mode
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Image encoding
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Quality for lossy image encodings (0-100)
    #[arg(long)]
    quality: Option<u8>,

    /// Scale factor for page rasters
    #[arg(long)]
    scale: Option<f64>,

    /// Which image content to extract
    #[arg(long, value_enum)]
    images: Option<ImagesArg>,

    /// Skip text extraction
    #[arg(long)]
    no_text: bool,

    /// Emit page-number headings
    #[arg(long)]
    page_numbers: Option<bool>,

    /// Style preset
    #[arg(short, long, value_enum)]
    theme: Option<ThemeArg>,

    /// Document title (default: input file stem)
    #[arg(long)]
    title: Option<String>,
}

/// Merge CLI flags over the base settings.
fn build_settings(args: &ConvertArgs, mut settings: Settings) -> anyhow::Result<Settings> {
    if let Some(pages) = &args.pages {
        settings.pages = pages.parse::<PageSelection>()?;
    }
    if let Some(mode) = args.mode {
        settings.output_mode = mode.into();
    }
    if let Some(format) = args.format {
        settings.image_format = format.into();
    }
    if let Some(quality) = args.quality {
        settings.image_quality = quality;
    }
    if let Some(scale) = args.scale {
        settings.image_scale = scale;
    }
    if let Some(images) = args.images {
        settings.extract_images = images.into();
    }
    if args.no_text {
        settings.extract_text = false;
    }
    if let Some(page_numbers) = args.page_numbers {
        settings.include_page_numbers = page_numbers;
    }
    if let Some(theme) = args.theme {
        settings.theme = theme.into();
    }
    Ok(settings)
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let settings = build_settings(&args, load_settings(config_path)?)?;
    let title = args
        .title
        .clone()
        .unwrap_or_else(|| derive_title(&args.input));

    debug!("converting {} ({:?})", args.input.display(), settings.output_mode);

    // Progress bar driven by the pipeline's sink
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let sink_pb = pb.clone();
    let pipeline = Pipeline::new(settings).with_progress(
        move |percent: u8, status: &str, _page: Option<u32>| {
            sink_pb.set_position(percent as u64);
            sink_pb.set_message(status.to_string());
        },
    );

    let data = fs::read(&args.input)?;
    let result = pipeline.run(&data, &title)?;

    pb.finish_with_message("Done");

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(&args.input, result.output.extension()));
    fs::write(&output_path, result.output.into_bytes())?;

    println!(
        "{} Output written to {}",
        style("✓").green(),
        output_path.display()
    );
    println!(
        "  {} pages, {} images, {} characters",
        result.stats.total_pages,
        result.stats.total_images,
        result.stats.total_characters
    );

    debug!("total conversion time: {:?}", start.elapsed());

    Ok(())
}
