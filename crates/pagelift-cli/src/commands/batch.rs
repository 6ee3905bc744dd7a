//! Batch command - convert multiple PDF files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use pagelift_core::{JobStats, Pipeline, Settings};

use super::{derive_title, load_settings, ModeArg};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory (default: next to each input)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output packaging mode for every file
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of converting a single file.
struct BatchResult {
    path: PathBuf,
    stats: Option<JobStats>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut settings = load_settings(config_path)?;
    if let Some(mode) = args.mode {
        settings.output_mode = mode.into();
    }

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to convert",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        match convert_single_file(&path, &args, &settings) {
            Ok(stats) => results.push(BatchResult {
                path,
                stats: Some(stats),
                error: None,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("failed to convert {}: {}", path.display(), error_msg);
                    results.push(BatchResult {
                        path,
                        stats: None,
                        error: Some(error_msg),
                    });
                } else {
                    error!("failed to convert {}: {}", path.display(), error_msg);
                    anyhow::bail!("Conversion failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.stats.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Converted {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn convert_single_file(
    path: &PathBuf,
    args: &BatchArgs,
    settings: &Settings,
) -> anyhow::Result<JobStats> {
    let data = fs::read(path)?;
    let title = derive_title(path);

    let result = Pipeline::new(settings.clone()).run(&data, &title)?;

    let file_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let output_path = match &args.output_dir {
        Some(dir) => dir.join(format!("{}.{}", file_name, result.output.extension())),
        None => path.with_extension(result.output.extension()),
    };

    let stats = result.stats;
    fs::write(&output_path, result.output.into_bytes())?;
    debug!("wrote output to {}", output_path.display());

    Ok(stats)
}
