//! Info command - inspect a PDF without converting it.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use pagelift_core::pdf::{extract_embedded, extract_runs, reconstruct_lines};
use pagelift_core::PdfDocument;

/// Arguments for the info command.
#[derive(Args)]
pub struct InfoArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Show per-page details
    #[arg(long)]
    pages: bool,
}

pub async fn run(args: InfoArgs) -> anyhow::Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data = fs::read(&args.input)?;
    let doc = PdfDocument::load(&data)?;

    println!("File:  {}", args.input.display());
    println!("Size:  {} bytes", data.len());
    println!("Pages: {}", doc.page_count());

    if !args.pages {
        return Ok(());
    }

    println!();
    let mut total_characters = 0usize;
    let mut total_images = 0usize;

    for page_number in 1..=doc.page_count() {
        let characters = match extract_runs(&doc, page_number) {
            Ok(runs) => reconstruct_lines(&runs).len(),
            Err(_) => 0,
        };
        let images = extract_embedded(&doc, page_number)
            .map(|images| images.len())
            .unwrap_or(0);

        total_characters += characters;
        total_images += images;

        println!(
            "  page {:>4}: {:>7} chars, {:>3} images",
            page_number, characters, images
        );
    }

    println!();
    println!(
        "{} {} characters, {} embedded images",
        style("ℹ").blue(),
        total_characters,
        total_images
    );

    Ok(())
}
