//! Provides the `printcheck-preview` tool for rendering a single model.
//!
//! Usage: `printcheck-preview <model_file> [size]`
//!
//! Renders the colour-coded PNG thumbnail next to the input file, using the
//! same framing and retry rules as the checklist.
//!
//! # Examples
//! ```text
//! printcheck-preview bracket[a].stl 256
//! ```

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use printcheck::preview::{render_preview, RenderOutcome, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_RETRIES};

#[derive(Parser)]
#[command(name = "printcheck-preview")]
#[command(about = "Render a PNG thumbnail next to a model file", long_about = None)]
struct Cli {
    /// Model file
    input: PathBuf,

    /// Edge length in pixels
    #[arg(default_value_t = DEFAULT_IMAGE_SIZE)]
    size: u32,

    /// Render attempts
    #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
    max_retries: u32,
}

fn main() {
    let cli = Cli::parse();

    if !cli.input.exists() {
        eprintln!("Error: file not found: {}", cli.input.display());
        process::exit(1);
    }

    let output = cli.input.with_extension("png");
    eprintln!(
        "Rendering {} ({}x{})...",
        cli.input.display(),
        cli.size,
        cli.size
    );

    let image = match render_preview(&cli.input, (cli.size, cli.size), cli.max_retries) {
        RenderOutcome::Success(image) => image,
        RenderOutcome::Failure(reason) => {
            eprintln!("Error: failed to render: {}", reason);
            process::exit(1);
        }
    };

    if let Err(e) = fs::write(&output, &image.png) {
        eprintln!("Error: failed to write {}: {}", output.display(), e);
        process::exit(1);
    }

    eprintln!("Saved {}", output.display());
}
