//! Provides the `printcheck` tool: renders every model under a folder and
//! writes the structured review checklist workbook.
//!
//! # Examples
//! ```text
//! printcheck ./prints --output checklist.xlsx --ext stl --ext obj
//! ```

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use printcheck::checklist::{ChecklistAssembler, ProgressEvent, ProgressSink, TempDirImageStore};
use printcheck::config::Config;
use printcheck::preview::PreviewRenderer;
use printcheck::{discovery, logging, xlsx};

#[derive(Parser)]
#[command(name = "printcheck")]
#[command(about = "Generate a visual print checklist for a folder of 3D models", long_about = None)]
struct Cli {
    /// Root directory to scan (prompted for when omitted)
    root: Option<PathBuf>,

    /// Workbook path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML config file (defaults to ./printcheck.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Thumbnail width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Thumbnail height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Render attempts per file
    #[arg(long)]
    max_retries: Option<u32>,

    /// Model extension to include (repeatable)
    #[arg(long = "ext")]
    extensions: Vec<String>,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(width) = self.width {
            config.image_width = width;
        }
        if let Some(height) = self.height {
            config.image_height = height;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if !self.extensions.is_empty() {
            config.extensions = self.extensions.clone();
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = log_dir.clone();
        }
    }
}

/// Drives an `indicatif` bar from assembly progress.
struct BarProgress(ProgressBar);

impl ProgressSink for BarProgress {
    fn on_event(&mut self, event: ProgressEvent<'_>) {
        match event {
            ProgressEvent::Started { file, .. } => self.0.set_message(file.name().to_string()),
            ProgressEvent::Finished { .. } => self.0.inc(1),
        }
    }
}

fn prompt_for_root() -> Result<PathBuf> {
    print!("Enter the root directory containing model files: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(PathBuf::from(line.trim()))
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_or_default(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let root = match &cli.root {
        Some(root) => root.clone(),
        None => prompt_for_root()?,
    };
    if !root.is_dir() {
        return Err(printcheck::Error::InvalidRoot(root).into());
    }

    let log_path = logging::init(&config.log_dir, cli.verbose)
        .with_context(|| format!("failed to set up logging in {}", config.log_dir.display()))?;
    log::info!("Starting checklist generation for {}", root.display());

    let files = discovery::discover(&root, &config.normalized_extensions())?;

    let bar = ProgressBar::new(files.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    let mut progress = BarProgress(bar);

    let mut store = TempDirImageStore::new().context("failed to create temporary image directory")?;
    let renderer = PreviewRenderer::new(config.preview_settings());
    let assembly = ChecklistAssembler::new(renderer).assemble(&files, &mut store, &mut progress);
    progress.0.finish_and_clear();

    xlsx::write_workbook(&assembly.document, &config.output)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    store.close()?;

    let summary = assembly.summary();
    log::info!(
        "Processed {} files: {} previews, {} missing",
        summary.total,
        summary.rendered,
        summary.missing
    );
    report(&config.output, &log_path, summary.missing);
    Ok(())
}

fn report(output: &Path, log_path: &Path, missing: usize) {
    println!("Checklist saved to {}", output.display());
    if missing == 0 {
        println!(
            "All previews were created successfully. See log for details: {}",
            log_path.display()
        );
    } else {
        println!(
            "{} previews could not be created. See log for details: {}",
            missing,
            log_path.display()
        );
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
