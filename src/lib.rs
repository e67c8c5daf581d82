//! Builds a visual print checklist for a folder of 3D model files.
//!
//! Every model under a root directory is rendered into a small colour-coded
//! thumbnail and listed, grouped by subfolder, in an `.xlsx` workbook with
//! columns a reviewer fills in by hand. Files whose thumbnail cannot be
//! produced are listed in a warning banner at the top of the sheet.
//!
//! The pipeline is:
//! 1. [`discovery::discover`] collects model files.
//! 2. [`preview::PreviewRenderer`] loads, frames and rasterizes each one, with
//!    bounded retry on transient failures.
//! 3. [`checklist::ChecklistAssembler`] builds the [`checklist::ChecklistDocument`].
//! 4. [`xlsx::write_workbook`] serialises it.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use printcheck::checklist::{ChecklistAssembler, NoProgress, TempDirImageStore};
//! use printcheck::preview::{PreviewRenderer, PreviewSettings};
//! use printcheck::{discovery, xlsx};
//!
//! # fn main() -> printcheck::Result<()> {
//! let files = discovery::discover(Path::new("prints"), &["stl"])?;
//! let renderer = PreviewRenderer::new(PreviewSettings::default());
//! let mut store = TempDirImageStore::new()?;
//! let assembly = ChecklistAssembler::new(renderer).assemble(&files, &mut store, &mut NoProgress);
//! xlsx::write_workbook(&assembly.document, Path::new("checklist.xlsx"))?;
//! # Ok(())
//! # }
//! ```

pub mod camera;
pub mod checklist;
pub mod color;
pub mod config;
pub mod discovery;
pub mod error;
pub mod formats;
pub mod geometry;
pub mod logging;
pub mod preview;
pub mod renderer;
pub mod xlsx;

pub use error::{Error, Result};
