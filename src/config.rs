//! Run configuration.
//!
//! Values come from an optional TOML file and are then overridden by
//! command-line flags. Every field has a default, so an empty file (or no
//! file at all) is a valid configuration.
//!
//! ```toml
//! image_width = 200
//! image_height = 200
//! max_retries = 10
//! extensions = ["stl", "obj"]
//! output = "STL_Checklist_Structured.xlsx"
//! log_dir = "logs"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::preview::{PreviewSettings, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_RETRIES};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "printcheck.toml";

/// Settings for one checklist run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Thumbnail width in pixels
    pub image_width: u32,
    /// Thumbnail height in pixels (zero is rendered as one)
    pub image_height: u32,
    /// Render attempts per file when failures are transient
    pub max_retries: u32,
    /// Model file extensions to collect, matched case-insensitively
    pub extensions: Vec<String>,
    /// Workbook path
    pub output: PathBuf,
    /// Directory for timestamped log files
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_width: DEFAULT_IMAGE_SIZE,
            image_height: DEFAULT_IMAGE_SIZE,
            max_retries: DEFAULT_MAX_RETRIES,
            extensions: vec!["stl".to_string()],
            output: PathBuf::from("STL_Checklist_Structured.xlsx"),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl Config {
    /// Parses a TOML document. `origin` is only used in error messages.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Loads a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text, path)
    }

    /// Loads `explicit` if given, else [`DEFAULT_CONFIG_FILE`] if it exists,
    /// else the defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.image_width == 0 {
            return Err(Error::Config("image_width must be positive".into()));
        }
        if self.max_retries == 0 {
            return Err(Error::Config("max_retries must be at least 1".into()));
        }
        if self.normalized_extensions().is_empty() {
            return Err(Error::Config("at least one extension is required".into()));
        }
        Ok(())
    }

    /// Extensions normalised to lowercase without a leading dot.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }

    /// Preview settings derived from this config.
    pub fn preview_settings(&self) -> PreviewSettings {
        PreviewSettings {
            width: self.image_width,
            height: self.image_height,
            max_retries: self.max_retries,
        }
    }
}
