//! Error types for checklist generation.
//!
//! Per-file render problems never show up here; they are recorded as
//! [`crate::preview::RenderOutcome::Failure`] and reported in the checklist.
//! This type covers the run-level failures: bad configuration, an invalid
//! root directory, and I/O while writing the workbook.

use std::path::PathBuf;

use thiserror::Error;

/// printcheck error types
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be parsed
    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        /// Offending file
        path: PathBuf,
        /// Parser error
        #[source]
        source: toml::de::Error,
    },

    /// Root is missing or not a directory
    #[error("The specified path '{}' is not a valid directory", .0.display())]
    InvalidRoot(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook XML could not be written
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Workbook archive could not be written
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Logger was already installed
    #[error("Logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),
}

/// Result type alias for printcheck operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("max_retries must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: max_retries must be at least 1"
        );

        let err = Error::InvalidRoot(PathBuf::from("nope"));
        assert_eq!(
            err.to_string(),
            "The specified path 'nope' is not a valid directory"
        );
    }
}
