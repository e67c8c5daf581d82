//! Timestamped log files.
//!
//! Each run writes its log to `<log_dir>/printcheck_log_<YYYYmmdd_HHMMSS>.txt`
//! through `env_logger`, so the console stays free for the progress bar and
//! the final status line. `RUST_LOG` overrides the default level.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use env_logger::{Env, Target};

use crate::error::Result;

/// Returns the log file path for a run started at `started`.
///
/// # Examples
/// ```
/// use std::path::Path;
///
/// use chrono::{Local, TimeZone};
/// use printcheck::logging::log_file_path;
///
/// let started = Local.with_ymd_and_hms(2024, 10, 27, 9, 5, 3).unwrap();
/// let path = log_file_path(Path::new("logs"), started);
/// assert_eq!(path, Path::new("logs/printcheck_log_20241027_090503.txt"));
/// ```
pub fn log_file_path(log_dir: &Path, started: DateTime<Local>) -> PathBuf {
    log_dir.join(format!(
        "printcheck_log_{}.txt",
        started.format("%Y%m%d_%H%M%S")
    ))
}

/// Creates `log_dir` if needed and routes all log output into a new
/// timestamped file. Returns the file path.
pub fn init(log_dir: &Path, verbose: bool) -> Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_file_path(log_dir, Local::now());
    let file = File::create(&path)?;

    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .target(Target::Pipe(Box::new(file)))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init()?;

    Ok(path)
}
