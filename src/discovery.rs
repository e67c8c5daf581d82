//! Recursive model file discovery.

use std::path::Path;

use walkdir::WalkDir;

use crate::checklist::SourceFile;
use crate::error::{Error, Result};

/// Collects every file under `root` whose extension is in `extensions`.
///
/// Extensions are compared case-insensitively and may be given with or
/// without a leading dot. Unreadable entries are logged and skipped. The
/// result is sorted by path.
///
/// # Errors
/// [`Error::InvalidRoot`] if `root` is not an existing directory.
pub fn discover<S: AsRef<str>>(root: &Path, extensions: &[S]) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(Error::InvalidRoot(root.to_path_buf()));
    }

    let wanted: Vec<String> = extensions
        .iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
        .collect();

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if has_extension(entry.path(), &wanted) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    log::info!("Found {} model files under {}", files.len(), root.display());
    Ok(files
        .into_iter()
        .map(|path| SourceFile::new(root, path))
        .collect())
}

fn has_extension(path: &Path, wanted: &[String]) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| wanted.iter().any(|w| *w == ext))
}
