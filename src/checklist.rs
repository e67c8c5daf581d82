//! Assembles the review checklist from a set of model files.
//!
//! Files are sorted by path once, up front; that order is final. Walking the
//! sorted list, a folder header is emitted whenever the relative folder
//! changes, then one row per file with either a thumbnail or the text
//! "Preview Missing". Render failures become data: a [`MissingPreviewRecord`]
//! per failed file and a warning banner at the top of the document.
//!
//! # Examples
//! ```
//! use std::path::Path;
//!
//! use printcheck::checklist::{ChecklistAssembler, MemoryImageStore, NoProgress, SourceFile};
//! use printcheck::preview::{PreviewImage, RenderOutcome};
//!
//! let root = Path::new("/models");
//! let files = vec![
//!     SourceFile::new(root, root.join("B/p3[c].stl")),
//!     SourceFile::new(root, root.join("A/p1.stl")),
//! ];
//! let previewer = |_: &Path| {
//!     RenderOutcome::Success(PreviewImage { png: vec![0x89], width: 1, height: 1 })
//! };
//!
//! let mut store = MemoryImageStore::default();
//! let assembly = ChecklistAssembler::new(previewer).assemble(&files, &mut store, &mut NoProgress);
//! assert_eq!(assembly.document.folder_headers(), vec!["A", "B"]);
//! assert!(assembly.missing.is_empty());
//! ```

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;

use crate::preview::{PreviewImage, Previewer, RenderOutcome};

/// Cell text for rows whose thumbnail could not be produced.
pub const PREVIEW_MISSING: &str = "Preview Missing";

/// Banner text shown above the missing-preview list.
pub const MISSING_BANNER: &str = "Warning: The following files failed to generate a preview:";

/// Row height hint for rows with an embedded image.
pub const IMAGE_ROW_HEIGHT: f64 = 150.0;

/// Row height hint for rows without an image.
pub const TEXT_ROW_HEIGHT: f64 = 20.0;

/// A discovered model file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    name: String,
    relative_folder: String,
}

impl SourceFile {
    /// Describes `path` relative to `root`.
    ///
    /// The relative folder uses `/` separators and is empty for files
    /// directly in `root`.
    ///
    /// # Examples
    /// ```
    /// use std::path::Path;
    ///
    /// use printcheck::checklist::SourceFile;
    ///
    /// let root = Path::new("/prints");
    /// let file = SourceFile::new(root, root.join("arm/left/hand[a].stl"));
    /// assert_eq!(file.name(), "hand[a].stl");
    /// assert_eq!(file.relative_folder(), "arm/left");
    ///
    /// let top = SourceFile::new(root, root.join("base.stl"));
    /// assert_eq!(top.relative_folder(), "");
    /// ```
    pub fn new(root: &Path, path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let parent = path.parent().unwrap_or(Path::new(""));
        let relative = parent.strip_prefix(root).unwrap_or(parent);
        let relative_folder = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");

        Self {
            path,
            name,
            relative_folder,
        }
    }

    /// Full path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Containing folder relative to the root, `/`-separated.
    pub fn relative_folder(&self) -> &str {
        &self.relative_folder
    }
}

/// A file whose preview could not be rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingPreviewRecord {
    /// Containing folder relative to the root.
    pub relative_folder: String,
    /// File name.
    pub filename: String,
}

impl MissingPreviewRecord {
    /// Builds a record from two string-like parts.
    pub fn new(relative_folder: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            relative_folder: relative_folder.into(),
            filename: filename.into(),
        }
    }
}

impl fmt::Display for MissingPreviewRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.relative_folder.is_empty() {
            write!(f, "{}", self.filename)
        } else {
            write!(f, "{}/{}", self.relative_folder, self.filename)
        }
    }
}

/// Where a stored thumbnail lives.
#[derive(Clone, PartialEq, Eq)]
pub enum ImageLocation {
    /// PNG file on disk.
    File(PathBuf),
    /// PNG bytes held in memory.
    Inline(Vec<u8>),
}

impl fmt::Debug for ImageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageLocation::File(path) => f.debug_tuple("File").field(path).finish(),
            ImageLocation::Inline(bytes) => write!(f, "Inline(<{} bytes>)", bytes.len()),
        }
    }
}

/// A reference to a thumbnail kept by an [`ImageStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredImage {
    /// Where the PNG bytes are.
    pub location: ImageLocation,
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
}

impl StoredImage {
    /// Reads the PNG bytes back.
    pub fn bytes(&self) -> io::Result<Cow<'_, [u8]>> {
        match &self.location {
            ImageLocation::File(path) => fs::read(path).map(Cow::Owned),
            ImageLocation::Inline(bytes) => Ok(Cow::Borrowed(bytes)),
        }
    }
}

/// Holds rendered thumbnails until the document is serialised.
pub trait ImageStore {
    /// Keeps `image` for `file` and returns a reference to it.
    fn store(&mut self, file: &SourceFile, image: PreviewImage) -> io::Result<StoredImage>;
}

/// Keeps thumbnails in memory.
#[derive(Debug, Default)]
pub struct MemoryImageStore;

impl ImageStore for MemoryImageStore {
    fn store(&mut self, _file: &SourceFile, image: PreviewImage) -> io::Result<StoredImage> {
        Ok(StoredImage {
            location: ImageLocation::Inline(image.png),
            width: image.width,
            height: image.height,
        })
    }
}

/// Writes thumbnails into a temporary directory that is removed on drop.
#[derive(Debug)]
pub struct TempDirImageStore {
    dir: TempDir,
    written: usize,
}

impl TempDirImageStore {
    /// Creates a fresh temporary directory.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("printcheck-").tempdir()?;
        log::info!("Using temporary directory for previews: {}", dir.path().display());
        Ok(Self { dir, written: 0 })
    }

    /// The temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Removes the directory now, reporting any error.
    pub fn close(self) -> io::Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close()?;
        log::info!("Temporary previews deleted from: {}", path.display());
        Ok(())
    }
}

impl ImageStore for TempDirImageStore {
    fn store(&mut self, file: &SourceFile, image: PreviewImage) -> io::Result<StoredImage> {
        // Named by index only; source names may already fill the name limit
        let path = self.dir.path().join(format!("{:05}.png", self.written));
        fs::write(&path, &image.png)?;
        log::debug!("Stored preview of {} as {}", file.name(), path.display());
        self.written += 1;
        Ok(StoredImage {
            location: ImageLocation::File(path),
            width: image.width,
            height: image.height,
        })
    }
}

/// Preview column of a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewCell {
    /// An embedded thumbnail.
    Image(StoredImage),
    /// The literal text [`PREVIEW_MISSING`].
    Missing,
}

/// One model file in the checklist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecklistRow {
    /// File name.
    pub filename: String,
    /// Thumbnail or missing marker.
    pub preview: PreviewCell,
    /// "Checked and available" verdict. Assembly leaves it `None` so the cell
    /// stays blank for the reviewer; a caller carrying verdicts over from an
    /// earlier checklist sets it and the workbook writes a boolean cell.
    pub reviewed: Option<bool>,
    /// "Not needed" verdict, handled like `reviewed`.
    pub not_needed: Option<bool>,
}

impl ChecklistRow {
    fn new(filename: &str, preview: PreviewCell) -> Self {
        Self {
            filename: filename.to_string(),
            preview,
            reviewed: None,
            not_needed: None,
        }
    }

    /// Suggested row height: tall enough for the thumbnail when there is one.
    pub fn height_hint(&self) -> f64 {
        match self.preview {
            PreviewCell::Image(_) => IMAGE_ROW_HEIGHT,
            PreviewCell::Missing => TEXT_ROW_HEIGHT,
        }
    }

    /// Returns true if the row shows [`PREVIEW_MISSING`].
    pub fn is_missing(&self) -> bool {
        self.preview == PreviewCell::Missing
    }
}

/// An entry in the body of the checklist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChecklistEntry {
    /// Blank spacer line before a folder section.
    Spacer,
    /// Section header carrying the relative folder.
    FolderHeader(String),
    /// A model file.
    Row(ChecklistRow),
}

/// Warning block listing every file without a preview.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingBanner {
    /// Headline text.
    pub message: String,
    /// Failed files in processing order.
    pub records: Vec<MissingPreviewRecord>,
}

/// A flattened line of the document, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentLine<'a> {
    /// The banner headline.
    Banner(&'a str),
    /// One missing file under the banner.
    Missing(&'a MissingPreviewRecord),
    /// Body entry.
    Entry(&'a ChecklistEntry),
}

/// The assembled checklist.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChecklistDocument {
    /// Banner, present only when some previews failed.
    pub banner: Option<MissingBanner>,
    /// Folder headers, spacers and rows in sorted file order.
    pub entries: Vec<ChecklistEntry>,
}

impl ChecklistDocument {
    /// Places the warning banner above everything else. No-op when `missing`
    /// is empty.
    pub fn insert_banner(&mut self, missing: &[MissingPreviewRecord]) {
        if missing.is_empty() {
            return;
        }
        self.banner = Some(MissingBanner {
            message: MISSING_BANNER.to_string(),
            records: missing.to_vec(),
        });
    }

    /// Every line in display order: banner, missing records, then the body.
    pub fn lines(&self) -> impl Iterator<Item = DocumentLine<'_>> + '_ {
        let banner = self.banner.iter().flat_map(|b| {
            std::iter::once(DocumentLine::Banner(b.message.as_str()))
                .chain(b.records.iter().map(DocumentLine::Missing))
        });
        banner.chain(self.entries.iter().map(DocumentLine::Entry))
    }

    /// File rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &ChecklistRow> + '_ {
        self.entries.iter().filter_map(|e| match e {
            ChecklistEntry::Row(row) => Some(row),
            _ => None,
        })
    }

    /// Folder header values in order.
    pub fn folder_headers(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                ChecklistEntry::FolderHeader(folder) => Some(folder.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Per-file progress notifications.
#[derive(Clone, Copy, Debug)]
pub enum ProgressEvent<'a> {
    /// Processing of a file is starting.
    Started {
        /// The file.
        file: &'a SourceFile,
        /// Position in sorted order (0-based).
        index: usize,
        /// Total number of files.
        total: usize,
    },
    /// A file is done.
    Finished {
        /// The file.
        file: &'a SourceFile,
        /// Whether a thumbnail was embedded.
        rendered: bool,
    },
}

/// Receives progress events during assembly.
pub trait ProgressSink {
    /// Called for every event.
    fn on_event(&mut self, event: ProgressEvent<'_>);
}

/// Ignores progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_event(&mut self, _event: ProgressEvent<'_>) {}
}

/// Totals for the final status message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChecklistSummary {
    /// Files processed.
    pub total: usize,
    /// Files with a thumbnail.
    pub rendered: usize,
    /// Files without a thumbnail.
    pub missing: usize,
}

/// Output of [`ChecklistAssembler::assemble`].
#[derive(Clone, Debug)]
pub struct Assembly {
    /// The checklist document.
    pub document: ChecklistDocument,
    /// Files without a thumbnail, in processing order.
    pub missing: Vec<MissingPreviewRecord>,
}

impl Assembly {
    /// Counts for the status line.
    pub fn summary(&self) -> ChecklistSummary {
        let total = self.document.rows().count();
        ChecklistSummary {
            total,
            rendered: total - self.missing.len(),
            missing: self.missing.len(),
        }
    }
}

/// Drives a [`Previewer`] over a file set and builds the checklist.
#[derive(Debug)]
pub struct ChecklistAssembler<P> {
    previewer: P,
}

impl<P: Previewer> ChecklistAssembler<P> {
    /// Creates an assembler around a previewer.
    pub fn new(previewer: P) -> Self {
        Self { previewer }
    }

    /// Builds the checklist for `files`.
    ///
    /// Files are processed one at a time, grouped by folder with files
    /// directly under the root first and sorted by name within a folder.
    /// Each thumbnail is handed to `store` before the next file is rendered. A failed render
    /// or a failed store yields a "Preview Missing" row and a
    /// [`MissingPreviewRecord`]; it never stops the run.
    pub fn assemble<S, G>(&self, files: &[SourceFile], store: &mut S, progress: &mut G) -> Assembly
    where
        S: ImageStore + ?Sized,
        G: ProgressSink + ?Sized,
    {
        let mut sorted: Vec<&SourceFile> = files.iter().collect();
        // Folder first so each folder's files stay together under one header
        sorted.sort_by(|a, b| {
            a.path()
                .parent()
                .cmp(&b.path().parent())
                .then_with(|| a.path().file_name().cmp(&b.path().file_name()))
        });

        let total = sorted.len();
        let mut document = ChecklistDocument::default();
        let mut missing = Vec::new();
        let mut current_folder: Option<&str> = None;

        for (index, file) in sorted.into_iter().enumerate() {
            progress.on_event(ProgressEvent::Started { file, index, total });

            let folder = file.relative_folder();
            if current_folder != Some(folder) {
                document.entries.push(ChecklistEntry::Spacer);
                document
                    .entries
                    .push(ChecklistEntry::FolderHeader(folder.to_string()));
                current_folder = Some(folder);
            }

            let stored = match self.previewer.preview(file.path()) {
                RenderOutcome::Success(image) => match store.store(file, image) {
                    Ok(stored) => Some(stored),
                    Err(e) => {
                        log::error!("Could not store preview for {}: {}", file.path().display(), e);
                        None
                    }
                },
                RenderOutcome::Failure(reason) => {
                    log::warn!("No preview for {}: {}", file.path().display(), reason);
                    None
                }
            };

            let rendered = stored.is_some();
            let row = match stored {
                Some(image) => ChecklistRow::new(file.name(), PreviewCell::Image(image)),
                None => {
                    missing.push(MissingPreviewRecord::new(folder, file.name()));
                    ChecklistRow::new(file.name(), PreviewCell::Missing)
                }
            };
            document.entries.push(ChecklistEntry::Row(row));

            progress.on_event(ProgressEvent::Finished { file, rendered });
        }

        if !missing.is_empty() {
            log::info!("{} previews failed to generate.", missing.len());
        }
        document.insert_banner(&missing);

        Assembly { document, missing }
    }
}
