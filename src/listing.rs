//! File listing construction for directory iteration

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

use itertools::Itertools;
use log::debug;

use crate::errors::{StapelError, StapelResult};

/// Recognized image file extensions, matched case-insensitively.
/// The set is fixed at build time.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tiff", "tif"];

/// A single entry of a directory listing
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Full path of the file
    pub path: PathBuf,
    /// File name component of the path
    pub file_name: String,
    /// Modification time
    pub modified: SystemTime,
    /// Size in bytes
    pub size: u64,
}

impl FileEntry {
    /// File name without its extension
    pub fn file_stem(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }
}

/// Sort order of the file listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Natural alphanumeric order of the file name
    Filename,
    /// Modification time, newest first
    DateNewestFirst,
    /// Modification time, oldest first
    DateOldestFirst,
    /// File size, ascending
    FileSize,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Filename
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filename" => Ok(SortOrder::Filename),
            "date-newest-first" => Ok(SortOrder::DateNewestFirst),
            "date-oldest-first" => Ok(SortOrder::DateOldestFirst),
            "file-size" => Ok(SortOrder::FileSize),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}

/// A file name fragment, either a digit run or everything between digit runs.
/// Digit runs compare by magnitude first, then by their leading-zero-trimmed
/// digits, which orders them numerically at any length.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Segment {
    Number { magnitude: usize, digits: String },
    Text(String),
}

fn natural_key(name: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = name.chars().peekable();
    while let Some(&first) = chars.peek() {
        if first.is_ascii_digit() {
            let mut digits = String::new();
            while let Some(&c) = chars.peek() {
                if !c.is_ascii_digit() {
                    break;
                }
                digits.push(c);
                chars.next();
            }
            let trimmed = digits.trim_start_matches('0');
            let trimmed = if trimmed.is_empty() { "0" } else { trimmed };
            segments.push(Segment::Number {
                magnitude: trimmed.len(),
                digits: trimmed.to_string(),
            });
        } else {
            let mut text = String::new();
            while let Some(&c) = chars.peek() {
                if c.is_ascii_digit() {
                    break;
                }
                text.extend(c.to_lowercase());
                chars.next();
            }
            segments.push(Segment::Text(text));
        }
    }
    segments
}

fn natural_name_cmp(a: &FileEntry, b: &FileEntry) -> Ordering {
    natural_key(&a.file_name)
        .cmp(&natural_key(&b.file_name))
        .then_with(|| a.path.cmp(&b.path))
}

/// Total order of listing entries. Every sort order falls back to the natural
/// file name order, keeping the listing deterministic under ties.
fn compare(a: &FileEntry, b: &FileEntry, sort_by: SortOrder) -> Ordering {
    match sort_by {
        SortOrder::Filename => natural_name_cmp(a, b),
        SortOrder::DateNewestFirst => b
            .modified
            .cmp(&a.modified)
            .then_with(|| natural_name_cmp(a, b)),
        SortOrder::DateOldestFirst => a
            .modified
            .cmp(&b.modified)
            .then_with(|| natural_name_cmp(a, b)),
        SortOrder::FileSize => a.size.cmp(&b.size).then_with(|| natural_name_cmp(a, b)),
    }
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .map_or(false, |e| IMAGE_EXTENSIONS.contains(&e.as_str()))
}

/// Scan the given directories for image files and return the sorted listing.
///
/// Every directory must exist; a missing or non-directory path fails with
/// `DirectoryNotFound`. Repeated scans of unchanged directories return the
/// identical sequence.
pub fn scan_directories(dirs: &[PathBuf], sort_by: SortOrder) -> StapelResult<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for dir in dirs {
        if !dir.is_dir() {
            return Err(StapelError::DirectoryNotFound(dir.clone()));
        }
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !is_image_file(&path) {
                continue;
            }
            let metadata = entry.metadata()?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            entries.push(FileEntry {
                path,
                file_name,
                modified: metadata.modified()?,
                size: metadata.len(),
            });
        }
    }
    debug!(
        "Found {} image files in {} directories",
        entries.len(),
        dirs.len()
    );
    Ok(entries
        .into_iter()
        .sorted_by(|a, b| compare(a, b, sort_by))
        .collect())
}
