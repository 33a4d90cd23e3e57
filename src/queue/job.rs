use crate::error::AppError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Status of one file in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    /// Remux (and extraction, if any) finished, or would have in simulate mode
    Done,
    Failed { message: String },
}

/// A container file waiting to be remuxed
#[derive(Debug, Clone)]
pub struct RemuxJob {
    pub path: PathBuf,
    pub source_size: Option<u64>,
    pub status: JobStatus,
}

impl RemuxJob {
    pub fn new(path: PathBuf) -> Self {
        let source_size = std::fs::metadata(&path).ok().map(|m| m.len());
        Self {
            path,
            source_size,
            status: JobStatus::Pending,
        }
    }

    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Folder holding the file
    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }

    pub fn size_string(&self) -> String {
        self.source_size
            .map(|bytes| humansize::format_size(bytes, humansize::DECIMAL))
            .unwrap_or_else(|| "unknown size".to_string())
    }
}

/// Check if a path is a Matroska video file
pub fn is_mkv_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mkv"))
}

/// Collect the files to process, sorted by name within each folder.
///
/// Only the top level of `root` is scanned unless `recurse` is set. Anything
/// under `skip` (the output folder) is left alone so remuxed files are never
/// picked up again.
pub fn discover(root: &Path, recurse: bool, skip: &Path) -> Result<Vec<RemuxJob>, AppError> {
    let max_depth = if recurse { usize::MAX } else { 1 };
    let mut jobs = Vec::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !entry.path().starts_with(skip));

    for entry in walker {
        let entry = entry.map_err(|e| {
            AppError::Io(e.into_io_error().unwrap_or_else(|| {
                std::io::Error::other("filesystem loop while scanning for files")
            }))
        })?;
        if entry.file_type().is_file() && is_mkv_file(entry.path()) {
            jobs.push(RemuxJob::new(entry.into_path()));
        }
    }

    Ok(jobs)
}
