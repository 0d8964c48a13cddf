//! Classifying every file under a user-chosen directory.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::mime::MimeDatabase;
use crate::text::{classify, Classification};

/// Classifies each regular file under `root`, sorted by file name within each
/// directory. Hidden entries are skipped and symlinks are not followed.
pub fn scan_files(db: &dyn MimeDatabase, root: &Path) -> Result<Vec<Classification>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = entry.map_err(|e| ScanError::Walk(e.to_string()))?;
        if entry.file_type().is_file() {
            files.push(classify(db, entry.path()));
        }
    }
    Ok(files)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("walk error: {0}")]
    Walk(String),
}
