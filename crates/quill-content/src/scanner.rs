//! Recursive content tree scanning.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::page::{parse_page, Page, PageError, ParseContext};

/// Errors that can occur while scanning a content tree.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("failed to walk content tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Page(#[from] PageError),
}

/// Walk `root` and parse every content file into a [`Page`].
///
/// Result order is directory-walk order; callers re-sort. The walk is
/// name-sorted so discovery order (and therefore tie-breaking in the
/// stable re-sort) is identical run to run. The first parse failure
/// aborts the scan — partial builds are never produced.
pub fn scan(root: &Path, ctx: &ParseContext) -> Result<Vec<Page>, ScanError> {
    let mut pages = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != ctx.content_ext {
            continue;
        }

        let raw = fs::read_to_string(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        pages.push(parse_page(&raw, path, ctx)?);
    }

    Ok(pages)
}
