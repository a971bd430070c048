//! Persisting rendered pages and retiring staged sources.

use std::fs;
use std::path::PathBuf;

use quill_content::{Page, PageSource};

/// Errors writing output or removing staged files. Fatal.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove staged source {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Write one rendered page to its resolved output path, creating
/// missing parent directories. Existing files are overwritten.
pub fn write_page(page: &Page, html: &str) -> Result<(), WriteError> {
    let fail = |source| WriteError::Write {
        path: page.output_path.clone(),
        source,
    };

    if let Some(parent) = page.output_path.parent() {
        fs::create_dir_all(parent).map_err(fail)?;
    }

    fs::write(&page.output_path, html).map_err(fail)
}

/// Delete the staged source file behind a page, if it has one.
///
/// Synthetic pages have no source; the match makes that a
/// compile-checked fact rather than a field-presence test.
pub fn remove_staged_source(page: &Page) -> Result<(), WriteError> {
    match &page.source {
        PageSource::File(path) => fs::remove_file(path).map_err(|source| WriteError::Remove {
            path: path.clone(),
            source,
        }),
        PageSource::Synthetic => Ok(()),
    }
}
