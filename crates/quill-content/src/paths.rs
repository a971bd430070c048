//! Pure path and URL resolution.
//!
//! Both functions strip a *path-segment* prefix via [`Path::strip_prefix`]
//! rather than substring replacement, so a filename that happens to
//! contain the root token is never corrupted.

use std::path::{Path, PathBuf};

/// Errors from path/URL resolution.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("path '{path}' is not under root '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Map a source file path to its output file path.
///
/// Replaces the source-root prefix with the output root and rewrites
/// the trailing extension to `output_ext`.
pub fn resolve_output(
    source_path: &Path,
    source_root: &Path,
    output_root: &Path,
    output_ext: &str,
) -> Result<PathBuf, PathError> {
    let relative = source_path
        .strip_prefix(source_root)
        .map_err(|_| PathError::OutsideRoot {
            path: source_path.to_path_buf(),
            root: source_root.to_path_buf(),
        })?;

    Ok(output_root.join(relative).with_extension(output_ext))
}

/// Map an output file path to its public URL under `base_url`.
pub fn resolve_url(
    output_path: &Path,
    output_root: &Path,
    base_url: &str,
) -> Result<String, PathError> {
    let relative = output_path
        .strip_prefix(output_root)
        .map_err(|_| PathError::OutsideRoot {
            path: output_path.to_path_buf(),
            root: output_root.to_path_buf(),
        })?;

    let mut url = base_url.trim_end_matches('/').to_string();
    for component in relative.components() {
        url.push('/');
        url.push_str(&component.as_os_str().to_string_lossy());
    }

    Ok(url)
}
