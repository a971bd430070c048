//! The build orchestrator.
//!
//! One strictly sequential transaction: stage the output tree, scan
//! the staged copy, sort, derive collections, render and write every
//! page, retire consumed staged sources, overlay static assets. Any
//! error aborts the whole build; there is no partial-success mode.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDateTime;
use walkdir::WalkDir;

use quill_content::{dates, scanner, Page, PageRef, ParseContext, PathError, ScanError};

use crate::collections::{build_collection, Collection, CollectionContext};
use crate::config::SiteConfig;
use crate::templates::{RenderError, Renderer};
use crate::writer::{self, WriteError};

/// Content file extension, without the dot.
pub const CONTENT_EXT: &str = "md";
/// Output file extension, without the dot.
pub const OUTPUT_EXT: &str = "html";

/// Errors that abort a build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("staging failed at {path}: {source}")]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Result of a completed build.
#[derive(Debug)]
pub struct BuildReport {
    /// Number of pages written, synthesized collection pages included.
    pub pages: usize,
    pub duration_ms: u64,
    pub output_dir: PathBuf,
}

/// Owns one build transaction.
pub struct SiteBuilder {
    config: SiteConfig,
    source_dir: PathBuf,
    output_dir: PathBuf,
    template_dir: PathBuf,
    static_dir: PathBuf,
    /// The clock is a value, not a call, so rebuilds with a pinned
    /// time are byte-identical.
    build_time: NaiveDateTime,
}

impl SiteBuilder {
    pub fn new(
        config: SiteConfig,
        source_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        template_dir: impl Into<PathBuf>,
        static_dir: impl Into<PathBuf>,
        build_time: NaiveDateTime,
    ) -> Self {
        Self {
            config,
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            template_dir: template_dir.into(),
            static_dir: static_dir.into(),
            build_time,
        }
    }

    /// Run the full pipeline.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();

        self.stage()?;

        let ctx = ParseContext {
            // The scan runs over the staged copy, so deleting a
            // consumed source later touches the copy, never the
            // author's original.
            source_root: &self.output_dir,
            output_root: &self.output_dir,
            base_url: &self.config.base_url,
            content_ext: CONTENT_EXT,
            output_ext: OUTPUT_EXT,
            default_template: &self.config.default_template,
        };
        let mut pages = scanner::scan(&self.output_dir, &ctx)?;
        tracing::info!("Scanned {} pages from {}", pages.len(), self.output_dir.display());

        // Newest first. The sort is stable, so equal dates keep
        // discovery order. Display strings are formatted only after
        // this point.
        pages.sort_by(|a, b| b.date.cmp(&a.date));
        for page in &mut pages {
            page.date_display = dates::format(&page.date, &self.config.date_format);
        }

        let menu = self.derive_collections(&mut pages)?;

        let renderer = Renderer::new(&self.template_dir);
        for idx in 0..pages.len() {
            let page = &pages[idx];
            let html = renderer.render_page(&page.template, &self.config, page, &pages, &menu)?;
            writer::write_page(page, &html)?;
            writer::remove_staged_source(page)?;
        }

        self.overlay_static()?;
        self.write_stylesheet(&renderer)?;

        let report = BuildReport {
            pages: pages.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.output_dir.clone(),
        };
        tracing::info!("Wrote {} pages in {}ms", report.pages, report.duration_ms);

        Ok(report)
    }

    /// Remove any previous output tree and copy the full source tree
    /// into a fresh one. Non-content assets ride along; nothing stale
    /// survives.
    fn stage(&self) -> Result<(), BuildError> {
        if self.output_dir.exists() {
            fs::remove_dir_all(&self.output_dir).map_err(|source| BuildError::Staging {
                path: self.output_dir.clone(),
                source,
            })?;
        }

        copy_tree(&self.source_dir, &self.output_dir)
    }

    /// Run every configured collection, appending its synthesized
    /// pages to the master list, and collect the site menu.
    fn derive_collections(&self, pages: &mut Vec<Page>) -> Result<Vec<PageRef>, BuildError> {
        let ctx = CollectionContext {
            output_root: &self.output_dir,
            base_url: &self.config.base_url,
            output_ext: OUTPUT_EXT,
            date_format: &self.config.date_format,
            default_template: &self.config.default_template,
        };

        let mut menu = Vec::new();
        for (name, def) in &self.config.collections {
            let collection: Collection = build_collection(pages, name, def, &ctx, self.build_time)?;
            tracing::debug!(
                "Collection '{}': {} pages, {} values",
                name,
                collection.members.len(),
                collection.values.len()
            );

            if def.add_to_menu {
                if let Some(idx) = collection.root_page {
                    menu.push(PageRef::of(&pages[idx]));
                }
            }
        }

        Ok(menu)
    }

    /// Copy `static/` over the output root, last. Same-named staged
    /// files lose.
    fn overlay_static(&self) -> Result<(), BuildError> {
        if !self.static_dir.exists() {
            return Ok(());
        }

        copy_tree(&self.static_dir, &self.output_dir)
    }

    fn write_stylesheet(&self, renderer: &Renderer) -> Result<(), BuildError> {
        let Some(template) = &self.config.stylesheet else {
            return Ok(());
        };

        let css = renderer.render_site(template, &self.config)?;
        let path = self.output_dir.join("style.css");
        fs::write(&path, css).map_err(|source| WriteError::Write { path, source })?;

        Ok(())
    }
}

fn copy_tree(from: &Path, to: &Path) -> Result<(), BuildError> {
    let staging_err = |path: &Path, source: std::io::Error| BuildError::Staging {
        path: path.to_path_buf(),
        source,
    };

    for entry in WalkDir::new(from) {
        let entry = entry.map_err(|e| staging_err(from, e.into()))?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let dest = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(|e| staging_err(&dest, e))?;
        } else {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| staging_err(&dest, e))?;
            }
            fs::copy(entry.path(), &dest).map_err(|e| staging_err(&dest, e))?;
        }
    }

    Ok(())
}
