//! The build/publish command.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use quill_site::{Mode, RawConfig, SiteBuilder, SiteConfig};

use crate::SiteArgs;

/// Run one full build in the given mode.
pub fn run(config_path: &Path, args: SiteArgs, mode: Mode) -> Result<()> {
    let raw = RawConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let config = SiteConfig::resolve(raw, mode);

    tracing::info!("Building in {} mode against {}", mode, config.base_url);

    let builder = SiteBuilder::new(
        config,
        &args.source,
        &args.output,
        &args.templates,
        &args.r#static,
        Local::now().naive_local(),
    );

    let report = builder.build()?;

    tracing::info!(
        "Site written to {} ({} pages, {}ms)",
        report.output_dir.display(),
        report.pages,
        report.duration_ms
    );

    Ok(())
}
