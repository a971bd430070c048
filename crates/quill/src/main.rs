//! quill CLI - one-shot static site builder.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use quill_site::Mode;

mod commands;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Build a static site from front-matter content files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the site config file
    #[arg(short, long, default_value = "config.yml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a preview of the site against testUrl
    Build(SiteArgs),

    /// Build the site for publication against baseUrl
    Publish(SiteArgs),
}

#[derive(Args)]
pub struct SiteArgs {
    /// Content source directory
    #[arg(short, long, default_value = "src")]
    pub source: PathBuf,

    /// Output directory (fully replaced each run)
    #[arg(short, long, default_value = "dest")]
    pub output: PathBuf,

    /// Template directory
    #[arg(short, long, default_value = "templates")]
    pub templates: PathBuf,

    /// Static assets directory, overlaid onto the output last
    #[arg(long, default_value = "static")]
    pub r#static: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Build(args) => commands::build::run(&cli.config, args, Mode::Preview),
        Commands::Publish(args) => commands::build::run(&cli.config, args, Mode::Publish),
    }
}
