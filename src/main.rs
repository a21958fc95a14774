//! Command line entry point: resolve the widget plan or publish it into a built site.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use live2d_widget_assets::install::{install_generators, patch_site_pages};
use live2d_widget_assets::{SiteConfig, WidgetAssets, WidgetBuild, WidgetBuilder};

/// Resolve and publish Live2D widget assets for a static site.
#[derive(Parser, Debug)]
#[command(name = "live2d-widget", version, about, long_about = None)]
struct Cli {
    /// Site base directory containing `_config.yml`
    #[arg(short, long, default_value = ".")]
    base_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved generators, URLs and runtime settings as JSON
    Resolve(WidgetArgs),
    /// Copy widget assets into the public directory and inject the markup into its pages
    Build {
        #[command(flatten)]
        widget: WidgetArgs,

        /// Rendered site output directory
        #[arg(short, long, default_value = "public")]
        public_dir: PathBuf,
    },
}

#[derive(Args, Debug)]
struct WidgetArgs {
    /// Bundled runtime script (`live2d_bundle.js`)
    #[arg(long)]
    core_script: PathBuf,

    /// Waifu-tips helper script
    #[arg(long)]
    waifu_script: PathBuf,

    /// Runtime version used for CDN script sources
    #[arg(long, default_value = "latest")]
    widget_version: String,
}

impl WidgetArgs {
    fn assets(&self) -> WidgetAssets {
        WidgetAssets {
            core_script: self.core_script.clone(),
            waifu_script: self.waifu_script.clone(),
            widget_version: self.widget_version.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy(),
        )
        .init();

    let site = SiteConfig::discover(&cli.base_dir)
        .with_context(|| format!("failed to load site configuration from {}", cli.base_dir.display()))?;

    match &cli.command {
        Command::Resolve(widget) => {
            let assets = widget.assets();
            let plan = build_widget(&site, &assets)?;
            let json = serde_json::to_string_pretty(&plan)?;
            println!("{json}");
        }
        Command::Build { widget, public_dir } => {
            let assets = widget.assets();
            let Some(build) = build_widget(&site, &assets)? else {
                return Ok(());
            };
            let public_dir = site.base_dir.join(public_dir);
            let installed = install_generators(&public_dir, &build.generators)?;
            let patched = patch_site_pages(&public_dir, &build)?;
            info!(
                "installed {} assets and patched {} pages in {}",
                installed.len(),
                patched,
                public_dir.display()
            );
        }
    }

    Ok(())
}

fn build_widget(site: &SiteConfig, assets: &WidgetAssets) -> Result<Option<WidgetBuild>> {
    let build = WidgetBuilder::new(site, assets).build()?;
    if build.is_none() {
        info!("live2d widget disabled");
    }
    Ok(build)
}
