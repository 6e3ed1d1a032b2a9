use std::path::PathBuf;

use anyhow::Context;
use arcstr::ArcStr;
use clap::Parser as ClapParser;
use config::FlatConfig;
use gdsconv::{metadata::write_metadata, write_gds, GdsExportOpts};
use maskgen::{run_sweep, DesignRegistry, SweepPlan};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    gridsweep(args)
}

/// Arguments to [`gridsweep`].
#[derive(ClapParser)]
#[command(
    version,
    about,
    long_about = "Build a photomask from a YAML sweep configuration and write it as GDS"
)]
pub struct Args {
    /// The path to the YAML configuration.
    config: PathBuf,
    /// The path where the GDS file should be saved.
    ///
    /// Defaults to `output_gds` from the configuration, then to the
    /// configuration path with a `.gds` extension. Parent directories are
    /// created if necessary.
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// The path where port metadata should be saved.
    ///
    /// Defaults to `output_metadata` from the configuration, then to the GDS
    /// path with a `.yaml` extension.
    #[arg(short, long)]
    metadata: Option<PathBuf>,
    /// Overrides `design_name` from the configuration.
    #[arg(short, long)]
    design: Option<String>,
}

fn config_path(config: &FlatConfig, key: &str) -> Option<PathBuf> {
    config
        .get_opt(key)
        .and_then(|value| value.as_str())
        .map(PathBuf::from)
}

/// Runs the sweep described by `args.config` and writes its outputs.
pub fn gridsweep(args: Args) -> anyhow::Result<()> {
    let mut config = config::load_config(&args.config)
        .with_context(|| format!("Failed to load configuration from {:?}.", args.config))?;
    if let Some(design) = args.design {
        config.set("design_name", design);
    }

    let gds_path = args
        .out
        .or_else(|| config_path(&config, "output_gds"))
        .unwrap_or_else(|| args.config.with_extension("gds"));
    let metadata_path = args
        .metadata
        .or_else(|| config_path(&config, "output_metadata"))
        .unwrap_or_else(|| gds_path.with_extension("yaml"));

    let registry = DesignRegistry::with_defaults();
    let design = registry
        .resolve(&config)
        .with_context(|| "Failed to resolve chip design.")?;
    let plan = SweepPlan::from_config(&config).with_context(|| "Failed to read sweep plan.")?;
    let top = run_sweep(&mut config, &plan, design.as_ref()).with_context(|| "Sweep failed.")?;

    let opts = GdsExportOpts {
        name: ArcStr::from(design.name()),
        units: None,
    };
    write_gds(&top, &gds_path, opts)
        .with_context(|| format!("Failed to export GDS to {:?}.", gds_path))?;
    write_metadata(&top, &metadata_path)
        .with_context(|| format!("Failed to export port metadata to {:?}.", metadata_path))?;
    tracing::info!(gds = %gds_path.display(), metadata = %metadata_path.display(), "mask written");

    Ok(())
}
