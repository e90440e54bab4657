//! `helmforge generate` — Convert a docker-compose file into a chart directory.

use std::num::NonZeroU32;
use std::path::PathBuf;

use clap::Args;
use helmforge_chart::{ChartAssembler, DirectorySkeletons, write_chart};
use helmforge_common::config::ChartOptions;
use helmforge_common::constants::DEFAULT_COMPOSE_FILE;
use helmforge_compose::CompositionDocument;

use super::FilterArgs;
use crate::output::{format_bytes, join_names};

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Path to the docker-compose file.
    #[arg(default_value = DEFAULT_COMPOSE_FILE)]
    pub file: PathBuf,

    /// Chart base name; the chart is written to `<NAME>-chart/`.
    #[arg(short, long)]
    pub name: String,

    /// Directory the chart directory is created in.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// YAML file with chart options (description, version, replicaCount, resources).
    #[arg(short, long, env = "HELMFORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Chart description.
    #[arg(long)]
    pub description: Option<String>,

    /// Chart version.
    #[arg(long = "chart-version")]
    pub chart_version: Option<String>,

    /// Application version recorded in `Chart.yaml`.
    #[arg(long)]
    pub app_version: Option<String>,

    /// Replica count for every deployment.
    #[arg(long)]
    pub replicas: Option<NonZeroU32>,

    /// Directory holding `deployment.yaml` and `service.yaml` skeletons.
    #[arg(long, env = "HELMFORGE_TEMPLATES")]
    pub templates: Option<PathBuf>,

    /// Component classification.
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Replace an existing chart directory.
    #[arg(short, long)]
    pub force: bool,
}

impl GenerateArgs {
    /// Builds chart options from the config file, then applies flag overrides.
    fn options(&self) -> anyhow::Result<ChartOptions> {
        let mut options = match &self.config {
            Some(path) => ChartOptions::from_file(path)?,
            None => ChartOptions::default(),
        };
        if let Some(description) = &self.description {
            options.description.clone_from(description);
        }
        if let Some(version) = &self.chart_version {
            options.version.clone_from(version);
        }
        if let Some(app_version) = &self.app_version {
            options.app_version = Some(app_version.clone());
        }
        if let Some(replicas) = self.replicas {
            options.replica_count = replicas;
        }
        options.validate()?;
        Ok(options)
    }
}

/// Executes the `generate` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, any component is
/// malformed, or the chart cannot be written.
pub fn execute(args: GenerateArgs) -> anyhow::Result<()> {
    let input = &args.file;
    tracing::info!(path = %input.display(), chart = %args.name, "generating chart");

    if !input.exists() {
        anyhow::bail!("file not found: {}", input.display());
    }

    let composition = CompositionDocument::from_file(input)?;
    let mut assembler = args.filter.apply(ChartAssembler::new(args.options()?));
    if let Some(dir) = &args.templates {
        assembler = assembler.with_skeletons(DirectorySkeletons::new(dir));
    }

    let set = assembler
        .assemble(&composition, &args.name)
        .inspect_err(|e| {
            if let Some(component) = e.component() {
                tracing::error!(component, "conversion failed; no chart written");
            }
        })?;
    let root = write_chart(&set, &args.output, args.force)?;

    println!("Generated {} -> {}", input.display(), root.display());
    println!("Chart version: {}", assembler.options().version);
    println!("Components: {}", join_names(&set.accepted));
    println!("Skipped: {}", join_names(&set.skipped));
    println!(
        "Files: {} ({})",
        set.files.len(),
        format_bytes(set.total_bytes())
    );

    Ok(())
}
