//! `helmforge inspect` — Show how each component would be converted.

use std::path::PathBuf;

use clap::Args;
use helmforge_chart::ChartAssembler;
use helmforge_common::constants::DEFAULT_COMPOSE_FILE;
use helmforge_compose::{ComponentSpec, CompositionDocument, normalize};
use serde::Serialize;

use super::FilterArgs;

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the docker-compose file.
    #[arg(default_value = DEFAULT_COMPOSE_FILE)]
    pub file: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Component classification.
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Debug, Serialize)]
struct ComponentReport {
    name: String,
    accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    spec: Option<ComponentSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Executes the `inspect` command.
///
/// Every accepted component is normalized, and every failure is reported
/// rather than stopping at the first one.
///
/// # Errors
///
/// Returns an error if the file cannot be parsed or any accepted component
/// fails normalization.
pub fn execute(args: InspectArgs) -> anyhow::Result<()> {
    let composition = CompositionDocument::from_file(&args.file)?;
    let assembler = args.filter.apply(ChartAssembler::default());

    let reports: Vec<ComponentReport> = composition
        .components()
        .map(|(name, raw)| {
            let accepted = assembler.accepts(name, raw);
            let (spec, error) = if accepted {
                match normalize(name, raw) {
                    Ok(spec) => (Some(spec), None),
                    Err(e) => (None, Some(e.to_string())),
                }
            } else {
                (None, None)
            };
            ComponentReport {
                name: name.to_owned(),
                accepted,
                spec,
                error,
            }
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_report(&args.file, &reports);
    }

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{failed} component(s) failed normalization");
    }
    Ok(())
}

fn print_report(file: &std::path::Path, reports: &[ComponentReport]) {
    println!("Components in: {}", file.display());
    println!();

    for report in reports {
        match (&report.spec, &report.error) {
            (Some(spec), _) => {
                println!("  + {}", report.name);
                println!("      image: {}:{}", spec.repository, spec.tag);
                if !spec.ports.is_empty() {
                    let ports: Vec<String> = spec.ports.iter().map(u16::to_string).collect();
                    println!("      ports: {}", ports.join(", "));
                }
                for (key, value) in &spec.env {
                    println!("      env: {key}={value}");
                }
            }
            (None, Some(error)) => println!("  ! {}: {error}", report.name),
            (None, None) => println!("  - {} (skipped)", report.name),
        }
    }

    let accepted = reports.iter().filter(|r| r.accepted).count();
    println!();
    println!(
        "  {accepted} component(s) accepted, {} skipped.",
        reports.len() - accepted
    );
}
