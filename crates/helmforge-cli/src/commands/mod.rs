//! CLI command definitions and dispatch.

pub mod generate;
pub mod inspect;

use clap::{Args, Parser, Subcommand};
use helmforge_chart::ChartAssembler;
use helmforge_common::constants::BIN_NAME;
use helmforge_compose::{AcceptAll, NameDenylist};

/// helmforge: generate Helm charts from docker-compose files.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a docker-compose file into a chart directory.
    Generate(generate::GenerateArgs),
    /// Show how each component would be classified and normalized.
    Inspect(inspect::InspectArgs),
}

/// Component classification flags shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Skip components whose name contains this fragment (case-insensitive).
    /// Repeatable. Defaults to `db`.
    #[arg(long = "skip", value_name = "FRAGMENT")]
    pub skip: Vec<String>,

    /// Convert every component, databases included.
    #[arg(long, conflicts_with = "skip")]
    pub include_all: bool,
}

impl FilterArgs {
    /// Installs the selected classification policy on `assembler`.
    pub fn apply(&self, assembler: ChartAssembler) -> ChartAssembler {
        if self.include_all {
            assembler.with_filter(AcceptAll)
        } else if self.skip.is_empty() {
            assembler.with_filter(NameDenylist::default())
        } else {
            assembler.with_filter(NameDenylist::new(&self.skip))
        }
    }
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Generate(args) => generate::execute(args),
        Command::Inspect(args) => inspect::execute(args),
    }
}
