pub mod analyze;
pub mod export;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "evescope",
    about = "Threshold-based triage for Suricata EVE logs",
    long_about = "Evescope - Aggregates Suricata eve.json event streams into per-kind,\n\
                  per-host, and per-indicator frequency tables, flags suspicious hosts\n\
                  with fixed-threshold heuristics, and writes a triage report.",
    version,
    propagate_version = true,
    styles = get_styles(),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze an EVE log: ingest, aggregate, detect, write report
    Analyze(analyze::AnalyzeArgs),

    /// Re-render the Markdown report from a saved report.json
    Export(export::ExportArgs),
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Analyze(args) => analyze::run(args),
        Commands::Export(args) => export::run(args),
    }
}

fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .header(
            clap::builder::styling::AnsiColor::BrightCyan
                .on_default()
                .bold(),
        )
        .usage(
            clap::builder::styling::AnsiColor::BrightCyan
                .on_default()
                .bold(),
        )
        .literal(
            clap::builder::styling::AnsiColor::BrightGreen
                .on_default()
                .bold(),
        )
        .placeholder(
            clap::builder::styling::AnsiColor::BrightWhite
                .on_default()
                .dimmed(),
        )
}
