use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use evescope_core::models::AnalysisResult;

use crate::render;

#[derive(Args)]
pub struct ExportArgs {
    /// Path to the case directory containing report.json
    pub case_dir: PathBuf,

    /// Output file path (defaults to <case-dir>/report.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let report_path = args.case_dir.join("report.json");
    let raw = std::fs::read_to_string(&report_path)
        .with_context(|| format!("cannot read {}", report_path.display()))?;
    let result: AnalysisResult = serde_json::from_str(&raw)
        .with_context(|| format!("cannot parse {}", report_path.display()))?;

    let out_path = args
        .output
        .unwrap_or_else(|| args.case_dir.join("report.md"));
    std::fs::write(&out_path, render::render_markdown(&result))
        .with_context(|| format!("cannot write {}", out_path.display()))?;

    println!(
        "  {} {} ({} events, {} detections)",
        console::style("report ->").green().bold(),
        out_path.display(),
        result.total_events(),
        result.detections.len(),
    );

    Ok(())
}
