use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use evescope_core::aggregate::DEFAULT_TOP_N;
use evescope_core::ingest::EveReader;

use crate::render;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to the EVE log (eve.json NDJSON, or an array-style export)
    pub eve: PathBuf,

    /// Output directory for case files (report.json, report.md)
    #[arg(short, long, default_value = "case")]
    pub out: PathBuf,

    /// Entries to keep in each top-N report list
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top: usize,
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let started = Instant::now();

    // 1. Open the log, hash it, pick NDJSON vs array mode
    println!(
        "  {} {}",
        console::style("[1/3] ingesting").cyan().bold(),
        args.eve.display(),
    );

    let mut reader = EveReader::from_file(&args.eve)
        .with_context(|| format!("failed to ingest {}", args.eve.display()))?;

    println!(
        "        {} bytes, sha256:{}",
        console::style(reader.file_size).green().bold(),
        &reader.file_sha256[..16],
    );

    // 2. Stream records through the engine
    println!(
        "  {}",
        console::style("[2/3] aggregating + detecting").cyan().bold(),
    );

    let mut result = evescope_core::analyze::analyze_with_top(reader.by_ref(), args.top);

    println!(
        "        {} records folded, {} malformed lines skipped",
        console::style(reader.records_read).green().bold(),
        reader.parse_errors,
    );

    for (kind, count) in &result.totals {
        let label = if kind.is_empty() { "(unknown)" } else { kind };
        println!(
            "        {}: {} events",
            console::style(label).cyan(),
            count,
        );
    }

    if !result.detections.is_empty() {
        println!(
            "        {} {}",
            console::style("DETECTIONS:").red().bold(),
            console::style(result.detections.len()).red().bold(),
        );
        for detection in &result.detections {
            println!(
                "          [{}] src={} count={} -- {}",
                console::style(detection.kind.as_str()).yellow(),
                detection.src_ip,
                detection.count,
                detection.reason,
            );
        }
    } else {
        println!("        no detections fired");
    }

    let elapsed = started.elapsed();
    result.metadata.input_filename = reader.filename.clone();
    result.metadata.input_sha256 = reader.file_sha256.clone();
    result.metadata.input_size_bytes = reader.file_size;
    result.metadata.records_skipped = reader.parse_errors;
    result.metadata.analysis_duration_ms = elapsed.as_millis() as u64;

    // 3. Write case files
    println!(
        "  {}",
        console::style("[3/3] writing report").cyan().bold(),
    );

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("cannot create output dir {}", args.out.display()))?;

    let report_path = args.out.join("report.json");
    let report_json =
        serde_json::to_string_pretty(&result).context("failed to serialize report")?;
    std::fs::write(&report_path, &report_json)
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    let markdown_path = args.out.join("report.md");
    std::fs::write(&markdown_path, render::render_markdown(&result))
        .with_context(|| format!("failed to write {}", markdown_path.display()))?;

    println!();
    println!(
        "  {} {}",
        console::style("report ->").green().bold(),
        report_path.display(),
    );
    println!(
        "  {} {}",
        console::style("report ->").green().bold(),
        markdown_path.display(),
    );
    println!(
        "  {} {:.1}ms",
        console::style("completed in").white().bold(),
        elapsed.as_secs_f64() * 1000.0,
    );

    Ok(())
}
