//! mederror-report - print annotation statistics and write exports
//!
//! Runs the viewer's core against files on disk, without the HTTP service.

use anyhow::{Context, Result};
use clap::Parser;
use mederror_common::export::ExportFormat;
use mederror_common::Session;
use mederror_viewer::api::buildinfo::BuildInfo;
use mederror_viewer::report::{build_report, export_to_dir, render_text};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mederror-report")]
#[command(about = "Summarize and export an error-annotation file")]
#[command(version)]
struct Args {
    /// Taxonomy YAML file
    #[arg(short, long)]
    taxonomy: Option<PathBuf>,

    /// Annotation JSON file
    #[arg(short, long)]
    annotations: PathBuf,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Directory to write <name>_updated.json into
    #[arg(long, value_name = "DIR")]
    export_json: Option<PathBuf>,

    /// Directory to write <name>_updated.csv into
    #[arg(long, value_name = "DIR")]
    export_csv: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "warn", env = "MEDERROR_LOG")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays machine-readable with --json
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .init();

    info!("mederror-report {}", BuildInfo::CURRENT);

    let mut session = Session::new();
    if let Some(path) = &args.taxonomy {
        session
            .load_taxonomy_file(path)
            .with_context(|| format!("Failed to load taxonomy {}", path.display()))?;
    }
    session
        .load_annotations_file(&args.annotations)
        .with_context(|| format!("Failed to load annotations {}", args.annotations.display()))?;

    let report = build_report(&session).context("No annotations loaded")?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&report));
    }

    for (format, dir) in [
        (ExportFormat::Json, &args.export_json),
        (ExportFormat::Csv, &args.export_csv),
    ] {
        if let Some(dir) = dir {
            let path = export_to_dir(&session, format, dir)
                .with_context(|| format!("Failed to export {}", format.extension()))?;
            eprintln!("Wrote {}", path.display());
        }
    }

    Ok(())
}
