//! Report shaper CLI - batch shaping and inspection

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use shaper::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "shaper")]
#[command(
    author,
    version,
    about = "Reshape downloaded KPI report spreadsheets for presentation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shape every report in a per-date output directory
    Run {
        /// Base output directory containing per-date subdirectories
        #[arg(long, default_value = "output")]
        dir: PathBuf,

        /// Date subdirectory to process (DDMMYYYY, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Also merge the shaped reports into "Kết quả.xlsx"
        #[arg(long)]
        consolidate: bool,
    },

    /// Shape individual report files in place
    File {
        /// Report files to shape
        #[arg(required = true)]
        reports: Vec<PathBuf>,
    },

    /// Show information about a spreadsheet
    Info {
        /// Input spreadsheet file
        input: PathBuf,
    },

    /// List all sheets in a document
    Sheets {
        /// Input spreadsheet file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            dir,
            date,
            consolidate,
        } => run_batch(&dir, date.as_deref(), consolidate),
        Commands::File { reports } => shape_files(&reports),
        Commands::Info { input } => show_info(&input),
        Commands::Sheets { input } => list_sheets(&input),
    }
}

fn run_batch(dir: &Path, date: Option<&str>, consolidate: bool) -> Result<()> {
    let date = date
        .map(str::to_string)
        .unwrap_or_else(shaper::batch::daily_directory_name);
    let daily_dir = dir.join(&date);

    if !daily_dir.is_dir() {
        bail!("Daily directory not found: {}", daily_dir.display());
    }

    let outcome = shape_directory(&daily_dir, consolidate)
        .with_context(|| format!("Failed to process '{}'", daily_dir.display()))?;

    println!(
        "{}/{} files shaped in '{}'",
        outcome.succeeded,
        outcome.attempted,
        daily_dir.display()
    );
    if let Some(path) = &outcome.consolidated {
        println!("Consolidated into '{}'", path.display());
    }

    if !outcome.is_success() {
        bail!("No files were shaped");
    }
    Ok(())
}

fn shape_files(reports: &[PathBuf]) -> Result<()> {
    let mut failed = 0usize;

    for report in reports {
        match shape_file(report) {
            Ok(stats) => {
                println!(
                    "{}: {} rows hidden, {} tails cleared",
                    report.display(),
                    stats.hidden_rows(),
                    stats.cleared_tails
                );
            }
            Err(e) => {
                eprintln!("{}: {}", report.display(), e);
                failed += 1;
            }
        }
    }

    if failed == reports.len() {
        bail!("No files were shaped");
    }
    Ok(())
}

fn show_info(input: &Path) -> Result<()> {
    let document = Document::open(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    println!("File: {}", input.display());
    println!("Sheets: {}", document.sheet_count());

    for (i, grid) in document.grids().enumerate() {
        println!();
        println!("  Sheet {}: \"{}\"", i, grid.name());

        if let Some(range) = grid.used_range() {
            println!(
                "    Used range: {} rows x {} columns",
                range.end_row + 1,
                range.end_col + 1
            );
        } else {
            println!("    Used range: empty");
        }
        println!("    Hidden rows: {}", grid.hidden_rows().len());
        println!("    Hidden columns: {}", grid.hidden_columns().len());
        if let Some(freeze) = grid.freeze_boundary() {
            println!("    Frozen above row {}", freeze.row + 1);
        }
    }

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let document = Document::open(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, grid) in document.grids().enumerate() {
        println!("{}\t{}", i, grid.name());
    }

    Ok(())
}
