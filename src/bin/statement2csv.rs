use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use bank_statement_tables::{
    ExtractOptions, ExtractionReport, PageSelection, Postprocessed, TableSource,
    process_pdf_to_dir, process_tables_to_dir,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "statement2csv",
    version,
    about = "Turn bank statement tables into one normalized ledger CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract tables from a statement PDF, then clean and export them.
    Extract(ExtractArgs),
    /// Clean and export tables another extractor saved as JSON.
    Postprocess(PostprocessArgs),
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Output directory for combined_data.csv and other_table_N.csv.
    #[arg(short, long)]
    output: PathBuf,

    /// Output delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Print the combined table as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Page selection like all or 1,2,3.
    #[arg(long, default_value = "all")]
    pages: String,

    /// Minimum cells required for a line to open a table.
    #[arg(long, default_value_t = 3)]
    min_cols: usize,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Args)]
struct PostprocessArgs {
    /// JSON file holding a list of tables.
    #[arg(short, long)]
    input: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

fn parse_delimiter(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }
    u8::try_from(delimiter).context("delimiter must be a single ASCII character")
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let pages = PageSelection::from_str(&args.pages).context("failed to parse --pages")?;

    Ok(ExtractOptions {
        pages,
        min_cols: args.min_cols,
        delimiter: parse_delimiter(args.output.delimiter)?,
        ..ExtractOptions::default()
    })
}

fn read_tables_json(path: &Path) -> Result<Vec<TableSource>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let tables: Vec<serde_json::Value> = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a JSON list of tables", path.display()))?;
    Ok(tables.into_iter().map(TableSource::Json).collect())
}

fn log_outcome(output: &Postprocessed, report: &ExtractionReport, verbose: bool) {
    if verbose {
        eprintln!(
            "{} row(s) from {} table(s), {} other table(s)",
            report.row_count, report.table_count, report.other_count
        );
        for file in &report.files {
            eprintln!("  wrote {}", file.display());
        }
    }

    if output.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", output.warnings.len());
    if verbose {
        for warning in &output.warnings {
            eprintln!(
                "  - {:?} table={:?} row={:?}: {}",
                warning.code, warning.table_index, warning.row_index, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<(Postprocessed, ExtractionReport)> {
    let options = parse_options(args)?;
    process_pdf_to_dir(&args.input, &args.output.output, &options)
        .with_context(|| format!("failed to extract tables from '{}'", args.input.display()))
}

fn run_postprocess(args: &PostprocessArgs) -> Result<(Postprocessed, ExtractionReport)> {
    let tables = read_tables_json(&args.input)?;
    let delimiter = parse_delimiter(args.output.delimiter)?;
    process_tables_to_dir(tables, &args.output.output, delimiter)
        .with_context(|| format!("failed to post-process '{}'", args.input.display()))
}

fn finish(result: Result<(Postprocessed, ExtractionReport)>, output_args: &OutputArgs) -> ExitCode {
    let (output, report) = match result {
        Ok(outcome) => outcome,
        Err(error) => {
            eprintln!("error: {error:#}");
            return ExitCode::from(1);
        }
    };

    log_outcome(&output, &report, output_args.verbose);
    if output_args.json {
        match serde_json::to_string_pretty(&output.combined) {
            Ok(json) => println!("{json}"),
            Err(error) => {
                eprintln!("error: failed to serialize combined table: {error}");
                return ExitCode::from(1);
            }
        }
    }

    if report.row_count > 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bank_statement_tables=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => finish(run_extract(&args), &args.output),
        Commands::Postprocess(args) => finish(run_postprocess(&args), &args.output),
    }
}
