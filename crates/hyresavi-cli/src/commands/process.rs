//! Process command - extract data from a single invoice file.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use hyresavi_core::{build_record, InvoiceStore, JsonFileStore, PutOutcome};

use super::output::{format_record, OutputFormat};
use super::{load_config, resolve_user};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// User id attached to the record
    #[arg(short, long)]
    user: Option<String>,

    /// Store the record in this JSON store, skipping months already stored
    #[arg(long)]
    store: Option<PathBuf>,

    /// Validate every breakdown label/value pair
    #[arg(long)]
    strict: bool,

    /// Hide the progress spinner
    #[arg(short, long)]
    quiet: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if args.strict {
        config.extraction.strict_pairing = true;
    }

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    pb.set_message("Extracting invoice data...");
    let user_id = resolve_user(args.user.as_deref(), &config);
    let record = build_record(&args.input, &config, &user_id)?;
    pb.finish_and_clear();

    if let Some(store_path) = args.store.as_ref().or(config.pipeline.store_path.as_ref()) {
        let mut store = JsonFileStore::open(store_path)?;
        match store.put_if_new_period(record.clone())? {
            PutOutcome::Stored => eprintln!(
                "{} Stored {} in {}",
                style("✓").green(),
                record.invoice_id,
                store_path.display()
            ),
            PutOutcome::DuplicatePeriod(period) => eprintln!(
                "{} Invoice for {} has already been processed, not stored",
                style("ℹ").blue(),
                period
            ),
        }
    }

    // Format output
    let output = format_record(&record, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
