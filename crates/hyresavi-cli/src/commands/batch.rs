//! Batch processing command for multiple invoice files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use hyresavi_core::{
    build_record, keys, DuePeriod, InvoiceRecord, InvoiceStore, JsonFileStore, PutOutcome,
};

use super::output::{format_record, OutputFormat};
use super::{load_config, resolve_user};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// User id attached to every record
    #[arg(short, long)]
    user: Option<String>,

    /// Store records in this JSON store, skipping months already stored
    #[arg(long)]
    store: Option<PathBuf>,

    /// Validate every breakdown label/value pair
    #[arg(long)]
    strict: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    record: Option<InvoiceRecord>,
    error: Option<String>,
    /// Set when another invoice for the same due period was kept instead.
    duplicate_of: Option<DuePeriod>,
    processing_time_ms: u64,
}

impl ProcessResult {
    fn status(&self) -> &'static str {
        match (&self.record, &self.duplicate_of) {
            (Some(_), None) => "success",
            (Some(_), Some(_)) => "skipped",
            (None, _) => "error",
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = load_config(config_path)?;
    if args.strict {
        config.extraction.strict_pairing = true;
    }

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let shared_config = Arc::new(config.clone());
    let user_id = resolve_user(args.user.as_deref(), &config);

    // Each file is parsed on its own blocking worker; parses share nothing.
    let mut pending = stream::iter(files)
        .map(|path| {
            let config = Arc::clone(&shared_config);
            let user_id = user_id.clone();
            async move {
                let file_start = Instant::now();
                let task_path = path.clone();
                let result = tokio::task::spawn_blocking(move || {
                    build_record(&task_path, &config, &user_id).map_err(anyhow::Error::from)
                })
                .await
                .unwrap_or_else(|e| Err(anyhow::anyhow!("worker failed: {}", e)));
                (path, result, file_start.elapsed().as_millis() as u64)
            }
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some((path, result, processing_time_ms)) = pending.next().await {
        match result {
            Ok(record) => results.push(ProcessResult {
                path,
                record: Some(record),
                error: None,
                duplicate_of: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = format!("{:#}", e);
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        record: None,
                        error: Some(error_msg),
                        duplicate_of: None,
                        processing_time_ms,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_and_clear();

    // Workers finish in any order; report in file order.
    results.sort_by(|a, b| a.path.cmp(&b.path));

    mark_duplicates(&mut results);

    if let Some(store_path) = args.store.as_ref().or(config.pipeline.store_path.as_ref()) {
        let mut store = JsonFileStore::open(store_path)?;
        for result in results.iter_mut().filter(|r| r.duplicate_of.is_none()) {
            if let Some(record) = &result.record {
                if let PutOutcome::DuplicatePeriod(period) =
                    store.put_if_new_period(record.clone())?
                {
                    result.duplicate_of = Some(period);
                }
            }
        }
    }

    // Write outputs
    if let Some(output_dir) = &args.output_dir {
        for result in results.iter().filter(|r| r.status() == "success") {
            if let Some(record) = &result.record {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("invoice");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_record(record, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let count = |status: &str| results.iter().filter(|r| r.status() == status).count();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} skipped, {} failed",
        style(count("success")).green(),
        style(count("skipped")).yellow(),
        style(count("error")).red()
    );

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();
    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Keep the first invoice of each due period and mark later ones.
fn mark_duplicates(results: &mut [ProcessResult]) {
    let mut seen = HashSet::new();

    for result in results.iter_mut() {
        let Some(period) = result.record.as_ref().and_then(InvoiceRecord::period) else {
            continue;
        };
        if !seen.insert(period) {
            warn!(
                "{} is another invoice for {}, skipping",
                result.path.display(),
                period
            );
            result.duplicate_of = Some(period);
        }
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_id",
        "due_date",
        "total_amount",
        "rent",
        "vat",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let processing_time_ms = result.processing_time_ms.to_string();

        if let Some(record) = &result.record {
            let fields = &record.fields;
            wtr.write_record([
                filename,
                result.status(),
                record.invoice_id.as_str(),
                fields.due_date().unwrap_or(""),
                fields.total_amount().unwrap_or(""),
                fields.text(keys::HYRA).unwrap_or(""),
                fields.moms().unwrap_or(""),
                processing_time_ms.as_str(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                result.status(),
                "",
                "",
                "",
                "",
                "",
                processing_time_ms.as_str(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
