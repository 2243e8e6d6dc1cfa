//! Batch processing command for multiple permit files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use permitscan_core::models::config::PermitScanConfig;
use permitscan_core::models::permit::PermitField;
use permitscan_core::{
    ExtractionReport, ExtractionResult, PermitImage, PermitScanner, ReportArchive,
    RuleBasedExtractor,
};

use super::extract::{format_result, OutputFormat};
use super::{build_recognizer, load_config, report_archive};

const SUPPORTED_EXTENSIONS: &[&str] = &[
    "txt", "pdf", "png", "jpg", "jpeg", "webp", "gif", "bmp", "tif", "tiff",
];

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

    /// Cloud Vision API key (overrides config and environment)
    #[arg(long)]
    api_key: Option<String>,

    /// Do not write archival reports
    #[arg(long)]
    no_archive: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: Option<(ExtractionResult, ExtractionReport)>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// Shared state for the workers.
struct Worker {
    scanner: PermitScanner,
    extractor: RuleBasedExtractor,
    archive: Option<ReportArchive>,
    file_prefix: String,
}

impl Worker {
    fn new(config: &PermitScanConfig, archive: bool) -> anyhow::Result<Self> {
        let archive = if archive { report_archive(config) } else { None };

        let mut scanner = PermitScanner::new(build_recognizer(config)?)
            .with_extractor(RuleBasedExtractor::from_config(&config.extraction))
            .with_file_prefix(config.archive.file_prefix.clone());
        if let Some(archive) = &archive {
            scanner = scanner.with_archive(archive.clone());
        }

        Ok(Self {
            scanner,
            extractor: RuleBasedExtractor::from_config(&config.extraction),
            archive,
            file_prefix: config.archive.file_prefix.clone(),
        })
    }

    async fn process(&self, path: &Path) -> anyhow::Result<(ExtractionResult, ExtractionReport)> {
        if is_text_file(path) {
            return self.process_text(path);
        }

        let image = PermitImage::from_path(path)?;
        let outcome = self.scanner.scan(&image).await;
        if let Some(error) = outcome.recognition.error {
            anyhow::bail!(error);
        }
        Ok((outcome.extraction, outcome.report))
    }

    fn process_text(&self, path: &Path) -> anyhow::Result<(ExtractionResult, ExtractionReport)> {
        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            anyhow::bail!("No text in file");
        }

        let result = self.extractor.parse(&text);
        let report =
            ExtractionReport::new(&result, Utc::now()).with_file_prefix(&self.file_prefix);
        if let Some(archive) = &self.archive {
            match archive.write(&report) {
                Ok(report_path) => debug!("Archived report to {}", report_path.display()),
                Err(e) => warn!("Could not archive report for {}: {}", path.display(), e),
            }
        }

        Ok((result, report))
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn is_text_file(path: &Path) -> bool {
    extension_of(path) == "txt"
}

fn is_supported(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(path).as_str())
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(key) = &args.api_key {
        config.acquisition.api_key = Some(key.clone());
    }

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let multi_progress = MultiProgress::new();
    let overall_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let worker = Arc::new(Worker::new(&config, !args.no_archive)?);
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let worker = worker.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let file_start = Instant::now();
            let extraction = worker.process(&path).await;
            let processing_time_ms = file_start.elapsed().as_millis() as u64;
            (index, path, extraction, processing_time_ms)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (index, path, extraction, processing_time_ms) = joined?;
        overall_pb.inc(1);

        match extraction {
            Ok(extraction) => results.push((
                index,
                ProcessResult {
                    path,
                    extraction: Some(extraction),
                    error: None,
                    processing_time_ms,
                },
            )),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push((
                        index,
                        ProcessResult {
                            path,
                            extraction: None,
                            error: Some(error_msg),
                            processing_time_ms,
                        },
                    ));
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    tasks.abort_all();
                    overall_pb.abandon();
                    anyhow::bail!("Processing {} failed: {}", path.display(), error_msg);
                }
            }
        }
    }

    overall_pb.finish_with_message("Complete");

    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    let successful: Vec<_> = results.iter().filter(|r| r.extraction.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    for result in &successful {
        let Some((extraction, report)) = &result.extraction else {
            continue;
        };

        match &args.output_dir {
            Some(output_dir) => {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("permit");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, format_result(extraction, report, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
            None => println!(
                "  {} {}: {}/{} fields",
                style("✓").green(),
                result.path.display(),
                extraction.info.populated_count(),
                PermitField::ALL.len()
            ),
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(PermitField::ALL.iter().map(|f| f.key()));
    header.extend(["confidence", "processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let mut row = vec![filename];
        match &result.extraction {
            Some((extraction, _)) => {
                row.push("success".to_string());
                row.extend(
                    PermitField::ALL
                        .iter()
                        .map(|f| extraction.info.get(*f).unwrap_or_default().to_string()),
                );
                row.push(format!("{:.2}", extraction.confidence));
            }
            None => {
                row.push("error".to_string());
                row.extend(PermitField::ALL.iter().map(|_| String::new()));
                row.push(String::new());
            }
        }
        row.push(result.processing_time_ms.to_string());
        row.push(result.error.clone().unwrap_or_default());
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
