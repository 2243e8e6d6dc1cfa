//! Scan command - recognize and extract a single permit image or PDF.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use permitscan_core::models::config::PersistenceConfig;
use permitscan_core::{
    submit, HttpPermitStore, PermitImage, PermitScanner, RuleBasedExtractor, ScanOutcome,
    Submission,
};

use super::extract::{format_result, print_summary, OutputFormat};
use super::{build_recognizer, load_config, report_archive};

/// Arguments for the scan command.
#[derive(Args)]
pub struct ScanArgs {
    /// Permit image or PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Cloud Vision API key (overrides config and environment)
    #[arg(long)]
    api_key: Option<String>,

    /// Do not write an archival report
    #[arg(long)]
    no_archive: bool,

    /// Save the extracted fields for this signup
    #[arg(long)]
    signup_id: Option<u64>,

    /// Line of business sent along with the saved permit
    #[arg(long, requires = "signup_id")]
    business_line: Option<String>,

    /// Backend base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Show extraction warnings and confidence
    #[arg(long)]
    show_confidence: bool,
}

pub async fn run(args: ScanArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(key) = &args.api_key {
        config.acquisition.api_key = Some(key.clone());
    }
    if let Some(url) = &args.base_url {
        config.persistence.base_url = Some(url.clone());
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let image = PermitImage::from_path(&args.input)?;
    info!("Scanning {} ({})", args.input.display(), image.extension());

    let mut scanner = PermitScanner::new(build_recognizer(&config)?)
        .with_extractor(RuleBasedExtractor::from_config(&config.extraction))
        .with_file_prefix(config.archive.file_prefix.clone());
    if !args.no_archive {
        if let Some(archive) = report_archive(&config) {
            scanner = scanner.with_archive(archive);
        }
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Recognizing text...");

    let outcome = scanner.scan(&image).await;
    pb.finish_and_clear();

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&outcome)?,
        format => format_result(&outcome.extraction, &outcome.report, format)?,
    };

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

    if let Some(path) = &outcome.report_path {
        eprintln!("{} Report written to {}", style("✓").green(), path.display());
    }

    if args.show_confidence {
        print_summary(&outcome.extraction);
    }

    if let Some(signup_id) = args.signup_id {
        save(&args, &config.persistence, signup_id, &image, &outcome).await?;
    }

    debug!("Total processing time: {:?}", start.elapsed());

    if let Some(error) = &outcome.recognition.error {
        anyhow::bail!("Text recognition failed: {}", error);
    }

    Ok(())
}

async fn save(
    args: &ScanArgs,
    persistence: &PersistenceConfig,
    signup_id: u64,
    image: &PermitImage,
    outcome: &ScanOutcome,
) -> anyhow::Result<()> {
    let store = HttpPermitStore::new(persistence)?;
    info!("Saving permit to {}", store.url());

    let response = submit(
        &store,
        outcome,
        Submission {
            signup_id,
            image: Some(image),
            business_line: args.business_line.clone(),
        },
    )
    .await;

    if response.success {
        let action = response.action.as_deref().unwrap_or("saved");
        eprintln!(
            "{} Permit {} for signup {}: {}",
            style("✓").green(),
            action,
            signup_id,
            response.message
        );
    } else {
        eprintln!(
            "{} Permit not saved: {}",
            style("✗").red(),
            response.message
        );
    }

    Ok(())
}
