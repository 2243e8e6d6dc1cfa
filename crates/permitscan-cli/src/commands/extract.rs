//! Extract command - pull permit fields out of recognized text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use console::style;
use tracing::{debug, info};

use permitscan_core::models::permit::PermitField;
use permitscan_core::{ExtractionReport, ExtractionResult, RuleBasedExtractor};

use super::{load_config, report_archive};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Text file with recognized permit text ("-" reads stdin)
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write an archival report
    #[arg(long)]
    archive: bool,

    /// Show extraction warnings and confidence
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
    /// Archival report layout
    Report,
}

impl OutputFormat {
    /// File extension used when writing this format to disk.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text | OutputFormat::Report => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let text = read_input(&args.input)?;

    info!("Extracting permit fields from {}", args.input);

    let extractor = RuleBasedExtractor::from_config(&config.extraction);
    let result = extractor.parse(&text);
    let report =
        ExtractionReport::new(&result, Utc::now()).with_file_prefix(&config.archive.file_prefix);

    if args.archive {
        let Some(archive) = report_archive(&config) else {
            anyhow::bail!("Report archiving is disabled in the configuration");
        };
        let path = archive.write(&report)?;
        eprintln!("{} Report written to {}", style("✓").green(), path.display());
    }

    let output = format_result(&result, &report, args.format)?;

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

    if args.show_confidence {
        print_summary(&result);
    }

    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let bytes = fs::read(&path)?;
    if bytes.starts_with(b"%PDF-") {
        anyhow::bail!(
            "{} is a PDF. Use 'permitscan scan' to read PDFs and images.",
            path.display()
        );
    }

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(String::from_utf8(bytes)?)
}

pub fn print_summary(result: &ExtractionResult) {
    eprintln!();
    eprintln!(
        "{} Fields found: {}/{}",
        style("ℹ").blue(),
        result.info.populated_count(),
        PermitField::ALL.len()
    );
    eprintln!(
        "{} Extraction confidence: {:.1}%",
        style("ℹ").blue(),
        result.confidence * 100.0
    );
    for provenance in &result.provenance {
        eprintln!(
            "  {:<20} {:?} ({:.2})",
            provenance.field.label(),
            provenance.strategy,
            provenance.confidence
        );
    }
    if !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }
}

pub fn format_result(
    result: &ExtractionResult,
    report: &ExtractionReport,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
        OutputFormat::Report => Ok(report.to_string()),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header: Vec<&str> = PermitField::ALL.iter().map(|f| f.key()).collect();
    header.push("confidence");
    wtr.write_record(&header)?;

    let mut row: Vec<String> = PermitField::ALL
        .iter()
        .map(|f| result.info.get(*f).unwrap_or_default().to_string())
        .collect();
    row.push(format!("{:.2}", result.confidence));
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    for field in PermitField::ALL {
        let value = result.info.get(field).unwrap_or("-");
        output.push_str(&format!("{:<20} {}\n", format!("{}:", field.label()), value));
    }

    if !result.success {
        output.push_str("\nNo text to extract from.\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    const PERMIT: &str = "Business ID No.: S041008-00061\nOWNER'S NAME: JUAN DELA CRUZ";

    fn parse(text: &str) -> (ExtractionResult, ExtractionReport) {
        let result = RuleBasedExtractor::new().parse(text);
        let at = Utc.with_ymd_and_hms(2025, 3, 20, 8, 15, 30).unwrap();
        let report = ExtractionReport::new(&result, at);
        (result, report)
    }

    #[test]
    fn test_csv_has_header_and_row() {
        let (result, report) = parse(PERMIT);
        let csv = format_result(&result, &report, OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "ownerName,businessName,address,businessIdNo,businessTin,businessPermitNo,dateIssued,validUntil,confidence"
        );
        assert_eq!(lines[1], "JUAN DELA CRUZ,,,S041008-00061,,,,,0.85");
    }

    #[test]
    fn test_text_marks_missing_fields() {
        let (result, report) = parse(PERMIT);
        let text = format_result(&result, &report, OutputFormat::Text).unwrap();

        assert!(text.contains("Owner Name:          JUAN DELA CRUZ\n"));
        assert!(text.contains("Business Tin:        -\n"));
        assert!(!text.contains("No text to extract from."));
    }

    #[test]
    fn test_report_format_matches_report_display() {
        let (result, report) = parse(PERMIT);
        let output = format_result(&result, &report, OutputFormat::Report).unwrap();
        assert_eq!(output, report.to_string());
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let (result, report) = parse(PERMIT);
        let json: serde_json::Value =
            serde_json::from_str(&format_result(&result, &report, OutputFormat::Json).unwrap())
                .unwrap();
        assert_eq!(json["info"]["businessIdNo"], "S041008-00061");
        assert_eq!(json["success"], true);
    }
}
