//! Parse command - dispatch Standard 18 files and verify their totals.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

use bacs_core::models::{Account, OutputFormat, Payment};
use bacs_core::Std18File;

use super::load_config;

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format (default: from config)
    #[arg(short, long, value_enum)]
    format: Option<Format>,

    /// Skip trailer total verification
    #[arg(long)]
    no_verify: bool,

    /// Fail when verification reports any problem
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Format {
    /// JSON output
    Json,
    /// CSV of payment lines
    Csv,
    /// Plain text summary
    Text,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Csv => OutputFormat::Csv,
            Format::Text => OutputFormat::Text,
        }
    }
}

/// Outcome of parsing one file.
#[derive(Serialize)]
struct Report {
    path: PathBuf,
    file: Std18File,
    problems: Vec<String>,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files = expand_inputs(&args.inputs)?;
    let verify = config.parse.verify_totals && !args.no_verify;

    let pb = if files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        info!("Parsing file: {}", path.display());
        let file = read_file(&path)?;
        let problems = if verify {
            file.verify(config.parse.service_user.as_ref())
        } else {
            Vec::new()
        };
        reports.push(Report { path, file, problems });
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let format = args.format.map(OutputFormat::from).unwrap_or(config.output.format);
    let output = match format {
        OutputFormat::Json => format_json(&reports, config.output.pretty)?,
        OutputFormat::Csv => format_csv(&reports)?,
        OutputFormat::Text => format_text(&reports),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    let problem_count: usize = reports.iter().map(|r| r.problems.len()).sum();
    if problem_count > 0 {
        for report in &reports {
            for problem in &report.problems {
                eprintln!("{} {}: {}", style("!").yellow(), report.path.display(), problem);
            }
        }
        if args.strict {
            anyhow::bail!("Verification reported {} problem(s)", problem_count);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Expand glob patterns; a pattern matching nothing is an error.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        let before = files.len();
        files.extend(glob(input)?.filter_map(|r| r.ok()).filter(|p| p.is_file()));
        if files.len() == before {
            anyhow::bail!("No matching files found for: {}", input);
        }
    }
    Ok(files)
}

/// Parse one file into its batches.
pub fn read_file(path: &Path) -> anyhow::Result<Std18File> {
    let input = File::open(path)
        .with_context(|| format!("Cannot open {}", path.display()))?;
    Std18File::read(BufReader::new(input))
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn format_json(reports: &[Report], pretty: bool) -> anyhow::Result<String> {
    let value = match reports {
        [single] => serde_json::to_value(single)?,
        many => serde_json::to_value(many)?,
    };
    Ok(if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    })
}

fn format_csv(reports: &[Report]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "path",
        "batch",
        "line",
        "kind",
        "transaction_type",
        "amount",
        "destination_sort_code",
        "destination_number",
        "destination_name",
        "origin_sort_code",
        "origin_number",
        "origin_name",
        "reference",
    ])?;

    for report in reports {
        let path = report.path.display().to_string();
        for (index, batch) in report.file.batches.iter().enumerate() {
            for payment in &batch.payments {
                let (kind, destination, origin, reference) = match payment {
                    Payment::Contra(c) => ("CONTRA", &c.destination, &c.origin, &c.narrative),
                    Payment::Instruction(i) => ("INSTR", &i.destination, &i.origin, &i.reference),
                };
                let batch_no = (index + 1).to_string();
                let line_no = payment.line_no().to_string();
                let amount = payment.amount().to_string();
                let row: [&str; 13] = [
                    &path,
                    &batch_no,
                    &line_no,
                    kind,
                    payment.transaction_type(),
                    &amount,
                    &destination.sort_code,
                    &destination.number,
                    name(destination),
                    &origin.sort_code,
                    &origin.number,
                    name(origin),
                    reference,
                ];
                wtr.write_record(row)?;
            }
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn name(account: &Account) -> &str {
    account.name.as_deref().unwrap_or("")
}

fn format_text(reports: &[Report]) -> String {
    let mut output = String::new();

    for report in reports {
        output.push_str(&format!("File: {}\n", report.path.display()));
        if let Some(volume) = &report.file.volume {
            output.push_str(&format!(
                "Volume: {} (service user {})\n",
                volume.serial_no, volume.user_number
            ));
        }

        for (index, batch) in report.file.batches.iter().enumerate() {
            let totals = batch.totals();
            output.push_str(&format!(
                "Batch {}: {} payment line(s), processing {}\n",
                index + 1,
                batch.payments.len(),
                batch.user_header.processing_date
            ));
            output.push_str(&format!(
                "  Debits:  {} item(s), {}\n",
                totals.debit_count, totals.debit_value
            ));
            output.push_str(&format!(
                "  Credits: {} item(s), {}\n",
                totals.credit_count, totals.credit_value
            ));
            if totals.ddi_count > 0 {
                output.push_str(&format!("  DDIs:    {} item(s)\n", totals.ddi_count));
            }
        }

        if report.problems.is_empty() {
            output.push_str("Status: OK\n");
        } else {
            output.push_str(&format!("Status: {} problem(s)\n", report.problems.len()));
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}
