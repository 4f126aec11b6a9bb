use anyhow::{bail, Context, Result};
use change_order_generator::{
    config,
    generator::{self, BASE_FILENAME},
    pdf::{self, PREVIEW_CHARS},
    pricing::MonetaryReport,
    report::{format::format_usd, XLSX_CONTENT_TYPE},
    storage,
};
use colored::Colorize;
use std::io::{BufRead, IsTerminal};
use std::path::Path;
use tracing::info;

use crate::cli::GenerateArgs;

/// Execute the generate command
///
/// Takes the description from `--text`, `--pdf`, or stdin, writes the
/// workbook to `--output`, and optionally uploads it.
pub async fn execute(config_path: &Path, args: GenerateArgs) -> Result<()> {
    let cfg = config::load_unvalidated(config_path)?;
    config::validate_llm(&cfg.llm)?;
    if args.upload {
        config::validate_storage(&cfg.storage)?;
    }

    let description = match (&args.text, &args.pdf) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => description_from_pdf(path).await?,
        (None, None) => description_from_stdin()?,
    };
    if description.trim().is_empty() {
        bail!("Job description cannot be empty");
    }

    println!("{}", "Parsing job description...".yellow());
    let client = reqwest::Client::new();
    let generated =
        generator::generate_from_description(&client, &cfg.llm, &description).await?;

    tokio::fs::write(&args.output, &generated.workbook)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!(output = %args.output.display(), "Wrote change order workbook");

    println!("{}", "✓ Change order generated".green());
    println!("  {}: {}", "Title".cyan(), generated.input.display_title());
    println!("  {}: {}", "File".cyan(), args.output.display());

    if args.upload {
        let store = storage::from_config(&cfg.storage, &client);
        let filename = storage::generate_unique_filename(BASE_FILENAME);
        let url = storage::upload(
            store.as_ref(),
            &cfg.storage.prefix,
            &filename,
            generated.workbook,
            XLSX_CONTENT_TYPE,
        )
        .await?;
        println!("  {}: {}", "Uploaded".cyan(), url);
    }

    println!();
    print_totals(&generated.report);
    Ok(())
}

async fn description_from_pdf(path: &Path) -> Result<String> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        bail!("File '{}' is not a PDF file", path.display());
    }

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("File '{}' not found or unreadable", path.display()))?;
    let text = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes)).await??;

    println!("{}", "Successfully extracted text from PDF.".green());
    println!("\n{}\n{}\n", "Preview of extracted text:".bold(), pdf::preview(&text, PREVIEW_CHARS));
    Ok(text)
}

fn description_from_stdin() -> Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        println!("Enter your job description below (even a general description works).");
        println!("Type 'END' on a new line when finished:");
    }
    Ok(read_description(stdin.lock())?)
}

/// Read lines until one that is just `END` (any case) or EOF
fn read_description<R: BufRead>(reader: R) -> std::io::Result<String> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().eq_ignore_ascii_case("END") {
            break;
        }
        lines.push(line);
    }
    Ok(lines.join("\n"))
}

fn print_totals(report: &MonetaryReport) {
    println!("{}", "Totals:".bold());
    println!("  {:<28} {}", "Materials", format_usd(report.materials_subtotal));
    println!("  {:<28} {}", "Equipment", format_usd(report.equipment_subtotal));
    println!("  {:<28} {}", "Labor", format_usd(report.labor_subtotal));
    println!(
        "  {:<28} {}",
        "General Requirements",
        format_usd(report.general_requirements_subtotal)
    );
    println!("  {:<28} {}", "Total Direct Cost", format_usd(report.total_direct_cost));
    println!("  {:<28} {}", "Overhead", format_usd(report.overhead_amount));
    println!("  {:<28} {}", "Profit", format_usd(report.profit_amount));
    if let Some(subs) = &report.subcontractors {
        println!("  {:<28} {}", "Subcontractors", format_usd(subs.subtotal));
        println!("  {:<28} {}", "GC OH&P on Subcontractors", format_usd(subs.markup_total));
    }
    println!(
        "  {:<28} {}",
        "Grand Total".bold(),
        format_usd(report.grand_total).green().bold()
    );
}
