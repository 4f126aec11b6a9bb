use reqwest::Client;
use serde_json::Value;

use crate::config::LlmConfig;
use crate::error::AppError;
use crate::estimator;
use crate::models::ChangeOrderInput;
use crate::pricing::{compute, MonetaryReport};
use crate::report::{build_document, render_xlsx};

/// Name the generated workbook is based on before it is made unique
pub const BASE_FILENAME: &str = "change_order.xlsx";

/// Everything produced for one change order
#[derive(Debug, Clone)]
pub struct GeneratedChangeOrder {
    pub input: ChangeOrderInput,
    /// Model output as returned, before normalization
    pub raw: Value,
    pub report: MonetaryReport,
    pub workbook: Vec<u8>,
}

/// Description in, priced workbook out
pub async fn generate_from_description(
    client: &Client,
    llm: &LlmConfig,
    description: &str,
) -> Result<GeneratedChangeOrder, AppError> {
    let parsed = estimator::parse_job_description(client, llm, description).await?;
    let (report, workbook) = render_change_order(&parsed.input)?;

    Ok(GeneratedChangeOrder {
        input: parsed.input,
        raw: parsed.raw,
        report,
        workbook,
    })
}

/// Price a validated change order and write it as a workbook
pub fn render_change_order(
    input: &ChangeOrderInput,
) -> Result<(MonetaryReport, Vec<u8>), AppError> {
    let report = compute(input);
    let document = build_document(input, &report);
    let workbook = render_xlsx(&document)?;

    tracing::info!(
        title = %input.display_title(),
        rows = document.rows.len(),
        grand_total = report.grand_total,
        bytes = workbook.len(),
        "Rendered change order"
    );
    Ok((report, workbook))
}
