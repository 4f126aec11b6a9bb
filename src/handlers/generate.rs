use axum::{
    extract::{Multipart, State},
    Form, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Instant;

use super::AppState;
use crate::{
    error::{error_type_name, AppError},
    generator::{self, GeneratedChangeOrder, BASE_FILENAME},
    metrics, pdf, storage,
    report::XLSX_CONTENT_TYPE,
};

const SUCCESS_MESSAGE: &str = "Change order generated successfully";

#[derive(Debug, Deserialize)]
pub struct TextForm {
    #[serde(default)]
    pub description: String,
}

/// Stored workbook location
struct Upload {
    filename: String,
    url: String,
}

/// Handle POST /generate-from-pdf
///
/// Expects a multipart body with a `file` field holding a `.pdf` upload.
pub async fn generate_from_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let start = Instant::now();
    let result = process_pdf(&state, multipart).await;
    finish("pdf", start, result)
}

/// Handle POST /generate-from-text
///
/// Expects a form body with a `description` field.
pub async fn generate_from_text(
    State(state): State<AppState>,
    Form(form): Form<TextForm>,
) -> Result<Json<Value>, AppError> {
    let start = Instant::now();
    let result = process_text(&state, &form.description).await;
    finish("text", start, result)
}

async fn process_pdf(state: &AppState, multipart: Multipart) -> Result<Json<Value>, AppError> {
    let bytes = read_pdf_field(multipart).await?;
    tracing::info!(bytes = bytes.len(), "Received PDF upload");

    let description = tokio::task::spawn_blocking(move || pdf::extract_text(&bytes))
        .await
        .map_err(|e| AppError::InternalError(format!("PDF extraction task failed: {}", e)))??;

    let mut generated = generate(state, &description).await?;
    let upload = store(state, std::mem::take(&mut generated.workbook)).await?;

    Ok(Json(json!({
        "status": "success",
        "message": SUCCESS_MESSAGE,
        "download_url": upload.url,
        "filename": upload.filename,
        "totals": generated.report,
    })))
}

async fn process_text(state: &AppState, description: &str) -> Result<Json<Value>, AppError> {
    if description.trim().is_empty() {
        return Err(AppError::BadRequest("Description cannot be empty".to_string()));
    }

    let mut generated = generate(state, description).await?;
    let upload = store(state, std::mem::take(&mut generated.workbook)).await?;

    Ok(Json(json!({
        "status": "success",
        "message": SUCCESS_MESSAGE,
        "file_url": upload.url,
        "filename": upload.filename,
        "data": generated.raw,
        "totals": generated.report,
    })))
}

async fn read_pdf_field(mut multipart: Multipart) -> Result<Vec<u8>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_pdf = field
            .file_name()
            .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return Err(AppError::BadRequest("File must be a PDF".to_string()));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?;
        return Ok(bytes.to_vec());
    }

    Err(AppError::BadRequest("Missing 'file' field".to_string()))
}

async fn generate(state: &AppState, description: &str) -> Result<GeneratedChangeOrder, AppError> {
    let config = state.config.load_full();
    generator::generate_from_description(&state.http_client, &config.llm, description).await
}

async fn store(state: &AppState, workbook: Vec<u8>) -> Result<Upload, AppError> {
    let config = state.config.load_full();
    let filename = storage::generate_unique_filename(BASE_FILENAME);
    let store = storage::from_config(&config.storage, &state.http_client);

    let url = storage::upload(
        store.as_ref(),
        &config.storage.prefix,
        &filename,
        workbook,
        XLSX_CONTENT_TYPE,
    )
    .await?;

    Ok(Upload { filename, url })
}

fn finish(
    source: &str,
    start: Instant,
    result: Result<Json<Value>, AppError>,
) -> Result<Json<Value>, AppError> {
    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => error_type_name(e),
    };
    metrics::record_change_order(source, outcome);
    tracing::info!(
        source = source,
        outcome = outcome,
        duration_ms = start.elapsed().as_millis() as u64,
        "Change order request finished"
    );
    result
}
