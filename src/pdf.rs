use crate::error::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Characters shown by [`preview`] before truncating
pub const PREVIEW_CHARS: usize = 200;

/// Extract and clean the text of an in-memory PDF.
///
/// CPU bound; call from `spawn_blocking` on the server.
pub fn extract_text(bytes: &[u8]) -> Result<String, AppError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(AppError::BadRequest(
            "Uploaded file is not a valid PDF".to_string(),
        ));
    }

    // pdf_extract can panic on malformed PDFs
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    let raw = match result {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            return Err(AppError::BadRequest(format!(
                "Failed to extract text from PDF: {}",
                e
            )))
        }
        Err(_) => {
            return Err(AppError::BadRequest(
                "Failed to extract text from PDF: malformed document".to_string(),
            ))
        }
    };

    let text = clean_pdf_text(&raw);
    if text.is_empty() {
        return Err(AppError::BadRequest(
            "No meaningful text extracted from PDF".to_string(),
        ));
    }

    tracing::info!(chars = text.chars().count(), "Extracted text from PDF");
    Ok(text)
}

/// Collapse extracted text to single-spaced prose without control characters
pub fn clean_pdf_text(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .flat_map(str::split_whitespace)
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First `max_chars` characters, with `...` appended when cut short
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_pdf_payload() {
        let err = extract_text(b"PK\x03\x04 not a pdf").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(err.to_string().contains("not a valid PDF"));
    }

    #[test]
    fn test_extracts_text_from_valid_pdf() {
        let bytes = include_bytes!("../tests/fixtures/replace_doors.pdf");
        let text = extract_text(bytes).unwrap();
        assert!(text.contains("Replace three doors"), "extracted: {text:?}");
    }

    #[test]
    fn test_rejects_truncated_pdf() {
        let err = extract_text(b"%PDF-1.4\n%%EOF").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[test]
    fn test_clean_pdf_text() {
        let raw = "Scope of Work\n\n\n  Replace   3 doors\t on level 2 \n\u{0007}\nEND\u{0000}";
        assert_eq!(clean_pdf_text(raw), "Scope of Work Replace 3 doors on level 2 END");
    }

    #[test]
    fn test_clean_pdf_text_blank() {
        assert_eq!(clean_pdf_text(" \n\t\n"), "");
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview("short", PREVIEW_CHARS), "short");
        let long = "é".repeat(250);
        let shown = preview(&long, PREVIEW_CHARS);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), 203);
        assert_eq!(preview("abc", 3), "abc");
    }
}
