use std::panic::{catch_unwind, AssertUnwindSafe};

use super::ExtractionError;

const IMAGE_HINT: &str =
    "Please ensure the PDF contains selectable text and is not image-based.";

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractionError::Failed(format!(
            "Failed to extract text from PDF file ({e}). {IMAGE_HINT}"
        ))),
        Err(_) => Err(ExtractionError::Failed(format!(
            "PDF parser aborted on a malformed file. {IMAGE_HINT}"
        ))),
    }
}
