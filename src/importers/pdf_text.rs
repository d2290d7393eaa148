// PDF text extraction - thin wrapper around pdf-extract
//
// The pipeline only sees the `TextExtractor` trait so that tests and other
// front-ends can feed text without a real PDF.

use pdf_extract::extract_text;
use std::panic;
use std::path::Path;
use tracing::{info, warn};

use crate::error::ConversionError;

pub trait TextExtractor {
    /// Return the plain text of the whole document, pages joined by newlines
    fn extract_text(&self, path: &Path) -> Result<String, ConversionError>;
}

/// Extracts text from PDF files with `pdf-extract`
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ConversionError> {
        info!("Extracting text from PDF: {:?}", path);

        if !path.is_file() {
            return Err(extraction_error(path, "file not found"));
        }

        // pdf-extract panics on some malformed documents instead of returning an error
        let text = match panic::catch_unwind(|| extract_text(path)) {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(extraction_error(path, &e.to_string())),
            Err(_) => {
                warn!("PDF parser panicked on {:?}", path);
                return Err(extraction_error(path, "malformed PDF (parser aborted)"));
            }
        };

        if text.trim().is_empty() {
            return Err(extraction_error(
                path,
                "no extractable text (scanned or image-only PDF?)",
            ));
        }

        info!("Extracted {} lines of text", text.lines().count());
        Ok(text)
    }
}

fn extraction_error(path: &Path, reason: &str) -> ConversionError {
    ConversionError::Extraction {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
