// Import module - Koinly balances report extraction and parsing

pub mod koinly_text;
pub mod pdf_text;
pub mod year_end;

use std::path::Path;
use tracing::info;

use crate::error::ConversionError;

pub use koinly_text::{detect_year, parse_block, parse_report_text, split_blocks, ParsedReport};
pub use pdf_text::{PdfTextExtractor, TextExtractor};
pub use year_end::{parse_year_end_balances, YearEndBalance, YearEndTable};

/// Everything read from one report file
#[derive(Debug)]
pub struct ImportedReport {
    pub parsed: ParsedReport,
    /// Year found in the file name or text, if any
    pub detected_year: Option<i32>,
}

/// Extract text from a report and parse its holdings.
///
/// Only extraction failures are returned as errors; unparseable blocks are
/// collected in `parsed.skipped`.
pub fn import_report<E: TextExtractor + ?Sized>(
    extractor: &E,
    path: &Path,
) -> Result<ImportedReport, ConversionError> {
    info!("Importing Koinly report: {:?}", path);

    let text = extractor.extract_text(path)?;
    let detected_year = detect_year(path, &text);
    let parsed = parse_report_text(&text);

    Ok(ImportedReport {
        parsed,
        detected_year,
    })
}

/// Whether a path has a .pdf extension (any case)
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}
