// CSV output for the IRPF import
//
// Columns: Ticker, Qtd, Valor R$ 31/12/<year>, Discriminação, Cnpj.
// Numbers use a decimal comma with no digit grouping. An existing file at the
// output path is replaced: the same input always yields the same bytes.

use csv::{Terminator, WriterBuilder};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ConversionError;
use crate::models::OutputRecord;
use crate::utils::{format_money, format_quantity};

pub const DEFAULT_DELIMITER: u8 = b',';

/// Same directory and base name as the report, `.csv` extension
pub fn output_path_for(input: &Path) -> PathBuf {
    input.with_extension("csv")
}

pub fn value_header(year: i32) -> String {
    format!("Valor R$ 31/12/{}", year)
}

/// Render the full CSV document, header included
pub fn render_csv(
    records: &[OutputRecord],
    year: i32,
    delimiter: u8,
) -> Result<String, ConversionError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let value_column = value_header(year);
    writer.write_record(["Ticker", "Qtd", value_column.as_str(), "Discriminação", "Cnpj"])?;

    for record in records {
        let quantity = format_quantity(record.quantity);
        let value = format_money(record.value_brl);
        writer.write_record([
            record.ticker.as_str(),
            quantity.as_str(),
            value.as_str(),
            record.discrimination.as_str(),
            record.cnpj.as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ConversionError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| ConversionError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Write the CSV to `path`, replacing any existing file
pub fn write_csv(
    path: &Path,
    records: &[OutputRecord],
    year: i32,
    delimiter: u8,
) -> Result<(), ConversionError> {
    let content = render_csv(records, year, delimiter)?;
    fs::write(path, content)?;
    info!("Wrote {} rows to {:?}", records.len(), path);
    Ok(())
}
