//! Output formatting module for CLI display
//!
//! Summaries go to stdout as a table or JSON; logs stay on stderr.

use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use koinly2irpf::batch::{BatchReport, Conversion, FileReport};
use koinly2irpf::models::ValueBasis;
use koinly2irpf::utils::{format_brl, format_quantity};

/// Format a batch report for JSON output
pub fn format_batch_json(report: &BatchReport) -> String {
    #[derive(Serialize)]
    struct JsonRow {
        ticker: String,
        quantity: String,
        value_brl: String,
        discrimination: String,
        cnpj: String,
    }

    #[derive(Serialize)]
    struct JsonFile {
        input: String,
        status: &'static str,
        year: Option<i32>,
        value_basis: Option<ValueBasis>,
        output: Option<String>,
        written: bool,
        rows: Vec<JsonRow>,
        warnings: Vec<String>,
        error: Option<String>,
    }

    #[derive(Serialize)]
    struct JsonBatch {
        files: Vec<JsonFile>,
        succeeded: usize,
        failed: usize,
    }

    let files = report
        .files
        .iter()
        .map(|file| {
            let warnings = file.warnings.iter().map(|w| w.to_string()).collect();
            match &file.result {
                Ok(conversion) => JsonFile {
                    input: file.input.display().to_string(),
                    status: "converted",
                    year: Some(conversion.year),
                    value_basis: Some(conversion.basis),
                    output: Some(conversion.output.display().to_string()),
                    written: conversion.written,
                    rows: conversion
                        .records
                        .iter()
                        .map(|r| JsonRow {
                            ticker: r.ticker.clone(),
                            quantity: r.quantity.normalize().to_string(),
                            value_brl: r.value_brl.round_dp(2).to_string(),
                            discrimination: r.discrimination.clone(),
                            cnpj: r.cnpj.clone(),
                        })
                        .collect(),
                    warnings,
                    error: None,
                },
                Err(e) => JsonFile {
                    input: file.input.display().to_string(),
                    status: "failed",
                    year: None,
                    value_basis: None,
                    output: None,
                    written: false,
                    rows: Vec::new(),
                    warnings,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    let json_report = JsonBatch {
        files,
        succeeded: report.succeeded(),
        failed: report.failed(),
    };

    serde_json::to_string_pretty(&json_report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Preview of the rows one file would produce
pub fn format_rows_table(file: &FileReport, conversion: &Conversion) -> String {
    #[derive(Tabled)]
    struct RowPreview {
        #[tabled(rename = "Ticker")]
        ticker: String,
        #[tabled(rename = "Qtd")]
        quantity: String,
        #[tabled(rename = "Valor")]
        value: String,
        #[tabled(rename = "Discriminação")]
        discrimination: String,
    }

    let rows: Vec<RowPreview> = conversion
        .records
        .iter()
        .map(|r| RowPreview {
            ticker: r.ticker.clone(),
            quantity: format_quantity(r.quantity),
            value: format_brl(r.value_brl),
            discrimination: r.discrimination.clone(),
        })
        .collect();

    let total: Decimal = conversion.records.iter().map(|r| r.value_brl).sum();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..3), Alignment::right());

    format!(
        "\n{} {} (31/12/{})\n{}\n{:<12} {}\n",
        "📄".cyan().bold(),
        file.input.display(),
        conversion.year,
        table,
        "Total:".bold(),
        format_brl(total)
    )
}

/// Format the per-file outcome table
pub fn format_batch_table(report: &BatchReport) -> String {
    #[derive(Tabled)]
    struct FileRow {
        #[tabled(rename = "File")]
        file: String,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Rows")]
        rows: String,
        #[tabled(rename = "Skipped")]
        skipped: String,
        #[tabled(rename = "Output / Reason")]
        detail: String,
    }

    let rows: Vec<FileRow> = report
        .files
        .iter()
        .map(|file| {
            let name = file
                .input
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.input.display().to_string());

            match &file.result {
                Ok(conversion) => FileRow {
                    file: name,
                    status: if conversion.written {
                        "✓ converted".green().to_string()
                    } else {
                        "ℹ dry run".blue().to_string()
                    },
                    rows: conversion.records.len().to_string(),
                    skipped: file.skipped_blocks().to_string(),
                    detail: conversion.output.display().to_string(),
                },
                Err(e) => FileRow {
                    file: name,
                    status: "✗ failed".red().to_string(),
                    rows: "-".to_string(),
                    skipped: file.skipped_blocks().to_string(),
                    detail: e.to_string(),
                },
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(2..4), Alignment::right());

    let headline = if report.all_failed() {
        format!("{} All {} files failed", "✗".red().bold(), report.files.len())
    } else if report.failed() > 0 {
        format!(
            "{} {} converted, {} failed",
            "⚠".yellow().bold(),
            report.succeeded(),
            report.failed()
        )
    } else {
        format!("{} {} converted", "✓".green().bold(), report.succeeded())
    };

    format!("\n{}\n\n{}\n", table, headline)
}

/// Recovered problems worth showing under the table
pub fn format_warnings(report: &BatchReport) -> String {
    let mut output = String::new();
    for file in report.files.iter().filter(|f| !f.warnings.is_empty()) {
        output.push_str(&format!("\n{} {}\n", "⚠".yellow().bold(), file.input.display()));
        for warning in &file.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use koinly2irpf::error::ConversionError;
    use koinly2irpf::models::OutputRecord;
    use rust_decimal_macros::dec;
    use std::path::PathBuf;

    fn sample_report() -> BatchReport {
        colored::control::set_override(false);
        BatchReport {
            files: vec![
                FileReport {
                    input: PathBuf::from("/r/koinly_2023.pdf"),
                    result: Ok(Conversion {
                        output: PathBuf::from("/r/koinly_2023.csv"),
                        year: 2023,
                        basis: ValueBasis::Market,
                        records: vec![OutputRecord {
                            ticker: "BTC".to_string(),
                            quantity: dec!(0.500),
                            value_brl: dec!(150000),
                            discrimination: "BTC custodiado na exchange Binance".to_string(),
                            cnpj: String::new(),
                        }],
                        written: true,
                    }),
                    warnings: vec![ConversionError::parse(4, "unrecognized ticker 'btc'")],
                },
                FileReport {
                    input: PathBuf::from("/r/broken.pdf"),
                    result: Err(ConversionError::NoHoldings(PathBuf::from("/r/broken.pdf"))),
                    warnings: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_json_summary() {
        let json: serde_json::Value =
            serde_json::from_str(&format_batch_json(&sample_report())).unwrap();
        assert_eq!(json["succeeded"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["files"][0]["status"], "converted");
        assert_eq!(json["files"][0]["value_basis"], "market");
        assert_eq!(json["files"][0]["rows"][0]["quantity"], "0.5");
        assert_eq!(json["files"][0]["rows"][0]["value_brl"], "150000");
        assert_eq!(json["files"][1]["status"], "failed");
        assert!(json["files"][1]["error"]
            .as_str()
            .unwrap()
            .contains("no holdings found"));
    }

    #[test]
    fn test_batch_table_lists_every_file() {
        let table = format_batch_table(&sample_report());
        assert!(table.contains("koinly_2023.pdf"));
        assert!(table.contains("broken.pdf"));
        assert!(table.contains("1 converted, 1 failed"));
    }

    #[test]
    fn test_rows_table_uses_brazilian_format() {
        let report = sample_report();
        let file = &report.files[0];
        let conversion = file.result.as_ref().unwrap();
        let table = format_rows_table(file, conversion);
        assert!(table.contains("0,5"));
        assert!(table.contains("R$ 150.000,00"));
    }

    #[test]
    fn test_warnings_listed_per_file() {
        let text = format_warnings(&sample_report());
        assert!(text.contains("koinly_2023.pdf"));
        assert!(text.contains("unrecognized ticker 'btc'"));
        assert!(!text.contains("broken.pdf"));
    }
}
