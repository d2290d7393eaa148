//! Batch driver: runs the conversion pipeline over every input file
//!
//! Files are processed one after another. A failure in one file is recorded
//! in its `FileReport` and never stops the others.

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::custody::SourceClassifier;
use crate::error::ConversionError;
use crate::importers::{import_report, is_pdf, TextExtractor};
use crate::irpf::{aggregate, allocate_costs, output_path_for, write_csv, DEFAULT_DELIMITER};
use crate::models::{Holding, OutputRecord, SourceInfo, ValueBasis};

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Report year to use instead of the detected one
    pub year_override: Option<i32>,
    /// Parse and classify but do not write any CSV
    pub dry_run: bool,
    pub delimiter: u8,
    pub value_basis: ValueBasis,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            year_override: None,
            dry_run: false,
            delimiter: DEFAULT_DELIMITER,
            value_basis: ValueBasis::Market,
        }
    }
}

/// Successful conversion of one file
#[derive(Debug)]
pub struct Conversion {
    pub output: PathBuf,
    pub year: i32,
    pub basis: ValueBasis,
    pub records: Vec<OutputRecord>,
    /// False in dry-run mode
    pub written: bool,
}

/// Outcome of one input file
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub result: std::result::Result<Conversion, ConversionError>,
    /// Recovered problems: skipped blocks, ambiguous labels, missing costs
    pub warnings: Vec<ConversionError>,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn skipped_blocks(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, ConversionError::Parse { .. }))
            .count()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    /// Non-zero exit only when there was something to do and nothing worked
    pub fn all_failed(&self) -> bool {
        !self.files.is_empty() && self.succeeded() == 0
    }
}

/// Expand command-line inputs into the list of files to convert.
///
/// Directories contribute their direct `.pdf` children (non-recursive,
/// sorted by name); plain paths are kept as given. Duplicates are dropped.
pub fn discover_inputs(inputs: &[PathBuf], dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(list_pdfs(input)?);
        } else {
            files.push(input.clone());
        }
    }
    for dir in dirs {
        files.extend(list_pdfs(dir)?);
    }

    Ok(files.into_iter().unique().collect())
}

fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {:?}", dir))?;

    let mut pdfs = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list directory {:?}", dir))?
            .path();
        if path.is_file() && is_pdf(&path) {
            pdfs.push(path);
        }
    }
    pdfs.sort();

    info!("Found {} PDF files in {:?}", pdfs.len(), dir);
    Ok(pdfs)
}

/// Convert every file, isolating failures
pub fn run_batch<E: TextExtractor + ?Sized>(
    extractor: &E,
    classifier: &SourceClassifier,
    files: &[PathBuf],
    options: &BatchOptions,
) -> BatchReport {
    let files = files
        .iter()
        .map(|path| convert_file(extractor, classifier, path, options))
        .collect();
    BatchReport { files }
}

/// Full pipeline for one report: extract, parse, classify, aggregate, write
pub fn convert_file<E: TextExtractor + ?Sized>(
    extractor: &E,
    classifier: &SourceClassifier,
    path: &Path,
    options: &BatchOptions,
) -> FileReport {
    let mut warnings = Vec::new();
    let result = run_pipeline(extractor, classifier, path, options, &mut warnings);

    match &result {
        Ok(conversion) => info!(
            "Converted {:?}: {} rows ({} warnings)",
            path,
            conversion.records.len(),
            warnings.len()
        ),
        Err(e) => warn!("Failed to convert {:?}: {}", path, e),
    }

    FileReport {
        input: path.to_path_buf(),
        result,
        warnings,
    }
}

fn run_pipeline<E: TextExtractor + ?Sized>(
    extractor: &E,
    classifier: &SourceClassifier,
    path: &Path,
    options: &BatchOptions,
    warnings: &mut Vec<ConversionError>,
) -> std::result::Result<Conversion, ConversionError> {
    let imported = import_report(extractor, path)?;
    warnings.extend(imported.parsed.skipped);

    if imported.parsed.holdings.is_empty() {
        return Err(ConversionError::NoHoldings(path.to_path_buf()));
    }

    let year = resolve_year(options.year_override, imported.detected_year, path);

    let holdings = match options.value_basis {
        ValueBasis::Market => imported.parsed.holdings,
        ValueBasis::Cost => {
            let allocation = allocate_costs(imported.parsed.holdings, &imported.parsed.balances);
            warnings.extend(allocation.warnings);
            allocation.holdings
        }
    };

    let classified: Vec<(Holding, SourceInfo)> = holdings
        .into_iter()
        .map(|holding| {
            let classification = classifier.identify(&holding.source_label);
            if let Some(ambiguity) = classification.ambiguity {
                let repeated = warnings.iter().any(|w| w.to_string() == ambiguity.to_string());
                if !repeated {
                    warn!("{}", ambiguity);
                    warnings.push(ambiguity);
                }
            }
            (holding, classification.info)
        })
        .collect();

    let records = aggregate(&classified);
    let output = output_path_for(path);

    if !options.dry_run {
        write_csv(&output, &records, year, options.delimiter)?;
    }

    Ok(Conversion {
        output,
        year,
        basis: options.value_basis,
        records,
        written: !options.dry_run,
    })
}

/// Explicit year, else detected, else the previous calendar year
pub fn resolve_year(year_override: Option<i32>, detected: Option<i32>, path: &Path) -> i32 {
    if let Some(year) = year_override.or(detected) {
        return year;
    }

    let fallback = Local::now().year() - 1;
    warn!(
        "Could not detect the report year of {:?}, assuming {} (use --year to override)",
        path, fallback
    );
    fallback
}
