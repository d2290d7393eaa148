//! Error handling for koinly2irpf
//!
//! Defines the conversion error kinds and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error types for report conversion
#[derive(Error, Debug)]
pub enum ConversionError {
    /// PDF unreadable or corrupt. Fatal for that file only.
    #[error("extraction error in {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    /// A block could not be turned into a holding. The block is skipped.
    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// The label matched more than one custodian. Never blocks output.
    #[error("ambiguous source label '{label}': {reason}")]
    ClassificationAmbiguity { label: String, reason: String },

    /// Cost basis requested but the year-end table has no usable row
    /// for this ticker. Its value falls back to zero.
    #[error("no year-end cost for {ticker}: {reason}")]
    MissingCost { ticker: String, reason: String },

    #[error("no holdings found in {0}")]
    NoHoldings(PathBuf),

    #[error("config error: {0}")]
    Config(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConversionError {
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        ConversionError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Result type alias for conversion operations
pub type Result<T> = anyhow::Result<T>;
