//! koinly2irpf - Koinly crypto balances to IRPF "Bens e Direitos" CSV
//!
//! This library turns the text of a Koinly "Balances per Wallet" PDF report
//! into holdings, identifies the custodian of each one (exchange, personal
//! wallet, network, address) and writes one CSV per report in the layout
//! accepted by the Brazilian income-tax declaration.

pub mod batch;
pub mod config;
pub mod custody;
pub mod error;
pub mod importers;
pub mod irpf;
pub mod models;
pub mod utils;

pub use batch::{convert_file, discover_inputs, run_batch, BatchOptions, BatchReport, FileReport};
pub use custody::SourceClassifier;
pub use error::{ConversionError, Result};
pub use importers::{PdfTextExtractor, TextExtractor};
