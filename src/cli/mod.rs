use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use koinly2irpf::models::ValueBasis;

pub mod formatters;

#[derive(Parser, Debug)]
#[command(name = "koinly2irpf")]
#[command(
    version,
    about = "Convert Koinly 'Balances per Wallet' PDF reports into IRPF CSV files"
)]
#[command(
    long_about = "Reads Koinly 'Balances per Wallet' PDF reports and writes, next to each one, a CSV with one row per crypto asset (Ticker, Qtd, Valor R$ 31/12/YYYY, Discriminação, Cnpj) ready for the IRPF 'Bens e Direitos' section. Existing CSV files with the same name are overwritten."
)]
pub struct Cli {
    /// PDF reports, or directories whose PDF files should be converted
    #[arg(value_name = "INPUTS", required_unless_present = "dirs")]
    pub inputs: Vec<PathBuf>,

    /// Convert every PDF directly inside DIR (not recursive, repeatable)
    #[arg(short, long = "dir", value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Report year for the "Valor R$ 31/12/YYYY" column (detected when omitted)
    #[arg(short, long, value_parser = clap::value_parser!(i32).range(2009..=2100))]
    pub year: Option<i32>,

    /// What the "Valor" column holds [default: market, or the config file's output.value]
    #[arg(long = "value", value_enum, value_name = "BASIS")]
    pub value: Option<ValueColumn>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Show the rows that would be written, without writing any CSV
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Log verbosity (RUST_LOG takes precedence)
    #[arg(long = "log-level", value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueColumn {
    /// Market value on 31 December
    Market,
    /// Acquisition cost from "End of Year Balances", split by quantity
    Cost,
}

impl From<ValueColumn> for ValueBasis {
    fn from(column: ValueColumn) -> Self {
        match column {
            ValueColumn::Market => ValueBasis::Market,
            ValueColumn::Cost => ValueBasis::Cost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
