mod cli;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{formatters, Cli, LogLevel};
use koinly2irpf::config::Config;
use koinly2irpf::{discover_inputs, run_batch, BatchOptions, PdfTextExtractor, SourceClassifier};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_tracing(cli.log_level, cli.no_color);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

/// RUST_LOG wins over --log-level; logs go to stderr
fn init_tracing(level: LogLevel, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;
    debug!("Using configuration: {:?}", config);

    let options = BatchOptions {
        year_override: cli.year,
        dry_run: cli.dry_run,
        delimiter: config.output.delimiter_byte()?,
        value_basis: cli.value.map(Into::into).unwrap_or(config.output.value),
    };
    let classifier = SourceClassifier::with_extras(&config.classification);

    let files = discover_inputs(&cli.inputs, &cli.dirs)?;
    if files.is_empty() {
        eprintln!("{} No PDF files found in the given inputs", "✗".red().bold());
        return Ok(ExitCode::FAILURE);
    }

    info!("Converting {} files", files.len());
    let report = run_batch(&PdfTextExtractor, &classifier, &files, &options);

    if cli.json {
        println!("{}", formatters::format_batch_json(&report));
    } else {
        if cli.dry_run {
            for file in &report.files {
                if let Ok(conversion) = &file.result {
                    println!("{}", formatters::format_rows_table(file, conversion));
                }
            }
        }
        print!("{}", formatters::format_batch_table(&report));
        print!("{}", formatters::format_warnings(&report));
        if cli.dry_run {
            println!("\n{} Dry run - no CSV files written", "ℹ".blue().bold());
        }
    }

    Ok(if report.all_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
