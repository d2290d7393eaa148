//! Integration tests for koinly2irpf
//!
//! These tests drive the library end to end with a text extractor standing in
//! for the PDF reader:
//! - Compact and sectioned Koinly report text
//! - Custody classification, BSC correction and address shortening
//! - Per-ticker aggregation with exact decimals
//! - CSV output and re-run stability
//! - Batch failure isolation

use koinly2irpf::batch::{convert_file, discover_inputs, run_batch, BatchOptions};
use koinly2irpf::custody::SourceClassifier;
use koinly2irpf::error::ConversionError;
use koinly2irpf::importers::{parse_block, TextExtractor};
use koinly2irpf::irpf::{aggregate, format_discrimination};
use koinly2irpf::models::{RawBlock, SourceKind};
use rust_decimal_macros::dec;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Treats report files as UTF-8 text
struct TextFile;

impl TextExtractor for TextFile {
    fn extract_text(&self, path: &Path) -> Result<String, ConversionError> {
        fs::read_to_string(path).map_err(|e| ConversionError::Extraction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

const KOINLY_REPORT: &str = "\
Koinly - Complete Tax Report 2023
Balances per Wallet
Binance
Currency Amount Price Value
BTC (Bitcoin) 0,5 R$300.000,00 R$150.000,00
ETH (Ethereum) 0,1 R$10.000,00 R$1.000,00
Total wallet value at 31/12/2023 R$151.000,00
MetaMask - Ethereum
Wallet address: 0x1234567890abcdef1234567890abcdef12345678
Currency Amount Price Value
ETH (Ethereum) 0,2 R$10.000,00 R$2.000,00
Total wallet value at 31/12/2023 R$2.000,00
Carteira pessoal - BNB Smart Chain (antigo)
Wallet address: 0xabcdefabcdefabcdefabcdefabcdefabcdef9999
Currency Amount Price Value
BNB 1,25 R$1.500,00 R$1.875,00
Total wallet value at 31/12/2023 R$1.875,00
";

fn write_report(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_compact_line_to_output_record() {
    let block = RawBlock {
        text: "BTC 0.5 R$ 150000,00 Binance".to_string(),
        line: 1,
        context: None,
    };
    let holding = parse_block(&block).unwrap();
    assert_eq!(holding.ticker, "BTC");
    assert_eq!(holding.quantity, dec!(0.5));
    assert_eq!(holding.value_brl, dec!(150000.00));
    assert_eq!(holding.source_label, "Binance");

    let source = SourceClassifier::new().identify(&holding.source_label).info;
    assert_eq!(source.kind, SourceKind::Exchange);
    assert_eq!(source.display_name, "Binance");

    let records = aggregate(&[(holding, source)]);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ticker, "BTC");
    assert_eq!(records[0].quantity, dec!(0.5));
    assert_eq!(records[0].value_brl, dec!(150000.00));
    assert!(records[0].discrimination.contains("Binance"));
}

#[test]
fn test_legacy_bsc_wallet_label() {
    let label = "Carteira pessoal 0x1234567890abcdef1234567890abcdef12345678 BNB Smart Chain (antigo)";
    let source = SourceClassifier::new().identify(label).info;

    assert_eq!(source.kind, SourceKind::PersonalWallet);
    assert_eq!(source.network.as_deref(), Some("BNB Smart Chain"));
    let address = source.address.clone().unwrap();
    assert_eq!(address, "0x1234...5678");
    assert_eq!(address.len(), 13);

    let text = format_discrimination("BNB", &source);
    assert!(!text.contains("antigo"));
    assert!(!text.contains("0x1234567890abcdef"));
}

#[test]
fn test_koinly_report_end_to_end() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "koinly_2023.pdf", KOINLY_REPORT);

    let report = convert_file(
        &TextFile,
        &SourceClassifier::new(),
        &input,
        &BatchOptions::default(),
    );
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    let conversion = report.result.unwrap();

    let tickers: Vec<&str> = conversion.records.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["BTC", "ETH", "BNB"]);

    // ETH held on Binance and in MetaMask
    let eth = &conversion.records[1];
    assert_eq!(eth.quantity, dec!(0.3));
    assert_eq!(eth.value_brl, dec!(3000));
    assert_eq!(
        eth.discrimination,
        "ETH custodiado na exchange Binance (Qtd 0,1); \
         ETH custodiado em carteira própria MetaMask na rede Ethereum, endereço 0x1234...5678 (Qtd 0,2)"
    );

    let bnb = &conversion.records[2];
    assert_eq!(
        bnb.discrimination,
        "BNB custodiado em carteira própria na rede BNB Smart Chain, endereço 0xabcd...9999"
    );

    let csv = fs::read_to_string(dir.path().join("koinly_2023.csv")).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Ticker,Qtd,Valor R$ 31/12/2023,Discriminação,Cnpj");
    assert!(lines[1].starts_with("BTC,\"0,5\",\"150000,00\","));
    assert!(lines.iter().skip(1).all(|l| l.ends_with(',')));
}

#[test]
fn test_rerun_produces_identical_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "koinly_2023.pdf", KOINLY_REPORT);
    let classifier = SourceClassifier::new();
    let options = BatchOptions::default();

    convert_file(&TextFile, &classifier, &input, &options).result.unwrap();
    let first = fs::read(dir.path().join("koinly_2023.csv")).unwrap();
    convert_file(&TextFile, &classifier, &input, &options).result.unwrap();
    let second = fs::read(dir.path().join("koinly_2023.csv")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_directory_with_one_corrupt_report() {
    let dir = TempDir::new().unwrap();
    write_report(dir.path(), "good_2023.pdf", "BTC 0.5 R$ 150000,00 Binance\n");
    fs::write(dir.path().join("corrupt_2023.pdf"), [0xde, 0xad, 0xbe, 0xef, 0xff]).unwrap();

    let files = discover_inputs(&[dir.path().to_path_buf()], &[]).unwrap();
    let report = run_batch(
        &TextFile,
        &SourceClassifier::new(),
        &files,
        &BatchOptions::default(),
    );

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);
    assert!(!report.all_failed());

    let failure = report.files.iter().find(|f| !f.is_success()).unwrap();
    assert!(failure.input.ends_with("corrupt_2023.pdf"));
    assert!(matches!(
        failure.result,
        Err(ConversionError::Extraction { .. })
    ));

    let csv_count = fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|x| x == "csv"))
        .count();
    assert_eq!(csv_count, 1);
}

#[test]
fn test_year_override_changes_value_header() {
    let dir = TempDir::new().unwrap();
    let input = write_report(dir.path(), "koinly_2023.pdf", KOINLY_REPORT);
    let options = BatchOptions {
        year_override: Some(2024),
        ..BatchOptions::default()
    };

    convert_file(&TextFile, &SourceClassifier::new(), &input, &options)
        .result
        .unwrap();
    let csv = fs::read_to_string(dir.path().join("koinly_2023.csv")).unwrap();
    assert!(csv.starts_with("Ticker,Qtd,Valor R$ 31/12/2024,"));
}
