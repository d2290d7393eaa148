// Koinly "Balances per Wallet" text parser
//
// Turns the plain text of a Koinly balances report into holdings. Two layouts
// are understood:
//
//   Sectioned (the real export):
//     Balances per Wallet
//     MetaMask - Ethereum
//     Wallet address: 0x1234...
//     Currency Amount Price Value
//     ETH (Ethereum) 1,5 R$10.000,00 R$15.000,00
//     Total wallet value at 31/12/2023 R$15.000,00
//
//   Compact, one holding per line with its own label:
//     BTC 0.5 R$ 150000,00 Binance

use chrono::NaiveDate;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::path::Path;
use tracing::{debug, info, warn};

use super::year_end::{self, YearEndBalance};
use crate::custody::extract_address;
use crate::error::ConversionError;
use crate::models::{Holding, RawBlock};
use crate::utils::parse_decimal;

/// Bitcoin genesis year; nothing earlier can be a crypto report year
const FIRST_REPORT_YEAR: i32 = 2009;
const LAST_REPORT_YEAR: i32 = 2100;

static WALLET_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bBalances\s+per\s+Wallet\b").unwrap());

static CURRENCY_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Currency\s+Amount\s+Price\s+Value\b").unwrap());

static WALLET_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Wallet\s+address:\s*(.+)$").unwrap());

static WALLET_TOTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Total\s+wallet\s+value\s+at\b").unwrap());

// Page furniture repeated by the PDF renderer, and "@ R$x per BTC" price notes
static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:page\s+\d+(?:\s+of\s+\d+)?|total\b.*|koinly\b.*|generated\s+(?:at|on)\b.*|balances\s+per\s+wallet\b.*|@\s*R\$\s*\S+\s+per\s+\S+)$",
    )
    .unwrap()
});

/// TICKER [(Name)] QUANTITY [rest]
static DATA_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<ticker>[^\s(]+)(?:\s*\([^)]*\))?\s+(?P<qty>\(?-?\d(?:[\d.,]*\d)?\)?)(?:\s+(?P<rest>.*))?$",
    )
    .unwrap()
});

// Short uppercase symbol, optionally with a lowercase prefix (stETH, wBTC)
// or a bridged-token suffix (USDC.e)
static TICKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{0,3}[A-Z0-9][A-Z0-9/#\-]*(?:\.[A-Za-z0-9]{1,4})?$").unwrap()
});

static BRL_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"R\$\s*\(?-?\d(?:[\d.,]*\d)?\)?").unwrap());

static BARE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\(?-?\d(?:[\d.,]*\d)?\)?$").unwrap());

static YEAR_END_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\b31/12/|\bDec(?:ember)?\s+31,?\s+)(\d{4})\b").unwrap()
});

static YEAR_IN_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^0-9])((?:19|20)\d{2})(?:[^0-9]|$)").unwrap());

/// Holdings parsed from one report, plus the blocks that had to be skipped
#[derive(Debug, Default)]
pub struct ParsedReport {
    pub holdings: Vec<Holding>,
    /// "End of Year Balances" rows, empty when the report has none
    pub balances: Vec<YearEndBalance>,
    pub skipped: Vec<ConversionError>,
}

/// Split the extracted text into one block per holding line.
///
/// Lines of the "End of Year Balances" table are never holdings.
pub fn split_blocks(text: &str) -> Vec<RawBlock> {
    let all_lines: Vec<&str> = text.lines().collect();
    let lines: Vec<&str> = match year_end::locate(&all_lines) {
        Some(bounds) => {
            debug!("Year-end table at lines {:?}, not holdings", bounds.whole);
            all_lines
                .iter()
                .enumerate()
                .map(|(idx, line)| if bounds.whole.contains(&idx) { "" } else { *line })
                .collect()
        }
        None => all_lines,
    };

    match lines.iter().position(|line| WALLET_SECTION.is_match(line)) {
        Some(start) => {
            info!("Found 'Balances per Wallet' section at line {}", start + 1);
            split_wallet_section(&lines, start)
        }
        None => {
            debug!("No wallet section marker, reading one holding per line");
            split_compact(&lines)
        }
    }
}

/// First token has the shape of a ticker symbol
pub(crate) fn leads_with_ticker(line: &str) -> bool {
    line.split_whitespace().next().is_some_and(is_ticker)
}

fn split_wallet_section(lines: &[&str], start: usize) -> Vec<RawBlock> {
    let mut blocks = Vec::new();
    let mut title: Option<String> = None;
    let mut title_has_address = false;
    let mut title_has_rows = false;
    let mut pending_address: Option<String> = None;
    let mut in_table = false;

    for (idx, raw) in lines.iter().enumerate().skip(start + 1) {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if CURRENCY_HEADER.is_match(line) {
            in_table = true;
            continue;
        }

        if let Some(caps) = WALLET_ADDRESS.captures(line) {
            let address = caps[1].trim().to_string();
            match title.as_mut() {
                Some(current) if !title_has_address && !title_has_rows => {
                    current.push_str(" - ");
                    current.push_str(&address);
                    title_has_address = true;
                }
                // Belongs to the wallet that follows
                _ => pending_address = Some(address),
            }
            continue;
        }

        if WALLET_TOTAL.is_match(line) {
            in_table = false;
            continue;
        }

        if NOISE.is_match(line) {
            continue;
        }

        // Rows that fail to parse still go to parse_block so the error is
        // recorded; they must never become the title of the rows below them
        if is_table_row(line, in_table) {
            blocks.push(RawBlock {
                text: line.to_string(),
                line: idx + 1,
                context: title.clone(),
            });
            title_has_rows = true;
            continue;
        }

        if !line.chars().any(char::is_alphabetic) {
            continue;
        }

        // Anything else opens a new wallet
        let mut new_title = line.to_string();
        title_has_address = extract_address(line).is_some();
        if let Some(address) = pending_address.take() {
            if !title_has_address {
                new_title = format!("{} - {}", new_title, address);
                title_has_address = true;
            }
        }
        debug!("Wallet section '{}' at line {}", new_title, idx + 1);
        title = Some(new_title);
        title_has_rows = false;
        in_table = false;
    }

    blocks
}

fn is_table_row(line: &str, in_table: bool) -> bool {
    line.contains("R$") || (in_table && (DATA_LINE.is_match(line) || leads_with_ticker(line)))
}

// Every line that starts like a holding is a block, parseable or not
fn split_compact(lines: &[&str]) -> Vec<RawBlock> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, raw)| (idx + 1, raw.trim()))
        .filter(|(_, line)| {
            !line.is_empty()
                && !NOISE.is_match(line)
                && (DATA_LINE.is_match(line) || leads_with_ticker(line))
        })
        .map(|(line_no, line)| RawBlock {
            text: line.to_string(),
            line: line_no,
            context: None,
        })
        .collect()
}

/// Parse one block into a holding.
///
/// Fails when the ticker or quantity cannot be located, or when a number is
/// negative. A missing value is zero.
pub fn parse_block(block: &RawBlock) -> Result<Holding, ConversionError> {
    let text = block.text.trim();
    let caps = DATA_LINE.captures(text).ok_or_else(|| {
        ConversionError::parse(block.line, format!("no ticker and quantity in '{}'", text))
    })?;

    let ticker = &caps["ticker"];
    if !is_ticker(ticker) {
        return Err(ConversionError::parse(
            block.line,
            format!("unrecognized ticker '{}'", ticker),
        ));
    }

    let quantity = parse_amount(&caps["qty"], block.line, "quantity")?;
    let rest = caps.name("rest").map_or("", |m| m.as_str());
    let (value_brl, inline_label) = split_value_and_label(rest, block.line)?;

    let source_label = if inline_label.is_empty() {
        block.context.clone().unwrap_or_default()
    } else {
        inline_label
    };

    let value_brl = value_brl.unwrap_or_else(|| {
        warn!("Line {}: no value for {}, using zero", block.line, ticker);
        Decimal::ZERO
    });

    Ok(Holding {
        ticker: ticker.to_string(),
        quantity,
        value_brl,
        source_label,
        line: block.line,
    })
}

/// Split and parse the whole text, collecting skipped blocks instead of failing
pub fn parse_report_text(text: &str) -> ParsedReport {
    let year_end = year_end::parse_year_end_balances(text);
    let mut report = ParsedReport {
        balances: year_end.balances,
        skipped: year_end.skipped,
        ..ParsedReport::default()
    };

    for block in split_blocks(text) {
        match parse_block(&block) {
            Ok(holding) => report.holdings.push(holding),
            Err(e) => {
                warn!("Skipping block: {}", e);
                report.skipped.push(e);
            }
        }
    }

    info!(
        "Parsed {} holdings ({} blocks skipped)",
        report.holdings.len(),
        report.skipped.len()
    );
    report
}

fn is_ticker(token: &str) -> bool {
    token.len() <= 20 && TICKER.is_match(token) && token.chars().any(|c| c.is_ascii_uppercase())
}

fn parse_amount(raw: &str, line: usize, what: &str) -> Result<Decimal, ConversionError> {
    let value = parse_decimal(raw)
        .map_err(|_| ConversionError::parse(line, format!("invalid {} '{}'", what, raw.trim())))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ConversionError::parse(
            line,
            format!("negative {} '{}'", what, raw.trim()),
        ));
    }
    Ok(value)
}

/// Value is the last R$ amount (Koinly prints price, then value). Without R$
/// markers, the last of the numbers right after the quantity.
fn split_value_and_label(
    rest: &str,
    line: usize,
) -> Result<(Option<Decimal>, String), ConversionError> {
    if let Some(last) = BRL_AMOUNT.find_iter(rest).last() {
        let value = parse_amount(last.as_str(), line, "value")?;
        let label = BRL_AMOUNT.replace_all(rest, " ");
        return Ok((Some(value), clean_label(&label)));
    }

    let mut tokens = rest.split_whitespace().peekable();
    let numbers: Vec<&str> = tokens
        .peeking_take_while(|token| BARE_NUMBER.is_match(token))
        .collect();
    let label = tokens.join(" ");

    let value = match numbers.last() {
        Some(raw) => Some(parse_amount(raw, line, "value")?),
        None => None,
    };
    Ok((value, clean_label(&label)))
}

fn clean_label(label: &str) -> String {
    label
        .split_whitespace()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c == '|' || c.is_whitespace())
        .to_string()
}

/// Report year from the file name, else from a year-end date in the text
pub fn detect_year(path: &Path, text: &str) -> Option<i32> {
    let from_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(year_from_file_name);
    if let Some(year) = from_name {
        debug!("Report year {} taken from file name {:?}", year, path);
        return Some(year);
    }

    let from_text = year_from_text(text);
    if let Some(year) = from_text {
        debug!("Report year {} taken from report text", year);
    }
    from_text
}

fn year_from_file_name(stem: &str) -> Option<i32> {
    // koinly_2023_report -> second part
    let second_part = stem
        .split('_')
        .nth(1)
        .and_then(|part| part.trim().parse::<i32>().ok())
        .filter(|year| is_plausible_year(*year));

    second_part.or_else(|| {
        YEAR_IN_NAME
            .captures_iter(stem)
            .filter_map(|caps| caps[1].parse::<i32>().ok())
            .find(|year| is_plausible_year(*year))
    })
}

fn year_from_text(text: &str) -> Option<i32> {
    YEAR_END_DATE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<i32>().ok())
        .find(|year| is_plausible_year(*year) && NaiveDate::from_ymd_opt(*year, 12, 31).is_some())
}

fn is_plausible_year(year: i32) -> bool {
    (FIRST_REPORT_YEAR..=LAST_REPORT_YEAR).contains(&year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SECTIONED: &str = "\
Koinly
Balances per Wallet
Binance
Currency Amount Price Value
BTC 0,5 R$300.000,00 R$150.000,00
ETH (Ethereum) 2 R$10.000,00 R$20.000,00
Total wallet value at 31/12/2023 R$170.000,00
MetaMask - BNB Smart Chain (antigo)
Wallet address: 0x1234567890abcdef1234567890abcdef12345678
Currency Amount Price Value
BNB 1,25 R$1.500,00 R$1.875,00
Total wallet value at 31/12/2023 R$1.875,00
Page 2 of 2
";

    fn block(text: &str) -> RawBlock {
        RawBlock {
            text: text.to_string(),
            line: 1,
            context: None,
        }
    }

    #[test]
    fn test_parse_compact_line() {
        let holding = parse_block(&block("BTC 0.5 R$ 150000,00 Binance")).unwrap();
        assert_eq!(holding.ticker, "BTC");
        assert_eq!(holding.quantity, dec!(0.5));
        assert_eq!(holding.value_brl, dec!(150000.00));
        assert_eq!(holding.source_label, "Binance");
    }

    #[test]
    fn test_parse_ticker_with_name_and_price_column() {
        let holding =
            parse_block(&block("ETH (Ethereum) 1,5 R$10.000,00 R$15.000,00 MetaMask - Ethereum"))
                .unwrap();
        assert_eq!(holding.ticker, "ETH");
        assert_eq!(holding.quantity, dec!(1.5));
        // Last R$ amount is the value, not the unit price
        assert_eq!(holding.value_brl, dec!(15000));
        assert_eq!(holding.source_label, "MetaMask - Ethereum");
    }

    #[test]
    fn test_missing_value_defaults_to_zero() {
        let holding = parse_block(&block("SOL 3 Phantom")).unwrap();
        assert_eq!(holding.quantity, dec!(3));
        assert_eq!(holding.value_brl, Decimal::ZERO);
        assert_eq!(holding.source_label, "Phantom");
    }

    #[test]
    fn test_bare_value_without_currency_marker() {
        let holding = parse_block(&block("ADA 100 250,75 Ledger")).unwrap();
        assert_eq!(holding.value_brl, dec!(250.75));
        assert_eq!(holding.source_label, "Ledger");
    }

    #[test]
    fn test_context_label_used_when_line_has_none() {
        let raw = RawBlock {
            text: "USDC.e 10 R$5,00 R$50,00".to_string(),
            line: 7,
            context: Some("Rabby - Polygon".to_string()),
        };
        let holding = parse_block(&raw).unwrap();
        assert_eq!(holding.ticker, "USDC.e");
        assert_eq!(holding.source_label, "Rabby - Polygon");
        assert_eq!(holding.line, 7);
    }

    #[test]
    fn test_rejects_unrecognized_ticker() {
        let err = parse_block(&block("btc 0.5 R$ 1,00 Binance")).unwrap_err();
        assert!(matches!(err, ConversionError::Parse { .. }));
        assert!(err.to_string().contains("unrecognized ticker 'btc'"));
    }

    #[test]
    fn test_rejects_missing_quantity() {
        let err = parse_block(&block("BTC R$ 1,00 Binance")).unwrap_err();
        assert!(err.to_string().contains("no ticker and quantity"));
    }

    #[test]
    fn test_rejects_negative_numbers() {
        let err = parse_block(&block("BTC (0,5) R$ 1,00 Binance")).unwrap_err();
        assert!(err.to_string().contains("negative quantity"));

        let err = parse_block(&block("BTC 0,5 R$(1.234,56) Binance")).unwrap_err();
        assert!(err.to_string().contains("negative value"));
    }

    #[test]
    fn test_split_wallet_section() {
        let blocks = split_blocks(SECTIONED);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].context.as_deref(), Some("Binance"));
        assert_eq!(blocks[1].context.as_deref(), Some("Binance"));
        assert_eq!(
            blocks[2].context.as_deref(),
            Some("MetaMask - BNB Smart Chain (antigo) - 0x1234567890abcdef1234567890abcdef12345678")
        );
        assert_eq!(blocks[0].line, 5);
    }

    #[test]
    fn test_parse_report_text_sectioned() {
        let report = parse_report_text(SECTIONED);
        assert!(report.skipped.is_empty());
        let tickers: Vec<&str> = report.holdings.iter().map(|h| h.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["BTC", "ETH", "BNB"]);
        assert_eq!(report.holdings[0].value_brl, dec!(150000));
        assert_eq!(report.holdings[2].quantity, dec!(1.25));
        assert_eq!(report.holdings[2].value_brl, dec!(1875));
    }

    #[test]
    fn test_parse_report_text_records_bad_lines() {
        let text = "BTC 0.5 R$ 150000,00 Binance\nbtc 1 R$ 2,00 Kraken\nETH 2 R$ 20000,00 Ledger\n";
        let report = parse_report_text(text);
        assert_eq!(report.holdings.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].to_string().starts_with("parse error at line 2"));
    }

    #[test]
    fn test_address_line_after_rows_goes_to_next_wallet() {
        let text = "\
Balances per Wallet
Ledger
Currency Amount Price Value
BTC 1 R$1,00 R$1,00
Wallet address: bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq
Bitcoin
Currency Amount Price Value
BTC 2 R$1,00 R$2,00
";
        let blocks = split_blocks(text);
        assert_eq!(blocks[0].context.as_deref(), Some("Ledger"));
        assert_eq!(
            blocks[1].context.as_deref(),
            Some("Bitcoin - bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq")
        );
    }

    #[test]
    fn test_detect_year_from_file_name() {
        assert_eq!(detect_year(Path::new("/tmp/koinly_2023_report.pdf"), ""), Some(2023));
        assert_eq!(detect_year(Path::new("balances-2022.pdf"), ""), Some(2022));
    }

    #[test]
    fn test_detect_year_from_text() {
        assert_eq!(detect_year(Path::new("report.pdf"), SECTIONED), Some(2023));
        assert_eq!(
            detect_year(Path::new("report.pdf"), "Balances as of Dec 31, 2021"),
            Some(2021)
        );
        assert_eq!(detect_year(Path::new("report.pdf"), "no dates here"), None);
    }

    #[test]
    fn test_unparseable_wallet_row_is_skipped_not_a_title() {
        let text = "\
Balances per Wallet
Binance
Currency Amount Price Value
ETH R$10.000,00 R$15.000,00
BTC 0,5 R$300.000,00 R$150.000,00
Total wallet value at 31/12/2023 R$150.000,00
";
        let report = parse_report_text(text);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].to_string().starts_with("parse error at line 4"));
        assert_eq!(report.holdings.len(), 1);
        assert_eq!(report.holdings[0].ticker, "BTC");
        assert_eq!(report.holdings[0].source_label, "Binance");
    }

    #[test]
    fn test_row_without_quantity_inside_table() {
        let text = "\
Balances per Wallet
Ledger
Currency Amount Price Value
SOL 3
ADA (Cardano)
DOT 2 R$10,00 R$20,00
";
        let report = parse_report_text(text);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].to_string().contains("'ADA (Cardano)'"));
        assert_eq!(report.holdings.len(), 2);
        assert_eq!(report.holdings[0].value_brl, Decimal::ZERO);
        assert!(report.holdings.iter().all(|h| h.source_label == "Ledger"));
    }

    #[test]
    fn test_compact_line_without_quantity_is_recorded() {
        let report = parse_report_text("BTC 0.5 R$ 150000,00 Binance\nETH R$ 2,00 Kraken\nSOL 3 R$ 900,00 Phantom\n");
        assert_eq!(report.holdings.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].to_string().starts_with("parse error at line 2"));
        assert_eq!(report.holdings[1].source_label, "Phantom");
    }

    #[test]
    fn test_label_with_per_is_not_noise() {
        let report = parse_report_text("BTC 0.5 R$ 150000,00 Conta per capita Binance\n@ R$300.000,00 per BTC\n");
        assert!(report.skipped.is_empty());
        assert_eq!(report.holdings.len(), 1);
        assert_eq!(report.holdings[0].source_label, "Conta per capita Binance");
    }

    #[test]
    fn test_year_end_rows_are_not_holdings() {
        let text = "\
End of Year Balances
Asset Quantity Cost (BRL) Value (BRL) Description
BTC (Bitcoin) 0,5 R$100.000,00 R$150.000,00
Total R$150.000,00
BTC 0.5 R$ 150000,00 Binance
";
        let report = parse_report_text(text);
        assert_eq!(report.holdings.len(), 1);
        assert_eq!(report.holdings[0].line, 5);
        assert_eq!(report.balances.len(), 1);
        assert_eq!(report.balances[0].cost_brl, dec!(100000));
    }
}
