// Koinly "End of Year Balances" summary
//
//   End of Year Balances
//   Asset Quantity Cost (BRL) Value (BRL) Description
//   BTC (Bitcoin) 0,5 R$100.000,00 R$150.000,00 @ R$300.000,00 per BTC
//   Total R$150.000,00
//
// One row per asset with the total quantity across every wallet and the
// acquisition cost of that quantity. The wallet tables only carry market
// value, so this is where the cost basis comes from.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::ops::Range;
use tracing::{debug, info, warn};

use super::koinly_text::leads_with_ticker;
use crate::error::ConversionError;
use crate::utils::parse_decimal;

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bEnd\s+of\s+Year\s+Balances\b").unwrap());

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Asset\s+Quantity\s+Cost\s*\(BRL\)\s+Value\s*\(BRL\)").unwrap()
});

// Table ends at its Total line, or at the next section when that is missing
static TOTAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^Total\b").unwrap());
static NEXT_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:Balances\s+per\s+Wallet|Transactions)\b").unwrap());

/// ASSET QUANTITY [R$]COST [R$]VALUE [DESCRIPTION]
static ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<asset>.+?)\s+(?P<qty>\(?-?\d[\d.,]*\)?)\s+(?:R\$\s*)?(?P<cost>\(?-?\d[\d.,]*\)?)\s+(?:R\$\s*)?(?P<value>\(?-?\d[\d.,]*\)?)(?:\s+(?P<desc>.*))?$",
    )
    .unwrap()
});

static PRICE_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*@\s*R\$.*$").unwrap());

/// Report-wide totals for one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearEndBalance {
    /// Asset column as printed, e.g. "BTC (Bitcoin)"
    pub asset: String,
    pub ticker: String,
    pub quantity: Decimal,
    /// Acquisition cost of `quantity`, as printed (may be negative)
    pub cost_brl: Decimal,
    pub value_brl: Decimal,
    pub description: String,
    pub line: usize,
}

impl YearEndBalance {
    /// Koinly describes unlisted assets by price, "@ R$1,00 per XYZ"
    pub fn prices_ticker(&self, ticker: &str) -> bool {
        let mut words = self.description.split_whitespace().rev();
        matches!(
            (words.next(), words.next()),
            (Some(last), Some(per)) if last.eq_ignore_ascii_case(ticker) && per.eq_ignore_ascii_case("per")
        )
    }
}

#[derive(Debug, Default)]
pub struct YearEndTable {
    pub balances: Vec<YearEndBalance>,
    pub skipped: Vec<ConversionError>,
}

/// Where the section sits in the extracted lines (0-based indices)
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SectionBounds {
    /// Title through the Total line; holding parsers skip these lines
    pub whole: Range<usize>,
    pub rows: Range<usize>,
}

pub(crate) fn locate(lines: &[&str]) -> Option<SectionBounds> {
    // Nearest title above the first header, so a table of contents that
    // also names the section is not swallowed
    let mut title = None;
    let mut header = None;
    for (idx, line) in lines.iter().enumerate() {
        if TITLE.is_match(line) {
            title = Some(idx);
        } else if title.is_some() && HEADER.is_match(line.trim()) {
            header = Some(idx);
            break;
        }
    }
    let (title, header) = (title?, header?);

    let rows_start = header + 1;
    let mut whole_end = lines.len();
    let mut rows_end = lines.len();
    for (idx, line) in lines.iter().enumerate().skip(rows_start) {
        let line = line.trim();
        if TOTAL.is_match(line) {
            rows_end = idx;
            whole_end = idx + 1;
            break;
        }
        if NEXT_SECTION.is_match(line) {
            rows_end = idx;
            whole_end = idx;
            break;
        }
    }

    Some(SectionBounds {
        whole: title..whole_end,
        rows: rows_start..rows_end,
    })
}

/// Parse the "End of Year Balances" table. Missing section means no rows.
pub fn parse_year_end_balances(text: &str) -> YearEndTable {
    let lines: Vec<&str> = text.lines().collect();
    let mut table = YearEndTable::default();

    let Some(bounds) = locate(&lines) else {
        debug!("No 'End of Year Balances' table in report");
        return table;
    };

    for idx in bounds.rows {
        let line = lines[idx].trim();
        if line.is_empty() {
            continue;
        }
        match parse_row(line, idx + 1) {
            Ok(Some(balance)) => table.balances.push(balance),
            Ok(None) => debug!("Ignoring year-end line {}: '{}'", idx + 1, line),
            Err(e) => {
                warn!("Skipping year-end row: {}", e);
                table.skipped.push(e);
            }
        }
    }

    info!("Parsed {} year-end balances", table.balances.len());
    table
}

fn parse_row(line: &str, line_no: usize) -> Result<Option<YearEndBalance>, ConversionError> {
    let Some(caps) = ROW.captures(line) else {
        // Wrapped descriptions and page furniture are not rows
        return if leads_with_ticker(line) {
            Err(ConversionError::parse(
                line_no,
                format!("no quantity, cost and value in year-end row '{}'", line),
            ))
        } else {
            Ok(None)
        };
    };

    let asset = PRICE_SUFFIX.replace(caps["asset"].trim(), "").trim().to_string();
    let Some(ticker) = asset.split_whitespace().next().map(str::to_string) else {
        return Ok(None);
    };
    if ticker.eq_ignore_ascii_case("asset") {
        return Ok(None);
    }

    let number = |name: &str| {
        parse_decimal(&caps[name]).map_err(|_| {
            ConversionError::parse(line_no, format!("invalid {} '{}' for {}", name, &caps[name], ticker))
        })
    };
    let quantity = number("qty")?;
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(ConversionError::parse(
            line_no,
            format!("negative year-end quantity for {}", ticker),
        ));
    }

    Ok(Some(YearEndBalance {
        cost_brl: number("cost")?,
        value_brl: number("value")?,
        description: caps.name("desc").map_or("", |m| m.as_str()).trim().to_string(),
        asset,
        ticker,
        quantity,
        line: line_no,
    }))
}
