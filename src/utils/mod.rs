//! Utility functions for parsing and formatting decimal values
//!
//! Koinly prints numbers either in Brazilian (`1.234,56`) or international
//! (`1,234.56`) notation depending on the account locale. Everything is read
//! into exact `Decimal`s and written back using Brazilian conventions.

use anyhow::{anyhow, Context, Result};
use itertools::Itertools;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Parse decimal format - handles both Brazilian (1.234,56) and international (1,234.56) formats
///
/// Also accepts an `R$` prefix, inner spaces and accounting negatives `(10,00)`.
///
/// # Examples
/// ```
/// use koinly2irpf::utils::parse_decimal;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(parse_decimal("R$ 150.000,00").unwrap(), dec!(150000.00));
/// assert_eq!(parse_decimal("0.5").unwrap(), dec!(0.5));
/// ```
pub fn parse_decimal(raw: &str) -> Result<Decimal> {
    let mut s: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') && s.len() > 2 {
        negative = true;
        s = s[1..s.len() - 1].to_string();
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest.to_string();
    }

    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return Err(anyhow!("Not a number: '{}'", raw));
    }

    // Determine format based on which separator appears last
    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');

    let normalized = match (last_comma, last_dot) {
        (Some(comma_pos), Some(dot_pos)) => {
            if comma_pos > dot_pos {
                // Brazilian format: "1.234,56" - dot is thousands, comma is decimal
                s.replace('.', "").replace(',', ".")
            } else {
                // International format: "1,234.56" - comma is thousands, dot is decimal
                s.replace(',', "")
            }
        }
        (Some(_), None) => {
            if s.matches(',').count() > 1 {
                // "1,234,567" - repeated separator can only be grouping
                s.replace(',', "")
            } else {
                // Only comma: assume Brazilian decimal "1234,56"
                s.replace(',', ".")
            }
        }
        (None, Some(_)) => {
            if s.matches('.').count() > 1 {
                s.replace('.', "")
            } else {
                // Only dot: assume international decimal "1234.56"
                s
            }
        }
        (None, None) => s,
    };

    let value = Decimal::from_str(&normalized).context(format!("Failed to parse decimal: {}", raw))?;
    Ok(if negative { -value } else { value })
}

/// Exact quantity for CSV output: comma decimal separator, no grouping,
/// trailing zeros removed ("0,5", "1234,00000001", "2").
pub fn format_quantity(value: Decimal) -> String {
    value.normalize().to_string().replace('.', ",")
}

/// BRL amount for CSV output: two places, half away from zero, no grouping ("150000,00")
pub fn format_money(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded).replace('.', ",")
}

/// Grouped BRL amount for terminal previews, built on [`format_money`] so the
/// preview shows the same cents that go into the CSV.
///
/// ```
/// use koinly2irpf::utils::format_brl;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_brl(dec!(150000)), "R$ 150.000,00");
/// assert_eq!(format_brl(dec!(0.005)), "R$ 0,01");
/// ```
pub fn format_brl(value: Decimal) -> String {
    let money = format_money(value);
    let (sign, unsigned) = match money.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", money.as_str()),
    };
    let (integer, cents) = unsigned.split_once(',').unwrap_or((unsigned, "00"));

    // Groups of three counted from the right
    let head = integer.len() % 3;
    let mut groups = Vec::new();
    if head > 0 {
        groups.push(&integer[..head]);
    }
    groups.extend(
        integer.as_bytes()[head..]
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok()),
    );

    format!("R$ {}{},{}", sign, groups.iter().join("."), cents)
}
