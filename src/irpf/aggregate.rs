// Per-file aggregation: one OutputRecord per ticker
//
// Quantities and values are summed as Decimal. When a ticker is held in
// several places, every custodian appears in the Discriminação as
// "<entry> (Qtd <q>)", joined by "; " in the order first seen.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use super::discrimination::format_discrimination;
use crate::models::{Holding, OutputRecord, SourceInfo};
use crate::utils::format_quantity;

const SOURCE_SEPARATOR: &str = "; ";

#[derive(Debug)]
struct TickerGroup {
    ticker: String,
    quantity: Decimal,
    value_brl: Decimal,
    /// (discrimination, quantity) per distinct custodian
    sources: Vec<(String, Decimal)>,
}

impl TickerGroup {
    fn new(ticker: &str) -> Self {
        TickerGroup {
            ticker: ticker.to_string(),
            quantity: Decimal::ZERO,
            value_brl: Decimal::ZERO,
            sources: Vec::new(),
        }
    }

    fn add(&mut self, holding: &Holding, source: &SourceInfo) {
        self.quantity += holding.quantity;
        self.value_brl += holding.value_brl;

        let entry = format_discrimination(&holding.ticker, source);
        match self.sources.iter_mut().find(|(text, _)| *text == entry) {
            Some((_, quantity)) => *quantity += holding.quantity,
            None => self.sources.push((entry, holding.quantity)),
        }
    }

    fn into_record(self) -> OutputRecord {
        let discrimination = match self.sources.as_slice() {
            [(single, _)] => single.clone(),
            several => several
                .iter()
                .map(|(text, quantity)| format!("{} (Qtd {})", text, format_quantity(*quantity)))
                .collect::<Vec<_>>()
                .join(SOURCE_SEPARATOR),
        };

        OutputRecord {
            ticker: self.ticker,
            quantity: self.quantity,
            value_brl: self.value_brl,
            discrimination,
            cnpj: String::new(),
        }
    }
}

/// Merge classified holdings of one file into output rows, in first-seen ticker order
pub fn aggregate(holdings: &[(Holding, SourceInfo)]) -> Vec<OutputRecord> {
    let mut groups: Vec<TickerGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (holding, source) in holdings {
        let slot = *index.entry(holding.ticker.as_str()).or_insert_with(|| {
            groups.push(TickerGroup::new(&holding.ticker));
            groups.len() - 1
        });
        groups[slot].add(holding, source);
    }

    debug!(
        "Aggregated {} holdings into {} rows",
        holdings.len(),
        groups.len()
    );

    groups.into_iter().map(TickerGroup::into_record).collect()
}
