// Cost basis per holding
//
// The year-end table gives one total cost per asset; each wallet row gets
// the share of that cost matching its share of the total quantity:
//
//   cost = total_cost * quantity / total_quantity
//
// Shares are kept exact so the wallets of one asset sum back to its total.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::ConversionError;
use crate::importers::YearEndBalance;
use crate::models::Holding;

#[derive(Debug, Default)]
pub struct CostAllocation {
    /// Same holdings, in the same order, with `value_brl` set to the cost
    pub holdings: Vec<Holding>,
    /// One entry per ticker that fell back to zero
    pub warnings: Vec<ConversionError>,
}

fn find_balance<'a>(ticker: &str, balances: &'a [YearEndBalance]) -> Option<&'a YearEndBalance> {
    balances
        .iter()
        .find(|b| b.ticker.eq_ignore_ascii_case(ticker))
        .or_else(|| balances.iter().find(|b| b.prices_ticker(ticker)))
}

fn share_of(holding: &Holding, balance: &YearEndBalance) -> Result<Decimal, String> {
    if balance.quantity <= Decimal::ZERO {
        return Err(format!("year-end quantity of {} is zero", balance.asset));
    }
    let cost = balance.cost_brl.max(Decimal::ZERO);
    cost.checked_mul(holding.quantity)
        .and_then(|scaled| scaled.checked_div(balance.quantity))
        .ok_or_else(|| format!("cost share of {} overflows", balance.asset))
}

/// Replace each holding's value with its proportional acquisition cost.
///
/// Holdings whose asset is missing from the year-end table, or whose total
/// quantity is zero, get a zero cost and a `MissingCost` warning.
pub fn allocate_costs(holdings: Vec<Holding>, balances: &[YearEndBalance]) -> CostAllocation {
    let mut allocation = CostAllocation::default();

    for holding in holdings {
        let share = match find_balance(&holding.ticker, balances) {
            Some(balance) => share_of(&holding, balance),
            None => Err("asset not listed in End of Year Balances".to_string()),
        };

        let cost = match share {
            Ok(cost) => {
                debug!("{} line {}: cost share {}", holding.ticker, holding.line, cost);
                cost
            }
            Err(reason) => {
                let seen = allocation.warnings.iter().any(
                    |w| matches!(w, ConversionError::MissingCost { ticker, .. } if *ticker == holding.ticker),
                );
                if !seen {
                    warn!("No cost for {}: {}", holding.ticker, reason);
                    allocation.warnings.push(ConversionError::MissingCost {
                        ticker: holding.ticker.clone(),
                        reason,
                    });
                }
                Decimal::ZERO
            }
        };

        allocation.holdings.push(Holding {
            value_brl: cost,
            ..holding
        });
    }

    allocation
}
