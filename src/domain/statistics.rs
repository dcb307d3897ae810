//! Daily net-position statistics.
//!
//! Pure aggregation over the current record set; no state survives between
//! calls. The engine caches the returned value under the same
//! full-invalidation policy as every other cached read.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::transaction::{Transaction, TransactionType};

/// Scale of the reported average price, matching the price column precision.
const AVERAGE_PRICE_SCALE: u32 = 4;

/// Totals for one side (buy or sell) of the day's trading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideTotals {
    pub total_units: i64,
    pub total_amount: Decimal,
    pub transaction_count: u64,
    /// `total_amount / total_units` rounded half-up to 4 decimal places;
    /// zero when no units traded.
    pub average_price: Decimal,
}

/// Buy minus sell for the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetPosition {
    pub net_units: i64,
    pub net_amount: Decimal,
    pub total_transactions: u64,
}

/// Per-security, per-account, per-day position summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityStatistics {
    pub security_code: String,
    pub account_number: String,
    pub trans_date: NaiveDate,
    pub buy: SideTotals,
    pub sell: SideTotals,
    pub net: NetPosition,
}

/// Scans `records`, keeps those matching security code, account number and
/// `trans_date == as_of`, and reduces them into buy/sell/net totals. Zero
/// matching records yield all-zero aggregates, not an error.
pub fn compute(
    records: &[Transaction],
    security_code: &str,
    account_number: &str,
    as_of: NaiveDate,
) -> SecurityStatistics {
    let matching: Vec<&Transaction> = records
        .iter()
        .filter(|t| t.security_code == security_code)
        .filter(|t| t.account_number == account_number)
        .filter(|t| t.trans_date == as_of)
        .collect();

    let buy = side_totals(&matching, TransactionType::Buy);
    let sell = side_totals(&matching, TransactionType::Sell);

    let net = NetPosition {
        net_units: buy.total_units - sell.total_units,
        net_amount: buy.total_amount - sell.total_amount,
        total_transactions: buy.transaction_count + sell.transaction_count,
    };

    SecurityStatistics {
        security_code: security_code.to_string(),
        account_number: account_number.to_string(),
        trans_date: as_of,
        buy,
        sell,
        net,
    }
}

fn side_totals(records: &[&Transaction], side: TransactionType) -> SideTotals {
    let side_records = records.iter().filter(|t| t.trans_type == side);

    let mut total_units: i64 = 0;
    let mut total_amount = Decimal::ZERO;
    let mut transaction_count: u64 = 0;
    for t in side_records {
        total_units += t.units;
        total_amount += t.amount;
        transaction_count += 1;
    }

    let average_price = if total_units > 0 {
        (total_amount / Decimal::from(total_units))
            .round_dp_with_strategy(AVERAGE_PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero)
    } else {
        Decimal::ZERO
    };

    SideTotals {
        total_units,
        total_amount,
        transaction_count,
        average_price,
    }
}
