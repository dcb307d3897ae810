//! Trade record domain entities.
//! Framework-agnostic representation of a buy/sell trade against an account.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "transaction_type", rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Buy => f.write_str("BUY"),
            TransactionType::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown transaction type: {0}")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(TransactionType::Buy),
            "SELL" => Ok(TransactionType::Sell),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

/// A persisted trade record. `id` is assigned by the store on insert and
/// `timestamp` is stamped once by the engine at creation; neither changes on
/// update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub account_number: String,
    pub security_code: String,
    pub trans_type: TransactionType,
    pub units: i64,
    pub price: Decimal,
    pub amount: Decimal,
    pub trans_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
    pub currency: String,
    pub description: Option<String>,
}

/// The mutable fields of a trade record. Input to create and update; the
/// request layer has already normalized currency and trade date by the time a
/// draft reaches the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub account_number: String,
    pub security_code: String,
    pub trans_type: TransactionType,
    pub units: i64,
    pub price: Decimal,
    pub amount: Decimal,
    pub trans_date: NaiveDate,
    pub currency: String,
    pub description: Option<String>,
}

impl Transaction {
    pub fn from_draft(id: Uuid, timestamp: DateTime<Utc>, draft: TransactionDraft) -> Self {
        Self {
            id,
            account_number: draft.account_number,
            security_code: draft.security_code,
            trans_type: draft.trans_type,
            units: draft.units,
            price: draft.price,
            amount: draft.amount,
            trans_date: draft.trans_date,
            timestamp,
            currency: draft.currency,
            description: draft.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transaction_type_case_insensitively() {
        assert_eq!(
            "BUY".parse::<TransactionType>().unwrap(),
            TransactionType::Buy
        );
        assert_eq!(
            "sell".parse::<TransactionType>().unwrap(),
            TransactionType::Sell
        );
        assert!("HOLD".parse::<TransactionType>().is_err());
    }

    #[test]
    fn transaction_type_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&TransactionType::Buy).unwrap(),
            "\"BUY\""
        );
        assert_eq!(TransactionType::Sell.to_string(), "SELL");
    }
}
