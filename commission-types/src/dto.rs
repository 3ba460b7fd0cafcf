//! Data Transfer Objects for the line-oriented input.

use serde::Deserialize;

use crate::domain::Transaction;
use crate::error::ValidationError;

/// A JSON scalar that may arrive quoted or bare.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    fn as_text(&self) -> String {
        match self {
            Scalar::Text(s) => s.trim().to_string(),
            Scalar::Number(n) => n.to_string(),
        }
    }
}

/// One input line, e.g. `{"bin":"45717360","amount":"100.00","currency":"EUR"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransactionRecord {
    pub bin: Scalar,
    pub amount: Scalar,
    pub currency: String,
}

impl TransactionRecord {
    /// Parses a single JSON line.
    pub fn from_json(line: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(line).map_err(|e| ValidationError::MalformedRecord(e.to_string()))
    }
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = ValidationError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        let amount_text = record.amount.as_text();
        let amount = amount_text
            .parse::<f64>()
            .map_err(|_| ValidationError::InvalidAmount(amount_text.clone()))?;
        Transaction::new(&record.bin.as_text(), amount, record.currency.trim())
    }
}
