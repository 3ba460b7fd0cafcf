//! Transaction domain model.

use exchange_rates::CurrencyCode;
use serde::{Deserialize, Serialize};

use super::money::decimal_from_f64;
use crate::error::ValidationError;

/// Bank Identification Number: the leading 6 to 16 digits of a card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bin(String);

impl Bin {
    pub const MIN_LEN: usize = 6;
    pub const MAX_LEN: usize = 16;

    /// Validates and wraps a BIN.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let len_ok = (Self::MIN_LEN..=Self::MAX_LEN).contains(&value.len());
        if !len_ok || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidBin(value));
        }
        Ok(Self(value))
    }

    /// Returns the BIN digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deterministic cache key for this BIN.
    ///
    /// Non-alphanumeric characters are replaced so the key is safe for any
    /// key-value store.
    pub fn cache_key(&self) -> String {
        let safe: String = self
            .0
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("bin_{}", safe)
    }
}

impl std::fmt::Display for Bin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Bin {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Bin> for String {
    fn from(bin: Bin) -> Self {
        bin.0
    }
}

/// A card transaction awaiting commission calculation.
///
/// Transactions are immutable once created and can only be built from valid
/// parts: construction fails as a whole if any field is invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    bin: Bin,
    amount: f64,
    currency: CurrencyCode,
}

impl Transaction {
    /// Validates all fields and creates a transaction.
    pub fn new(bin: &str, amount: f64, currency: &str) -> Result<Self, ValidationError> {
        let bin = Bin::new(bin)?;

        // The upper bound is the range of exact decimal arithmetic.
        if amount < 0.0 || decimal_from_f64(amount).is_none() {
            return Err(ValidationError::InvalidAmount(amount.to_string()));
        }
        // Collapse -0.0 so it never renders as a negative commission.
        let amount = if amount == 0.0 { 0.0 } else { amount };

        let currency = currency
            .parse::<CurrencyCode>()
            .map_err(|_| ValidationError::InvalidCurrency(currency.to_string()))?;

        Ok(Self {
            bin,
            amount,
            currency,
        })
    }

    pub fn bin(&self) -> &Bin {
        &self.bin
    }

    /// Amount in units of [`Transaction::currency`].
    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn currency(&self) -> &CurrencyCode {
        &self.currency
    }
}
