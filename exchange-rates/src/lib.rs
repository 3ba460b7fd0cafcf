//! Exchange Rates Library with USD-Pivot Cross-Rate Derivation
//!
//! Live-rate services quote every currency against a single pivot currency
//! (USD). This library models that payload and derives the rate between any
//! two currencies by going through the pivot exactly once.
//!
//! # Naming
//! - A **pivot rate** is `1 USD = X CCY`, read straight from the quotes.
//! - A **cross rate** is `1 REF = X CCY`, derived as
//!   `pivot_rate(CCY) / pivot_rate(REF)`.
//!
//! # Example
//! ```
//! use exchange_rates::{CurrencyCode, PivotQuotes};
//!
//! let payload = r#"{"success":true,"source":"USD","quotes":{"USDEUR":0.9,"USDJPY":150.0}}"#;
//! let live: exchange_rates::LiveQuotes = serde_json::from_str(payload).unwrap();
//! let quotes = PivotQuotes::try_from(live).unwrap();
//!
//! let eur: CurrencyCode = "eur".parse().unwrap();
//! let jpy: CurrencyCode = "JPY".parse().unwrap();
//! let rate = quotes.cross_rate(&jpy, &eur).unwrap();
//! assert!((rate - 150.0 / 0.9).abs() < 1e-9);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Currency Codes
// ─────────────────────────────────────────────────────────────────────────────

/// Three-letter ISO-4217 style currency code, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

/// The currency every live quote is expressed against.
pub const PIVOT_CURRENCY: &str = "USD";

impl CurrencyCode {
    /// Returns the uppercase code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the pivot currency code.
    pub fn pivot() -> Self {
        Self(PIVOT_CURRENCY.to_string())
    }

    pub fn is_pivot(&self) -> bool {
        self.0 == PIVOT_CURRENCY
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 3 && s.bytes().all(|b| b.is_ascii_alphabetic()) {
            Ok(Self(s.to_ascii_uppercase()))
        } else {
            Err(format!("Unknown currency: {}", s))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Live Quotes Payload
// ─────────────────────────────────────────────────────────────────────────────

/// Error detail attached to a `success: false` payload.
///
/// Fields are kept as raw JSON: the upstream is loose about their types and
/// a mistyped `code` must not hide the `info` text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default, rename = "type")]
    pub kind: Option<Value>,
    #[serde(default)]
    pub info: Option<Value>,
}

impl ApiErrorDetail {
    /// Most descriptive message available: `info`, then `type`.
    pub fn message(&self) -> Option<&str> {
        fn text(v: &Option<Value>) -> Option<&str> {
            v.as_ref().and_then(Value::as_str)
        }
        text(&self.info).or_else(|| text(&self.kind))
    }
}

/// Raw `live` endpoint payload.
///
/// Every field is optional raw JSON so that shape problems are reported by
/// [`LiveQuotes::validate_fresh`] and [`PivotQuotes::try_from`] with a
/// precise message instead of a serde error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LiveQuotes {
    #[serde(default)]
    pub success: Option<Value>,
    #[serde(default)]
    pub source: Option<Value>,
    #[serde(default)]
    pub quotes: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl LiveQuotes {
    /// Error detail, when the `error` member is an object.
    pub fn error_detail(&self) -> Option<ApiErrorDetail> {
        self.error
            .as_ref()
            .filter(|e| e.is_object())
            .and_then(|e| serde_json::from_value(e.clone()).ok())
    }

    /// Checks the payload of a fresh upstream response.
    ///
    /// The upstream must report success, carry a quotes mapping and use the
    /// pivot currency as its source.
    pub fn validate_fresh(self) -> Result<PivotQuotes, QuoteError> {
        if self.success.as_ref().and_then(Value::as_bool) != Some(true) {
            let detail = self
                .error_detail()
                .and_then(|d| d.message().map(str::to_string))
                .unwrap_or_else(|| "upstream reported an unsuccessful response".to_string());
            return Err(QuoteError::Unsuccessful(detail));
        }

        match &self.source {
            Some(Value::String(source)) if source == PIVOT_CURRENCY => {}
            Some(Value::String(other)) => {
                return Err(QuoteError::UnexpectedSource(other.clone()));
            }
            Some(other) => return Err(QuoteError::UnexpectedSource(other.to_string())),
            None => return Err(QuoteError::UnexpectedSource("<missing>".into())),
        }

        PivotQuotes::try_from(self)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("Rate payload has no quotes")]
    MissingQuotes,

    #[error("Unsuccessful API response: {0}")]
    Unsuccessful(String),

    #[error("Rate payload source must be USD, got {0}")]
    UnexpectedSource(String),

    #[error("Quote {0} not available")]
    MissingQuote(String),

    #[error("Quote {0} is not numeric")]
    NonNumeric(String),

    #[error("Quote {pair} out of range: {value}")]
    OutOfRange { pair: String, value: f64 },
}

// ─────────────────────────────────────────────────────────────────────────────
// Pivot Quotes and Cross Rates
// ─────────────────────────────────────────────────────────────────────────────

/// A validated quotes table keyed by `USD<CCY>` pairs.
#[derive(Debug, Clone)]
pub struct PivotQuotes {
    quotes: HashMap<String, Value>,
}

impl TryFrom<LiveQuotes> for PivotQuotes {
    type Error = QuoteError;

    fn try_from(live: LiveQuotes) -> Result<Self, Self::Error> {
        match live.quotes {
            Some(Value::Object(quotes)) => Ok(Self {
                quotes: quotes.into_iter().collect(),
            }),
            _ => Err(QuoteError::MissingQuotes),
        }
    }
}

impl PivotQuotes {
    pub fn new(quotes: HashMap<String, Value>) -> Self {
        Self { quotes }
    }

    /// Number of quoted pairs.
    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    fn quote(&self, currency: &CurrencyCode) -> Result<(String, f64), QuoteError> {
        let pair = format!("{}{}", PIVOT_CURRENCY, currency);
        let value = self
            .quotes
            .get(&pair)
            .ok_or_else(|| QuoteError::MissingQuote(pair.clone()))?;
        let rate = value
            .as_f64()
            .filter(|r| r.is_finite())
            .ok_or_else(|| QuoteError::NonNumeric(pair.clone()))?;
        Ok((pair, rate))
    }

    /// `1 USD = X currency`. Zero is accepted; negative values are not.
    pub fn pivot_rate(&self, currency: &CurrencyCode) -> Result<f64, QuoteError> {
        if currency.is_pivot() {
            return Ok(1.0);
        }
        let (pair, rate) = self.quote(currency)?;
        if rate < 0.0 {
            return Err(QuoteError::OutOfRange { pair, value: rate });
        }
        Ok(rate)
    }

    /// `1 USD = X reference`. The reference leg is the divisor, so it must be
    /// strictly positive.
    pub fn reference_pivot_rate(&self, reference: &CurrencyCode) -> Result<f64, QuoteError> {
        if reference.is_pivot() {
            return Ok(1.0);
        }
        let (pair, rate) = self.quote(reference)?;
        if rate <= 0.0 {
            return Err(QuoteError::OutOfRange { pair, value: rate });
        }
        Ok(rate)
    }

    /// `1 reference = X target`, derived through the pivot.
    pub fn cross_rate(
        &self,
        target: &CurrencyCode,
        reference: &CurrencyCode,
    ) -> Result<f64, QuoteError> {
        let reference_rate = self.reference_pivot_rate(reference)?;
        let target_rate = self.pivot_rate(target)?;
        Ok(target_rate / reference_rate)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
