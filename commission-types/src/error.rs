//! Error types for the commission calculator.

use exchange_rates::CurrencyCode;

/// Input record validation errors. Local to one record, never fatal.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid BIN {0:?}: expected 6 to 16 digits")]
    InvalidBin(String),

    #[error("Invalid amount {0}: expected a non-negative number below 7.9e28")]
    InvalidAmount(String),

    #[error("Invalid currency {0:?}: expected a 3-letter code")]
    InvalidCurrency(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

/// Kinds of upstream failure, for retry and logging decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamErrorKind {
    RateLimited,
    NotFound,
    Status,
    Network,
    Decode,
    InvalidData,
    ApiFailure,
}

impl std::fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            UpstreamErrorKind::RateLimited => "rate_limited",
            UpstreamErrorKind::NotFound => "not_found",
            UpstreamErrorKind::Status => "status",
            UpstreamErrorKind::Network => "network",
            UpstreamErrorKind::Decode => "decode",
            UpstreamErrorKind::InvalidData => "invalid_data",
            UpstreamErrorKind::ApiFailure => "api_failure",
        };
        f.write_str(name)
    }
}

fn http_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

/// Failures talking to a reference-data service.
///
/// `service` names the upstream ("binlist", "exchange-rates") so a log line
/// is attributable without extra context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service}: rate limited{}", http_suffix(.status))]
    RateLimited {
        service: &'static str,
        /// `None` when the local throttle refused the call.
        status: Option<u16>,
    },

    #[error("{service}: {resource} not found")]
    NotFound {
        service: &'static str,
        resource: String,
    },

    #[error("{service}: unexpected HTTP status {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service}: network error: {message}")]
    Network {
        service: &'static str,
        message: String,
    },

    #[error("{service}: malformed JSON: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service}: invalid data: {message}")]
    InvalidData {
        service: &'static str,
        message: String,
    },

    #[error("{service}: unsuccessful API response: {detail}")]
    ApiFailure {
        service: &'static str,
        detail: String,
    },
}

impl UpstreamError {
    pub fn kind(&self) -> UpstreamErrorKind {
        match self {
            UpstreamError::RateLimited { .. } => UpstreamErrorKind::RateLimited,
            UpstreamError::NotFound { .. } => UpstreamErrorKind::NotFound,
            UpstreamError::Status { .. } => UpstreamErrorKind::Status,
            UpstreamError::Network { .. } => UpstreamErrorKind::Network,
            UpstreamError::Decode { .. } => UpstreamErrorKind::Decode,
            UpstreamError::InvalidData { .. } => UpstreamErrorKind::InvalidData,
            UpstreamError::ApiFailure { .. } => UpstreamErrorKind::ApiFailure,
        }
    }

    /// HTTP status reported by the upstream, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::RateLimited { status, .. } => *status,
            UpstreamError::NotFound { .. } => Some(404),
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether retrying later could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            UpstreamError::RateLimited { .. } | UpstreamError::Network { .. } => true,
            UpstreamError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Per-transaction calculation failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommissionError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("Exchange rate for {currency} must be positive, got {rate}")]
    NonPositiveRate { currency: CurrencyCode, rate: f64 },

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
}

impl CommissionError {
    /// Short machine-readable kind for log fields.
    pub fn kind(&self) -> String {
        match self {
            CommissionError::Upstream(e) => e.kind().to_string(),
            CommissionError::NonPositiveRate { .. } => "non_positive_rate".into(),
            CommissionError::Arithmetic(_) => "arithmetic".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_carries_status() {
        let err = UpstreamError::RateLimited {
            service: "binlist",
            status: Some(429),
        };
        assert_eq!(err.kind(), UpstreamErrorKind::RateLimited);
        assert_eq!(err.status(), Some(429));
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "binlist: rate limited (HTTP 429)");
    }

    #[test]
    fn test_local_throttle_has_no_status() {
        let err = UpstreamError::RateLimited {
            service: "binlist",
            status: None,
        };
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "binlist: rate limited");
    }

    #[test]
    fn test_not_found_is_permanent() {
        let err = UpstreamError::NotFound {
            service: "binlist",
            resource: "BIN 000000".into(),
        };
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_commission_error_is_transparent() {
        let upstream = UpstreamError::ApiFailure {
            service: "exchange-rates",
            detail: "invalid key".into(),
        };
        let err: CommissionError = upstream.clone().into();
        assert_eq!(err.to_string(), upstream.to_string());
        assert_eq!(err.kind(), "api_failure");
    }
}
