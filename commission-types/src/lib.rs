//! # Commission Types
//!
//! Domain types and port traits for the commission calculator.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Transaction, CountryCode, Commission)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Raw input records as they arrive on the wire
//! - `error/` - Validation, upstream and calculation error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{Bin, Commission, CountryCode, EU_COUNTRIES, Transaction};
pub use dto::TransactionRecord;
pub use error::{CommissionError, UpstreamError, UpstreamErrorKind, ValidationError};
pub use exchange_rates::CurrencyCode;
pub use ports::{CountryResolver, RateResolver, ReferenceCache};
