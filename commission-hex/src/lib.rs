//! # Commission Hex
//!
//! Application service layer and line-oriented adapter for the commission
//! calculator.
//!
//! ## Architecture
//!
//! - `service/` - Commission engine (combines country and rate lookups)
//! - `inbound/` - Batch adapter (newline-delimited JSON in, commissions out)
//!
//! The service is generic over `C: CountryResolver` and `R: RateResolver`,
//! allowing different upstream providers to be injected.

pub mod inbound;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use inbound::{BatchProcessor, BatchSummary};
pub use service::CommissionService;
