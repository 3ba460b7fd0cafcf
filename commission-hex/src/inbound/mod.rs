//! Line-Oriented Inbound Adapter
//!
//! Reads newline-delimited JSON transactions and drives the commission
//! service one line at a time.

mod batch;

pub use batch::{BatchProcessor, BatchSummary};
