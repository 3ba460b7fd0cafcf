//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The commission engine depends on these traits, not concrete implementations.

mod cache;
mod resolver;

pub use cache::ReferenceCache;
pub use resolver::{CountryResolver, RateResolver};
