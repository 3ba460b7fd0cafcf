//! Domain models.

mod country;
mod money;
mod transaction;

pub use country::{CountryCode, EU_COUNTRIES};
pub use money::{Commission, decimal_from_f64};
pub use transaction::{Bin, Transaction};
