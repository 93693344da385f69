//! Core document types, tax catalog, subtotals, and the generic calculator.
//!
//! The calculator is country-independent. Country-specific behaviour is
//! plugged in through [`TaxRuleSet`] implementations selected by the
//! company's country code.

mod builder;
mod calculator;
mod error;
mod rules;
mod settings;
mod subtotals;
mod tax;
mod types;

pub use builder::*;
pub use calculator::*;
pub use error::*;
pub use rules::*;
pub use settings::*;
pub use subtotals::*;
pub use tax::*;
pub use types::*;
