//! # calculo
//!
//! Tax and subtotal calculation for the business documents of an
//! invoicing/ERP system: invoices, delivery notes, orders and estimates,
//! both sales and purchases.
//!
//! All monetary values use [`rust_decimal::Decimal`], not floating point.
//! The generic [`core::Calculator`] computes line amounts and the standard
//! subtotal breakdown; country rule sets ([`core::TaxRuleSet`]) adjust the
//! per-line tax treatment and contribute exception paths.
//!
//! ## Quick Start
//!
//! ```rust
//! use calculo::core::*;
//! use calculo::es::SpainRules;
//! use rust_decimal_macros::dec;
//!
//! let catalog = TaxCatalog::spain();
//! let calculator = Calculator::new(catalog.clone()).with_rules(SpainRules::new(catalog));
//!
//! let mut doc = DocumentBuilder::customer(
//!     CompanyBuilder::new("ACME SL", "ESP").build(),
//!     SubjectBuilder::new("C001", "Cliente SA").build(),
//! )
//! .build()
//! .unwrap();
//! let mut lines = vec![LineBuilder::new(dec!(10), dec!(12.50)).tax("IVA21", dec!(21)).build()];
//!
//! let subtotals = calculator.calculate(&mut doc, &mut lines).unwrap();
//! assert_eq!(subtotals.tax_total, dec!(26.25));
//! assert_eq!(doc.totals.total, dec!(151.25));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` | Document types, tax catalog, generic calculator |
//! | `es` | Spanish VAT rule set (surcharge, exemption, used goods, intra-community) |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "es")]
pub mod es;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
