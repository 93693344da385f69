//! Spanish VAT rules.
//!
//! Implements the rule set for companies located in Spain (`ESP`):
//! exempt subjects, recargo de equivalencia, the used-goods margin
//! scheme (REBU) and intra-community operations.
//!
//! # Example
//!
//! ```
//! use calculo::core::*;
//! use calculo::es::SpainRules;
//! use rust_decimal_macros::dec;
//!
//! let catalog = TaxCatalog::spain();
//! let calculator = Calculator::new(catalog.clone()).with_rules(SpainRules::new(catalog.clone()));
//!
//! let mut doc = DocumentBuilder::customer(
//!     CompanyBuilder::new("ACME SL", "ESP").build(),
//!     SubjectBuilder::new("C001", "Tienda").vat_regime(VatRegime::Surcharge).build(),
//! )
//! .build()
//! .unwrap();
//! let mut lines = vec![
//!     LineBuilder::new(dec!(1), dec!(100)).tax_code(catalog.require("IVA21").unwrap()).build(),
//! ];
//!
//! calculator.calculate(&mut doc, &mut lines).unwrap();
//! assert_eq!(doc.totals.surcharge_total, dec!(5.20));
//! assert_eq!(doc.totals.total, dec!(126.20));
//! ```

mod exemption;
mod rules;

pub use exemption::ExemptionReason;
pub use rules::{SPAIN, SpainRules};
