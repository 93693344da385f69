//! Tax codes and the immutable tax catalog.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::CalcError;

/// How a tax code's rate is applied to an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TaxKind {
    /// `amount × rate / 100`.
    #[default]
    Percentage,
    /// `amount × rate`.
    FixedValue,
}

/// A tax code (`impuesto`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCode {
    /// Identifier (e.g. "IVA21").
    pub code: String,
    /// Human-readable description.
    pub description: String,
    /// Tax rate.
    pub rate: Decimal,
    /// Surcharge rate applied under the surcharge-equivalence regime.
    pub surcharge: Decimal,
    /// Percentage or fixed value.
    pub kind: TaxKind,
}

impl TaxCode {
    /// A percentage-based tax code.
    pub fn percentage(
        code: impl Into<String>,
        description: impl Into<String>,
        rate: Decimal,
        surcharge: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            rate,
            surcharge,
            kind: TaxKind::Percentage,
        }
    }

    /// A fixed-value tax code.
    pub fn fixed_value(
        code: impl Into<String>,
        description: impl Into<String>,
        rate: Decimal,
    ) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            rate,
            surcharge: Decimal::ZERO,
            kind: TaxKind::FixedValue,
        }
    }

    pub fn is_fixed_value(&self) -> bool {
        self.kind == TaxKind::FixedValue
    }
}

/// `amount × rate` for fixed-value taxes, `amount × rate / 100` otherwise.
pub fn tax_amount(amount: Decimal, rate: Decimal, fixed_value: bool) -> Decimal {
    if fixed_value {
        amount * rate
    } else {
        amount * rate / Decimal::ONE_HUNDRED
    }
}

/// Immutable tax-code lookup table.
///
/// Built once and handed to the calculator and rule sets; there is no
/// process-wide registry. Deserializing goes through [`TaxCatalog::new`],
/// so a loaded catalog obeys the same checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct TaxCatalog {
    codes: BTreeMap<String, TaxCode>,
    zero_rate: String,
}

#[derive(Deserialize)]
struct RawCatalog {
    codes: BTreeMap<String, TaxCode>,
    zero_rate: String,
}

impl TryFrom<RawCatalog> for TaxCatalog {
    type Error = CalcError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        Self::new(raw.codes.into_values().collect(), &raw.zero_rate)
    }
}

impl TaxCatalog {
    /// Build a catalog. `zero_rate` names the code used for exempt lines
    /// and must be part of `codes`.
    pub fn new(codes: Vec<TaxCode>, zero_rate: &str) -> Result<Self, CalcError> {
        let mut map = BTreeMap::new();
        for tax in codes {
            if map.contains_key(&tax.code) {
                return Err(CalcError::DuplicateTaxCode(tax.code));
            }
            map.insert(tax.code.clone(), tax);
        }
        if !map.contains_key(zero_rate) {
            return Err(CalcError::UnknownTaxCode(zero_rate.to_string()));
        }
        Ok(Self {
            codes: map,
            zero_rate: zero_rate.to_string(),
        })
    }

    /// Spanish VAT rates with their surcharge-equivalence rates.
    pub fn spain() -> Self {
        let codes = [
            TaxCode::percentage("IVA0", "IVA 0%", dec!(0), dec!(0)),
            TaxCode::percentage("IVA4", "IVA 4%", dec!(4), dec!(0.5)),
            TaxCode::percentage("IVA5", "IVA 5%", dec!(5), dec!(0.62)),
            TaxCode::percentage("IVA10", "IVA 10%", dec!(10), dec!(1.4)),
            TaxCode::percentage("IVA21", "IVA 21%", dec!(21), dec!(5.2)),
        ];
        Self {
            codes: codes.into_iter().map(|t| (t.code.clone(), t)).collect(),
            zero_rate: "IVA0".to_string(),
        }
    }

    /// Use `code` as the zero rate. The code must be in the catalog.
    pub fn with_zero_rate(mut self, code: &str) -> Result<Self, CalcError> {
        self.require(code)?;
        self.zero_rate = code.to_string();
        Ok(self)
    }

    pub fn get(&self, code: &str) -> Option<&TaxCode> {
        self.codes.get(code)
    }

    /// Like [`get`](Self::get), but a missing code is an error.
    pub fn require(&self, code: &str) -> Result<&TaxCode, CalcError> {
        self.get(code)
            .ok_or_else(|| CalcError::UnknownTaxCode(code.to_string()))
    }

    /// The zero-rate tax code.
    pub fn zero_rate(&self) -> &TaxCode {
        // Presence is checked in `new`; `spain` always contains it.
        &self.codes[&self.zero_rate]
    }

    /// Whether `code` names a fixed-value tax. Unknown or absent codes
    /// are treated as percentages.
    pub fn is_fixed_value(&self, code: Option<&str>) -> bool {
        code.and_then(|c| self.get(c))
            .is_some_and(TaxCode::is_fixed_value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxCode> {
        self.codes.values()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
