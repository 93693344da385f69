//! Subtotal buckets keyed by (tax rate, surcharge rate).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::CalcError;
use super::types::{BusinessDocumentLine, DocumentTotals};

/// Bucket key: tax rate and surcharge rate.
///
/// Displays as `"<rate>|<surcharge>"` with trailing zeros removed,
/// so `21.00|0.0` and `21|0` are the same key. Serialized in the same
/// string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct TaxKey {
    pub rate: Decimal,
    pub surcharge: Decimal,
}

impl TaxKey {
    /// The zero-rate key `0|0`.
    pub const ZERO: Self = Self {
        rate: Decimal::ZERO,
        surcharge: Decimal::ZERO,
    };

    pub fn new(rate: Decimal, surcharge: Decimal) -> Self {
        Self {
            rate: rate.normalize(),
            surcharge: surcharge.normalize(),
        }
    }

    /// Key of a line's effective tax.
    pub fn of(line: &BusinessDocumentLine) -> Self {
        Self::new(line.tax_rate, line.surcharge_rate)
    }
}

impl fmt::Display for TaxKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.rate.normalize(), self.surcharge.normalize())
    }
}

impl FromStr for TaxKey {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalcError::InvalidTaxKey(s.to_string());
        let (rate, surcharge) = s.split_once('|').ok_or_else(invalid)?;
        let rate = Decimal::from_str(rate.trim()).map_err(|_| invalid())?;
        let surcharge = Decimal::from_str(surcharge.trim()).map_err(|_| invalid())?;
        Ok(Self::new(rate, surcharge))
    }
}

impl From<TaxKey> for String {
    fn from(key: TaxKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for TaxKey {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Accumulated amounts for one tax key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtotalBucket {
    /// `codimpuesto` of the first line that seeded the bucket.
    pub tax_code: Option<String>,
    /// `iva`.
    pub rate: Decimal,
    /// `recargo`.
    pub surcharge: Decimal,
    /// `neto`: base after document discounts.
    pub net: Decimal,
    /// `netosindto`: base before document discounts.
    pub net_before_discount: Decimal,
    /// `totaliva`.
    pub tax_total: Decimal,
    /// `totalrecargo`.
    pub surcharge_total: Decimal,
}

impl SubtotalBucket {
    /// An empty bucket for `key`.
    pub fn empty(key: TaxKey, tax_code: Option<String>) -> Self {
        Self {
            tax_code,
            rate: key.rate,
            surcharge: key.surcharge,
            net: Decimal::ZERO,
            net_before_discount: Decimal::ZERO,
            tax_total: Decimal::ZERO,
            surcharge_total: Decimal::ZERO,
        }
    }

    fn round(&mut self, decimals: u32) {
        self.net = round_half_up(self.net, decimals);
        self.net_before_discount = round_half_up(self.net_before_discount, decimals);
        self.tax_total = round_half_up(self.tax_total, decimals);
        self.surcharge_total = round_half_up(self.surcharge_total, decimals);
    }
}

/// Subtotal breakdown of a document: buckets per tax key plus the
/// document-level accumulators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtotals {
    /// Buckets in key order.
    pub buckets: BTreeMap<TaxKey, SubtotalBucket>,
    /// Highest withholding rate on the lines.
    pub withholding_rate: Decimal,
    /// `totalirpf`.
    pub withholding_total: Decimal,
    /// `totalsuplidos`.
    pub disbursement_total: Decimal,
    /// `totalcoste`.
    pub cost_total: Decimal,
    /// Sum of bucket `net` (set by [`finish`](Self::finish)).
    pub net: Decimal,
    /// Sum of bucket `net_before_discount`.
    pub net_before_discount: Decimal,
    /// Sum of bucket `tax_total`.
    pub tax_total: Decimal,
    /// Sum of bucket `surcharge_total`.
    pub surcharge_total: Decimal,
    /// Document total.
    pub total: Decimal,
    /// Tax code given to a `0|0` bucket created on demand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_rate_code: Option<String>,
}

impl Subtotals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty subtotals whose on-demand `0|0` bucket carries `zero_rate_code`.
    pub fn with_zero_rate(zero_rate_code: &str) -> Self {
        Self {
            zero_rate_code: Some(zero_rate_code.to_string()),
            ..Self::default()
        }
    }

    /// Ensure a bucket exists for every taxable line's key.
    ///
    /// Disbursement lines are outside the taxable base and get no bucket.
    pub fn seed(&mut self, lines: &[BusinessDocumentLine]) {
        for line in lines.iter().filter(|l| !l.disbursement) {
            let key = TaxKey::of(line);
            self.buckets
                .entry(key)
                .or_insert_with(|| SubtotalBucket::empty(key, line.tax_code.clone()));
        }
    }

    pub fn get(&self, key: &TaxKey) -> Option<&SubtotalBucket> {
        self.buckets.get(key)
    }

    pub fn get_mut(&mut self, key: &TaxKey) -> Option<&mut SubtotalBucket> {
        self.buckets.get_mut(key)
    }

    pub fn contains(&self, key: &TaxKey) -> bool {
        self.buckets.contains_key(key)
    }

    /// The `0|0` bucket, created empty with `tax_code` if missing.
    pub fn zero_bucket_mut(&mut self, tax_code: &str) -> &mut SubtotalBucket {
        self.buckets
            .entry(TaxKey::ZERO)
            .or_insert_with(|| SubtotalBucket::empty(TaxKey::ZERO, Some(tax_code.to_string())))
    }

    /// Round every bucket, sum them up and compute the document total.
    pub fn finish(&mut self, decimals: u32) {
        self.net = Decimal::ZERO;
        self.net_before_discount = Decimal::ZERO;
        self.tax_total = Decimal::ZERO;
        self.surcharge_total = Decimal::ZERO;

        for bucket in self.buckets.values_mut() {
            bucket.round(decimals);
            self.net += bucket.net;
            self.net_before_discount += bucket.net_before_discount;
            self.tax_total += bucket.tax_total;
            self.surcharge_total += bucket.surcharge_total;
        }

        self.withholding_total = round_half_up(self.withholding_total, decimals);
        self.disbursement_total = round_half_up(self.disbursement_total, decimals);
        self.cost_total = round_half_up(self.cost_total, decimals);
        self.total = round_half_up(
            self.net + self.tax_total + self.surcharge_total - self.withholding_total
                + self.disbursement_total,
            decimals,
        );
    }

    /// Document totals as computed by [`finish`](Self::finish).
    pub fn totals(&self) -> DocumentTotals {
        DocumentTotals {
            net: self.net,
            net_before_discount: self.net_before_discount,
            tax_total: self.tax_total,
            surcharge_total: self.surcharge_total,
            withholding_rate: self.withholding_rate,
            withholding_total: self.withholding_total,
            disbursement_total: self.disbursement_total,
            cost_total: self.cost_total,
            total: self.total,
        }
    }
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub(crate) fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LineBuilder;
    use rust_decimal_macros::dec;

    #[test]
    fn key_display_normalizes() {
        assert_eq!(TaxKey::new(dec!(21.00), dec!(0.0)).to_string(), "21|0");
        assert_eq!(TaxKey::new(dec!(21), dec!(5.20)).to_string(), "21|5.2");
        assert_eq!(TaxKey::ZERO.to_string(), "0|0");
    }

    #[test]
    fn key_parse() {
        let key: TaxKey = "21|5.2".parse().unwrap();
        assert_eq!(key, TaxKey::new(dec!(21), dec!(5.2)));
        assert_eq!("0.00|0".parse::<TaxKey>().unwrap(), TaxKey::ZERO);
        assert!("21".parse::<TaxKey>().is_err());
        assert!("21|x".parse::<TaxKey>().is_err());
    }

    #[test]
    fn keys_compare_by_value() {
        assert_eq!(TaxKey::new(dec!(21.00), dec!(0)), TaxKey::new(dec!(21), dec!(0)));
        assert!(TaxKey::new(dec!(10), dec!(0)) < TaxKey::new(dec!(21), dec!(0)));
    }

    #[test]
    fn seed_creates_one_bucket_per_key() {
        let lines = vec![
            LineBuilder::new(dec!(1), dec!(10)).tax("IVA21", dec!(21)).build(),
            LineBuilder::new(dec!(2), dec!(10)).tax("IVA21", dec!(21)).build(),
            LineBuilder::new(dec!(1), dec!(10)).tax("IVA10", dec!(10)).build(),
        ];
        let mut subtotals = Subtotals::new();
        subtotals.seed(&lines);
        assert_eq!(subtotals.buckets.len(), 2);
        let bucket = subtotals.get(&TaxKey::new(dec!(21), dec!(0))).unwrap();
        assert_eq!(bucket.tax_code.as_deref(), Some("IVA21"));
        assert_eq!(bucket.net, dec!(0));
    }

    #[test]
    fn seed_skips_disbursements() {
        let lines = vec![
            LineBuilder::new(dec!(1), dec!(10))
                .tax("IVA21", dec!(21))
                .disbursement()
                .build(),
        ];
        let mut subtotals = Subtotals::new();
        subtotals.seed(&lines);
        assert!(subtotals.buckets.is_empty());
    }

    #[test]
    fn zero_bucket_created_on_demand() {
        let mut subtotals = Subtotals::new();
        assert!(!subtotals.contains(&TaxKey::ZERO));
        subtotals.zero_bucket_mut("IVA0").net += dec!(5);
        subtotals.zero_bucket_mut("IVA0").net += dec!(5);
        assert_eq!(subtotals.get(&TaxKey::ZERO).unwrap().net, dec!(10));
    }

    #[test]
    fn finish_rounds_and_sums() {
        let mut subtotals = Subtotals::new();
        let key = TaxKey::new(dec!(21), dec!(0));
        let mut bucket = SubtotalBucket::empty(key, Some("IVA21".into()));
        bucket.net = dec!(10.005);
        bucket.net_before_discount = dec!(10.005);
        bucket.tax_total = dec!(2.10105);
        subtotals.buckets.insert(key, bucket);
        subtotals.withholding_total = dec!(1.5);
        subtotals.disbursement_total = dec!(3);

        subtotals.finish(2);

        assert_eq!(subtotals.net, dec!(10.01));
        assert_eq!(subtotals.tax_total, dec!(2.10));
        // 10.01 + 2.10 - 1.50 + 3.00
        assert_eq!(subtotals.total, dec!(13.61));
    }
}
