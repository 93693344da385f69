//! Line tax rules and subtotal exception paths for Spanish companies.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::core::{
    BusinessDocument, BusinessDocumentLine, OperationType, ProductType, Subtotals, TaxCatalog,
    TaxKey, TaxRuleSet, VatRegime, tax_amount,
};

use super::exemption::ExemptionReason;

/// Country code handled by [`SpainRules`].
pub const SPAIN: &str = "ESP";

/// Spanish VAT rule set.
#[derive(Debug, Clone)]
pub struct SpainRules {
    catalog: TaxCatalog,
}

impl SpainRules {
    pub fn new(catalog: TaxCatalog) -> Self {
        Self { catalog }
    }

    /// Sale of second-hand goods by a company under the margin scheme.
    fn is_margin_scheme_sale(doc: &BusinessDocument, line: &BusinessDocumentLine) -> bool {
        doc.is_sale()
            && doc.company.vat_regime == VatRegime::UsedGoods
            && line.product_type == ProductType::SecondHand
    }
}

impl TaxRuleSet for SpainRules {
    fn country(&self) -> &str {
        SPAIN
    }

    /// Per line, first matching rule wins:
    ///
    /// 1. Second-hand purchase by a used-goods company → no tax at all.
    /// 2. Exempt subject (or tax-free series) → zero-rate code, no tax,
    ///    subject's exemption reason.
    /// 3. Subject not under recargo de equivalencia → no surcharge.
    ///
    /// Documents of companies outside Spain are left untouched.
    fn apply(&self, doc: &BusinessDocument, lines: &mut [BusinessDocumentLine]) -> bool {
        if doc.company.country_code != SPAIN {
            return true;
        }

        let subject = &doc.subject;
        let exempt_subject = subject.vat_regime == VatRegime::Exempt;
        if exempt_subject {
            if let Some(code) = subject
                .exemption_code
                .as_deref()
                .filter(|c| ExemptionReason::from_code(c).is_none())
            {
                warn!(subject = %subject.code, code, "unknown VAT exemption reason");
            }
        }

        for (idx, line) in lines.iter_mut().enumerate() {
            if doc.is_purchase()
                && doc.company.vat_regime == VatRegime::UsedGoods
                && line.product_type == ProductType::SecondHand
            {
                line.tax_code = None;
                line.tax_rate = Decimal::ZERO;
                line.surcharge_rate = Decimal::ZERO;
                debug!(line = idx, rule = "used_goods_purchase", "line tax cleared");
                continue;
            }

            if exempt_subject || doc.series.without_tax {
                line.tax_code = Some(self.catalog.zero_rate().code.clone());
                line.tax_rate = Decimal::ZERO;
                line.surcharge_rate = Decimal::ZERO;
                if exempt_subject {
                    line.exemption_code = subject.exemption_code.clone();
                }
                debug!(line = idx, rule = "exempt", "line set to zero rate");
                continue;
            }

            if subject.vat_regime != VatRegime::Surcharge {
                line.surcharge_rate = Decimal::ZERO;
            }
        }

        true
    }

    /// Margin-scheme and intra-community contributions.
    ///
    /// Lines whose key has no bucket are skipped. The only bucket this
    /// creates is the `0|0` bucket for margin-scheme cost bases, coded
    /// with the subtotals' zero rate (or this rule set's catalog one).
    fn get_subtotals(
        &self,
        subtotals: &mut Subtotals,
        doc: &BusinessDocument,
        lines: &[BusinessDocumentLine],
    ) -> bool {
        let zero_rate_code = subtotals
            .zero_rate_code
            .clone()
            .unwrap_or_else(|| self.catalog.zero_rate().code.clone());

        for line in lines.iter().filter(|l| !l.disbursement) {
            let key = TaxKey::of(line);
            if !subtotals.contains(&key) {
                warn!(key = %key, "no subtotal bucket for line tax key, skipping");
                continue;
            }

            let cost_total = line.cost_total();
            let pvp_total = doc.apply_discounts(line.line_total);

            if Self::is_margin_scheme_sale(doc, line) {
                let zero = subtotals.zero_bucket_mut(&zero_rate_code);
                zero.net += cost_total;
                zero.net_before_discount += cost_total;

                // Negative margins are untaxed, except on rectifying
                // documents which must mirror the original.
                let margin = pvp_total - cost_total;
                if margin <= Decimal::ZERO && !doc.series.is_rectifying() {
                    continue;
                }

                let fixed_value = self.catalog.is_fixed_value(line.tax_code.as_deref());
                if let Some(bucket) = subtotals.get_mut(&key) {
                    bucket.net += margin;
                    bucket.net_before_discount += margin;
                    bucket.tax_total += tax_amount(margin, line.tax_rate, fixed_value);
                }
                continue;
            }

            if doc.operation == OperationType::IntraCommunity {
                if let Some(bucket) = subtotals.get_mut(&key) {
                    bucket.tax_total = Decimal::ZERO;
                    bucket.surcharge_total = Decimal::ZERO;
                }
            }
        }

        true
    }

    fn takes_over_line(&self, doc: &BusinessDocument, line: &BusinessDocumentLine) -> bool {
        doc.company.country_code == SPAIN && Self::is_margin_scheme_sale(doc, line)
    }
}
