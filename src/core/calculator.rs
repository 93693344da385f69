//! Country-independent document calculator.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::error::CalcError;
use super::rules::TaxRuleSet;
use super::settings::CalculatorSettings;
use super::subtotals::{Subtotals, TaxKey};
use super::tax::{TaxCatalog, tax_amount};
use super::types::{
    BusinessDocument, BusinessDocumentLine, DocumentTotals, checked_apply_discounts,
};

/// Computes line amounts, the standard subtotal breakdown and document
/// totals, delegating country-specific adjustments to the registered
/// [`TaxRuleSet`] for the company's country.
///
/// The calculator holds only immutable reference data and may be shared
/// between threads. It never keeps a reference to a document.
///
/// Line amounts that leave the `Decimal` range (about ±7.9e28) are
/// reported as [`CalcError::Overflow`]. Document sums are expected to
/// stay well inside that range.
pub struct Calculator {
    catalog: TaxCatalog,
    settings: CalculatorSettings,
    rules: Vec<Box<dyn TaxRuleSet>>,
}

impl Calculator {
    /// A calculator with default settings and no rule sets.
    pub fn new(catalog: TaxCatalog) -> Self {
        Self {
            catalog,
            settings: CalculatorSettings::default(),
            rules: Vec::new(),
        }
    }

    /// A calculator with explicit settings.
    ///
    /// Tax codes named by the settings must exist in `catalog`. A
    /// configured zero-rate code replaces the catalog's own.
    pub fn with_settings(
        catalog: TaxCatalog,
        settings: CalculatorSettings,
    ) -> Result<Self, CalcError> {
        settings.validate()?;
        let catalog = match settings.zero_rate_code.as_deref() {
            Some(code) => catalog.with_zero_rate(code)?,
            None => catalog,
        };
        if let Some(code) = settings.default_tax_code.as_deref() {
            catalog.require(code)?;
        }
        Ok(Self {
            catalog,
            settings,
            rules: Vec::new(),
        })
    }

    /// Register a rule set, replacing any previous one for the same country.
    pub fn with_rules(mut self, rules: impl TaxRuleSet + 'static) -> Self {
        self.rules.retain(|r| r.country() != rules.country());
        self.rules.push(Box::new(rules));
        self
    }

    pub fn catalog(&self) -> &TaxCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }

    /// Rule set registered for `country`, if any.
    pub fn rules_for(&self, country: &str) -> Option<&dyn TaxRuleSet> {
        self.rules
            .iter()
            .find(|r| r.country() == country)
            .map(|r| r.as_ref())
    }

    /// Reset document totals and line amounts.
    pub fn clear(
        &self,
        doc: &mut BusinessDocument,
        lines: &mut [BusinessDocumentLine],
    ) -> Result<(), CalcError> {
        doc.totals = DocumentTotals::default();
        for line in lines.iter_mut() {
            line.total_before_discount = Decimal::ZERO;
            line.line_total = Decimal::ZERO;
        }

        if let Some(rules) = self.rules_for(&doc.company.country_code) {
            check(rules.clear(doc, lines), rules, "clear")?;
        }
        Ok(())
    }

    /// Compute `pvpsindto` and `pvptotal` of one line.
    pub fn calculate_line(
        &self,
        doc: &BusinessDocument,
        line: &mut BusinessDocumentLine,
    ) -> Result<(), CalcError> {
        line.total_before_discount = line
            .quantity
            .checked_mul(line.unit_price)
            .ok_or(CalcError::Overflow("pvpsindto"))?;
        line.line_total =
            checked_apply_discounts(line.total_before_discount, line.discount1, line.discount2)
                .ok_or(CalcError::Overflow("pvptotal"))?;

        if let Some(rules) = self.rules_for(&doc.company.country_code) {
            check(rules.calculate_line(doc, line), rules, "calculate_line")?;
        }
        Ok(())
    }

    /// Build the subtotal breakdown of already calculated lines.
    ///
    /// Seeds a bucket for every taxable line, accumulates the standard
    /// amounts, lets the country rule set contribute its exception paths
    /// and finally rounds and sums everything up.
    pub fn get_subtotals(
        &self,
        doc: &BusinessDocument,
        lines: &[BusinessDocumentLine],
    ) -> Result<Subtotals, CalcError> {
        let rules = self.rules_for(&doc.company.country_code);

        let mut subtotals = Subtotals::with_zero_rate(&self.catalog.zero_rate().code);
        subtotals.seed(lines);

        for line in lines {
            let pvp_total = doc.apply_discounts(line.line_total);

            if line.disbursement {
                subtotals.disbursement_total += pvp_total;
                continue;
            }

            subtotals.cost_total += line.cost_total();
            subtotals.withholding_rate = subtotals.withholding_rate.max(line.withholding_rate);
            subtotals.withholding_total += pvp_total * line.withholding_rate / Decimal::ONE_HUNDRED;

            if rules.is_some_and(|r| r.takes_over_line(doc, line)) {
                continue;
            }

            let fixed_value = self.catalog.is_fixed_value(line.tax_code.as_deref());
            let Some(bucket) = subtotals.get_mut(&TaxKey::of(line)) else {
                continue;
            };
            bucket.net += pvp_total;
            bucket.net_before_discount += line.line_total;
            if line.tax_rate > Decimal::ZERO {
                bucket.tax_total += tax_amount(pvp_total, line.tax_rate, fixed_value);
            }
            if line.surcharge_rate > Decimal::ZERO {
                bucket.surcharge_total += pvp_total * line.surcharge_rate / Decimal::ONE_HUNDRED;
            }
        }

        if let Some(rules) = rules {
            check(
                rules.get_subtotals(&mut subtotals, doc, lines),
                rules,
                "get_subtotals",
            )?;
        }

        subtotals.finish(self.settings.decimals);
        Ok(subtotals)
    }

    /// Give lines without a tax code the configured default code and its
    /// rates. Runs before the rule set, which may clear the code again.
    fn assign_default_tax(&self, lines: &mut [BusinessDocumentLine]) {
        let Some(tax) = self
            .settings
            .default_tax_code
            .as_deref()
            .and_then(|code| self.catalog.get(code))
        else {
            return;
        };
        for line in lines.iter_mut().filter(|l| l.tax_code.is_none()) {
            line.tax_code = Some(tax.code.clone());
            line.tax_rate = tax.rate;
            line.surcharge_rate = tax.surcharge;
        }
    }

    /// Full calculation: clear, apply the country rules, calculate every
    /// line, build subtotals and write the totals into the document.
    pub fn calculate(
        &self,
        doc: &mut BusinessDocument,
        lines: &mut [BusinessDocumentLine],
    ) -> Result<Subtotals, CalcError> {
        self.clear(doc, lines)?;
        self.assign_default_tax(lines);

        let rules = self.rules_for(&doc.company.country_code);
        match rules {
            Some(rules) => check(rules.apply(doc, lines), rules, "apply")?,
            None => debug!(
                country = %doc.company.country_code,
                "no tax rule set registered, using generic calculation"
            ),
        }

        for line in lines.iter_mut() {
            self.calculate_line(doc, line)?;
        }

        if let Some(rules) = rules {
            check(rules.calculate(doc, lines), rules, "calculate")?;
        }

        let subtotals = self.get_subtotals(doc, lines)?;
        doc.totals = subtotals.totals();

        debug!(
            document = %doc.code,
            date = %doc.date,
            lines = lines.len(),
            buckets = subtotals.buckets.len(),
            total = %doc.totals.total,
            "document calculated"
        );
        Ok(subtotals)
    }
}

fn check(ok: bool, rules: &dyn TaxRuleSet, stage: &'static str) -> Result<(), CalcError> {
    if ok {
        return Ok(());
    }
    warn!(country = rules.country(), stage, "tax rule set aborted calculation");
    Err(CalcError::RuleAborted {
        country: rules.country().to_string(),
        stage,
    })
}
