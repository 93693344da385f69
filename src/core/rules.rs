use super::subtotals::Subtotals;
use super::types::{BusinessDocument, BusinessDocumentLine};

/// Country-specific tax rules plugged into the [`Calculator`](super::Calculator).
///
/// The calculator picks the rule set whose [`country`](Self::country)
/// matches the document company's country code. Every hook returns
/// `true` to let the calculation continue; `false` aborts it.
pub trait TaxRuleSet: Send + Sync {
    /// ISO 3166-1 alpha-3 country code this rule set handles.
    fn country(&self) -> &str;

    /// Adjust per-line tax code, rates and exemption before amounts are
    /// computed.
    fn apply(&self, doc: &BusinessDocument, lines: &mut [BusinessDocumentLine]) -> bool;

    /// Document-level hook, run after every line has been calculated.
    fn calculate(&self, _doc: &BusinessDocument, _lines: &mut [BusinessDocumentLine]) -> bool {
        true
    }

    /// Line-level hook, run after the line amounts have been computed.
    fn calculate_line(&self, _doc: &BusinessDocument, _line: &mut BusinessDocumentLine) -> bool {
        true
    }

    /// Hook run when the document is cleared before recalculation.
    fn clear(&self, _doc: &BusinessDocument, _lines: &mut [BusinessDocumentLine]) -> bool {
        true
    }

    /// Exception-path contribution to subtotals. Buckets for every line
    /// key are seeded before this runs.
    fn get_subtotals(
        &self,
        subtotals: &mut Subtotals,
        doc: &BusinessDocument,
        lines: &[BusinessDocumentLine],
    ) -> bool;

    /// Whether this rule set accumulates `line` into the buckets itself,
    /// so the standard accumulation must leave it out.
    fn takes_over_line(&self, _doc: &BusinessDocument, _line: &BusinessDocumentLine) -> bool {
        false
    }
}
