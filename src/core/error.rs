use thiserror::Error;

/// Errors that can occur while building documents or running a calculation.
///
/// The tax rules themselves never fail; these errors cover caller
/// contract violations around them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CalcError {
    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// A tax code was referenced that the catalog does not contain.
    #[error("unknown tax code: {0}")]
    UnknownTaxCode(String),

    /// The same tax code was registered twice in a catalog.
    #[error("duplicate tax code: {0}")]
    DuplicateTaxCode(String),

    /// A subtotal key is not of the form `<rate>|<surcharge>`.
    #[error("invalid tax key: {0}")]
    InvalidTaxKey(String),

    /// Calculator settings are out of range.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// An amount exceeded the range of [`rust_decimal::Decimal`].
    #[error("amount overflow while computing {0}")]
    Overflow(&'static str),

    /// A country rule set refused to continue the calculation.
    #[error("rule set for {country} aborted during {stage}")]
    RuleAborted {
        /// Country code of the rule set.
        country: String,
        /// Calculation stage that returned `false`.
        stage: &'static str,
    },
}
