use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Business document header: invoice, delivery note, order or estimate.
///
/// Company, subject and series are resolved by the caller before the
/// document reaches the calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessDocument {
    /// Document code (e.g. "FAC2024A1").
    pub code: String,
    /// `fecha`: document date.
    pub date: NaiveDate,
    /// Issuing (or receiving, for purchases) company.
    pub company: Company,
    /// Customer or supplier.
    pub subject: Subject,
    /// Whether `subject` is a customer or a supplier.
    pub subject_kind: SubjectKind,
    /// Numbering series.
    pub series: Series,
    /// `dtopor1`: first document-level discount percentage.
    pub discount1: Decimal,
    /// `dtopor2`: second document-level discount, applied after the first.
    pub discount2: Decimal,
    /// VAT operation type.
    pub operation: OperationType,
    /// Calculated totals (written by `Calculator::calculate`).
    pub totals: DocumentTotals,
}

impl BusinessDocument {
    /// Name of the column holding the subject reference.
    pub fn subject_column(&self) -> &'static str {
        self.subject_kind.column()
    }

    /// True for sales documents (subject is a customer).
    pub fn is_sale(&self) -> bool {
        self.subject_kind == SubjectKind::Customer
    }

    /// True for purchase documents (subject is a supplier).
    pub fn is_purchase(&self) -> bool {
        self.subject_kind == SubjectKind::Supplier
    }

    /// Apply both document discounts to `amount`, one after the other.
    pub fn apply_discounts(&self, amount: Decimal) -> Decimal {
        apply_discounts(amount, self.discount1, self.discount2)
    }
}

/// Apply two percentage discounts sequentially:
/// `amount × (100 − first)/100 × (100 − second)/100`.
///
/// 10% then 10% on 100 is 81, not 80.
pub fn apply_discounts(amount: Decimal, first: Decimal, second: Decimal) -> Decimal {
    let hundred = Decimal::ONE_HUNDRED;
    amount * (hundred - first) / hundred * (hundred - second) / hundred
}

/// [`apply_discounts`] returning `None` instead of panicking when an
/// intermediate product leaves the `Decimal` range.
pub fn checked_apply_discounts(
    amount: Decimal,
    first: Decimal,
    second: Decimal,
) -> Option<Decimal> {
    let hundred = Decimal::ONE_HUNDRED;
    amount
        .checked_mul(hundred - first)?
        .checked_div(hundred)?
        .checked_mul(hundred - second)?
        .checked_div(hundred)
}

/// Totals written back into the document after calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// `neto`: taxable base after document discounts.
    pub net: Decimal,
    /// `netosindto`: taxable base before document discounts.
    pub net_before_discount: Decimal,
    /// `totaliva`: VAT total.
    pub tax_total: Decimal,
    /// `totalrecargo`: surcharge total.
    pub surcharge_total: Decimal,
    /// `irpf`: highest withholding rate found on the lines.
    pub withholding_rate: Decimal,
    /// `totalirpf`: withholding total (deducted).
    pub withholding_total: Decimal,
    /// `totalsuplidos`: disbursements, outside the taxable base.
    pub disbursement_total: Decimal,
    /// `totalcoste`: cost of the goods on the document.
    pub cost_total: Decimal,
    /// `total`: net + VAT + surcharge − withholding + disbursements.
    pub total: Decimal,
}

/// Company owning the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    /// Internal company id.
    pub id: u32,
    /// Legal name.
    pub name: String,
    /// Country code (ISO 3166-1 alpha-3, e.g. "ESP").
    pub country_code: String,
    /// The company's own VAT regime.
    pub vat_regime: VatRegime,
}

/// Customer or supplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Customer/supplier code.
    pub code: String,
    /// Name.
    pub name: String,
    /// VAT regime of the subject.
    pub vat_regime: VatRegime,
    /// Exemption reason stamped on exempt lines (e.g. "E1").
    pub exemption_code: Option<String>,
}

/// Document numbering series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    /// Series code (e.g. "A", "R").
    pub code: String,
    /// Normal or rectifying.
    pub series_type: SeriesType,
    /// Documents of this series never carry VAT.
    pub without_tax: bool,
}

impl Series {
    /// A normal series.
    pub fn normal(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            series_type: SeriesType::Normal,
            without_tax: false,
        }
    }

    /// A rectifying series, used for corrections of issued documents.
    pub fn rectifying(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            series_type: SeriesType::Rectifying,
            without_tax: false,
        }
    }

    /// Mark the series as tax-free.
    pub fn without_tax(mut self) -> Self {
        self.without_tax = true;
        self
    }

    pub fn is_rectifying(&self) -> bool {
        self.series_type == SeriesType::Rectifying
    }
}

/// One document line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessDocumentLine {
    /// Product reference, if the line refers to a product.
    pub reference: Option<String>,
    /// Free-text description.
    pub description: String,
    /// `cantidad`: quantity.
    pub quantity: Decimal,
    /// `pvpunitario`: unit price.
    pub unit_price: Decimal,
    /// `dtopor`: first line discount percentage.
    pub discount1: Decimal,
    /// `dtopor2`: second line discount percentage.
    pub discount2: Decimal,
    /// `pvpsindto`: quantity × unit price.
    pub total_before_discount: Decimal,
    /// `pvptotal`: line total before tax, after line discounts.
    pub line_total: Decimal,
    /// `codimpuesto`: tax code, `None` when the line carries no tax.
    pub tax_code: Option<String>,
    /// `iva`: tax rate.
    pub tax_rate: Decimal,
    /// `recargo`: surcharge rate.
    pub surcharge_rate: Decimal,
    /// `irpf`: withholding rate.
    pub withholding_rate: Decimal,
    /// `coste`: unit cost.
    pub cost: Option<Decimal>,
    /// Type of the referenced product.
    pub product_type: ProductType,
    /// `suplido`: disbursement paid on behalf of the customer.
    pub disbursement: bool,
    /// `excepcioniva`: VAT exemption reason code.
    pub exemption_code: Option<String>,
}

impl BusinessDocumentLine {
    /// `quantity × cost`, zero when the line has no cost.
    pub fn cost_total(&self) -> Decimal {
        self.cost.map_or(Decimal::ZERO, |c| self.quantity * c)
    }
}

/// Customer or supplier. Decides the document's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectKind {
    /// Sales document.
    Customer,
    /// Purchase document.
    Supplier,
}

impl SubjectKind {
    /// Column name of the subject reference on the document.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Customer => "codcliente",
            Self::Supplier => "codproveedor",
        }
    }
}

/// VAT regime of a company, customer or supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VatRegime {
    /// General regime.
    #[default]
    General,
    /// Exempt from VAT.
    Exempt,
    /// Recargo de equivalencia (retail surcharge).
    Surcharge,
    /// Used-goods margin scheme (REBU).
    UsedGoods,
    /// Agriculture, livestock and fishing special regime.
    Agrarian,
    /// Cash-basis accounting regime.
    CashBasis,
    /// Simplified regime.
    Simplified,
}

impl VatRegime {
    /// Code stored in the database.
    pub fn code(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Exempt => "Exento",
            Self::Surcharge => "Recargo",
            Self::UsedGoods => "Usados",
            Self::Agrarian => "Agrario",
            Self::CashBasis => "Caja",
            Self::Simplified => "Simplificado",
        }
    }

    /// Parse from the stored code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "General" => Some(Self::General),
            "Exento" => Some(Self::Exempt),
            "Recargo" => Some(Self::Surcharge),
            "Usados" => Some(Self::UsedGoods),
            "Agrario" => Some(Self::Agrarian),
            "Caja" => Some(Self::CashBasis),
            "Simplificado" => Some(Self::Simplified),
            _ => None,
        }
    }
}

/// Product type as relevant to tax rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductType {
    #[default]
    Normal,
    /// Second-hand goods, eligible for the margin scheme.
    SecondHand,
}

impl ProductType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::SecondHand => "SegundaMano",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Normal" => Some(Self::Normal),
            "SegundaMano" => Some(Self::SecondHand),
            _ => None,
        }
    }
}

/// VAT operation type of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OperationType {
    /// Domestic operation.
    #[default]
    Domestic,
    /// Intra-community supply or acquisition, zero-rated.
    IntraCommunity,
    /// Export outside the tax union.
    Export,
    /// Anything else.
    Other,
}

impl OperationType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Domestic => "",
            Self::IntraCommunity => "intracomunitaria",
            Self::Export => "exportacion",
            Self::Other => "otra",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "" => Some(Self::Domestic),
            "intracomunitaria" => Some(Self::IntraCommunity),
            "exportacion" => Some(Self::Export),
            "otra" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Series type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SeriesType {
    #[default]
    Normal,
    /// Rectifying series ("R").
    Rectifying,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn discounts_are_sequential() {
        assert_eq!(apply_discounts(dec!(100), dec!(10), dec!(10)), dec!(81));
        assert_eq!(apply_discounts(dec!(100), dec!(20), dec!(0)), dec!(80));
        assert_eq!(apply_discounts(dec!(100), dec!(0), dec!(0)), dec!(100));
    }

    #[test]
    fn full_discount_zeroes_amount() {
        assert_eq!(apply_discounts(dec!(250), dec!(100), dec!(5)), dec!(0));
    }

    #[test]
    fn regime_codes_roundtrip() {
        for regime in [
            VatRegime::General,
            VatRegime::Exempt,
            VatRegime::Surcharge,
            VatRegime::UsedGoods,
            VatRegime::Agrarian,
            VatRegime::CashBasis,
            VatRegime::Simplified,
        ] {
            assert_eq!(VatRegime::from_code(regime.code()), Some(regime));
        }
        assert_eq!(VatRegime::from_code("Desconocido"), None);
    }

    #[test]
    fn operation_codes() {
        assert_eq!(
            OperationType::from_code("intracomunitaria"),
            Some(OperationType::IntraCommunity)
        );
        assert_eq!(OperationType::from_code(""), Some(OperationType::Domestic));
        assert_eq!(OperationType::from_code("X"), None);
    }

    #[test]
    fn product_type_codes() {
        assert_eq!(
            ProductType::from_code("SegundaMano"),
            Some(ProductType::SecondHand)
        );
        assert_eq!(ProductType::SecondHand.code(), "SegundaMano");
    }

    #[test]
    fn subject_columns() {
        assert_eq!(SubjectKind::Customer.column(), "codcliente");
        assert_eq!(SubjectKind::Supplier.column(), "codproveedor");
    }

    #[test]
    fn series_flags() {
        assert!(Series::rectifying("R").is_rectifying());
        assert!(!Series::normal("A").is_rectifying());
        assert!(Series::normal("S").without_tax().without_tax);
    }
}
