use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use super::error::CalcError;
use super::tax::TaxCode;
use super::types::*;

/// Builder for business documents.
///
/// ```
/// use calculo::core::*;
/// use rust_decimal_macros::dec;
///
/// let doc = DocumentBuilder::customer(
///     CompanyBuilder::new("ACME SL", "ESP").build(),
///     SubjectBuilder::new("C001", "Cliente SA").vat_regime(VatRegime::Surcharge).build(),
/// )
/// .code("FAC2024A1")
/// .discounts(dec!(10), dec!(5))
/// .build()
/// .unwrap();
/// assert!(doc.is_sale());
/// ```
pub struct DocumentBuilder {
    code: String,
    date: Option<NaiveDate>,
    company: Company,
    subject: Subject,
    subject_kind: SubjectKind,
    series: Series,
    discount1: Decimal,
    discount2: Decimal,
    operation: OperationType,
}

impl DocumentBuilder {
    /// A sales document for `customer`.
    pub fn customer(company: Company, customer: Subject) -> Self {
        Self::new(company, customer, SubjectKind::Customer)
    }

    /// A purchase document from `supplier`.
    pub fn supplier(company: Company, supplier: Subject) -> Self {
        Self::new(company, supplier, SubjectKind::Supplier)
    }

    fn new(company: Company, subject: Subject, subject_kind: SubjectKind) -> Self {
        Self {
            code: String::new(),
            date: None,
            company,
            subject,
            subject_kind,
            series: Series::normal("A"),
            discount1: Decimal::ZERO,
            discount2: Decimal::ZERO,
            operation: OperationType::Domestic,
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    /// Document date (default: today, UTC).
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn series(mut self, series: Series) -> Self {
        self.series = series;
        self
    }

    /// Document discounts `dtopor1` and `dtopor2`, applied sequentially.
    pub fn discounts(mut self, first: Decimal, second: Decimal) -> Self {
        self.discount1 = first;
        self.discount2 = second;
        self
    }

    pub fn operation(mut self, operation: OperationType) -> Self {
        self.operation = operation;
        self
    }

    /// Build the document. Discounts must lie within 0–100%.
    pub fn build(self) -> Result<BusinessDocument, CalcError> {
        for (name, value) in [("dtopor1", self.discount1), ("dtopor2", self.discount2)] {
            if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                return Err(CalcError::Builder(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }

        Ok(BusinessDocument {
            code: self.code,
            date: self.date.unwrap_or_else(|| Utc::now().date_naive()),
            company: self.company,
            subject: self.subject,
            subject_kind: self.subject_kind,
            series: self.series,
            discount1: self.discount1,
            discount2: self.discount2,
            operation: self.operation,
            totals: DocumentTotals::default(),
        })
    }
}

/// Builder for Company.
pub struct CompanyBuilder {
    id: u32,
    name: String,
    country_code: String,
    vat_regime: VatRegime,
}

impl CompanyBuilder {
    pub fn new(name: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            id: 1,
            name: name.into(),
            country_code: country_code.into(),
            vat_regime: VatRegime::General,
        }
    }

    pub fn id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn vat_regime(mut self, regime: VatRegime) -> Self {
        self.vat_regime = regime;
        self
    }

    pub fn build(self) -> Company {
        Company {
            id: self.id,
            name: self.name,
            country_code: self.country_code,
            vat_regime: self.vat_regime,
        }
    }
}

/// Builder for Subject (customer/supplier).
pub struct SubjectBuilder {
    code: String,
    name: String,
    vat_regime: VatRegime,
    exemption_code: Option<String>,
}

impl SubjectBuilder {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            vat_regime: VatRegime::General,
            exemption_code: None,
        }
    }

    pub fn vat_regime(mut self, regime: VatRegime) -> Self {
        self.vat_regime = regime;
        self
    }

    pub fn exemption_code(mut self, code: impl Into<String>) -> Self {
        self.exemption_code = Some(code.into());
        self
    }

    pub fn build(self) -> Subject {
        Subject {
            code: self.code,
            name: self.name,
            vat_regime: self.vat_regime,
            exemption_code: self.exemption_code,
        }
    }
}

/// Builder for document lines.
///
/// `build()` fills in `pvpsindto` and `pvptotal` from quantity, price
/// and line discounts.
pub struct LineBuilder {
    reference: Option<String>,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    discount1: Decimal,
    discount2: Decimal,
    tax_code: Option<String>,
    tax_rate: Decimal,
    surcharge_rate: Decimal,
    withholding_rate: Decimal,
    cost: Option<Decimal>,
    product_type: ProductType,
    disbursement: bool,
    exemption_code: Option<String>,
}

impl LineBuilder {
    pub fn new(quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            reference: None,
            description: String::new(),
            quantity,
            unit_price,
            discount1: Decimal::ZERO,
            discount2: Decimal::ZERO,
            tax_code: None,
            tax_rate: Decimal::ZERO,
            surcharge_rate: Decimal::ZERO,
            withholding_rate: Decimal::ZERO,
            cost: None,
            product_type: ProductType::Normal,
            disbursement: false,
            exemption_code: None,
        }
    }

    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Tax code and rate, without surcharge.
    pub fn tax(mut self, code: impl Into<String>, rate: Decimal) -> Self {
        self.tax_code = Some(code.into());
        self.tax_rate = rate;
        self
    }

    /// Tax code, rate and surcharge taken from a catalog entry. The
    /// country rules drop the surcharge for subjects not under the
    /// surcharge-equivalence regime.
    pub fn tax_code(mut self, tax: &TaxCode) -> Self {
        self.tax_code = Some(tax.code.clone());
        self.tax_rate = tax.rate;
        self.surcharge_rate = tax.surcharge;
        self
    }

    pub fn surcharge(mut self, rate: Decimal) -> Self {
        self.surcharge_rate = rate;
        self
    }

    /// IRPF withholding rate.
    pub fn withholding(mut self, rate: Decimal) -> Self {
        self.withholding_rate = rate;
        self
    }

    pub fn discounts(mut self, first: Decimal, second: Decimal) -> Self {
        self.discount1 = first;
        self.discount2 = second;
        self
    }

    pub fn cost(mut self, cost: Decimal) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = product_type;
        self
    }

    /// Mark the line as a disbursement (`suplido`).
    pub fn disbursement(mut self) -> Self {
        self.disbursement = true;
        self
    }

    pub fn exemption_code(mut self, code: impl Into<String>) -> Self {
        self.exemption_code = Some(code.into());
        self
    }

    pub fn build(self) -> BusinessDocumentLine {
        let total_before_discount = self.quantity * self.unit_price;
        BusinessDocumentLine {
            reference: self.reference,
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount1: self.discount1,
            discount2: self.discount2,
            total_before_discount,
            line_total: apply_discounts(total_before_discount, self.discount1, self.discount2),
            tax_code: self.tax_code,
            tax_rate: self.tax_rate,
            surcharge_rate: self.surcharge_rate,
            withholding_rate: self.withholding_rate,
            cost: self.cost,
            product_type: self.product_type,
            disbursement: self.disbursement,
            exemption_code: self.exemption_code,
        }
    }
}
