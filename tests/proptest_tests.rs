//! Property-based tests for the calculator and the Spanish rule set.
//!
//! Run with: `cargo test --features all --test proptest_tests`

#![cfg(feature = "es")]

use calculo::core::*;
use calculo::es::SpainRules;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn calculator() -> Calculator {
    Calculator::new(TaxCatalog::spain()).with_rules(SpainRules::new(TaxCatalog::spain()))
}

/// Amounts with two decimals, 0.00 ..= 10_000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..=1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Whole percentages 0 ..= 100.
fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..=100).prop_map(Decimal::from)
}

fn regime() -> impl Strategy<Value = VatRegime> {
    prop_oneof![
        Just(VatRegime::General),
        Just(VatRegime::Exempt),
        Just(VatRegime::Surcharge),
        Just(VatRegime::UsedGoods),
        Just(VatRegime::Simplified),
    ]
}

fn tax_code() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("IVA0"),
        Just("IVA4"),
        Just("IVA5"),
        Just("IVA10"),
        Just("IVA21")
    ]
}

fn line() -> impl Strategy<Value = BusinessDocumentLine> {
    (1i64..=20, amount(), tax_code(), any::<bool>(), amount()).prop_map(
        |(qty, price, code, second_hand, cost)| {
            let catalog = TaxCatalog::spain();
            let mut builder = LineBuilder::new(Decimal::from(qty), price)
                .tax_code(catalog.require(code).unwrap())
                .cost(cost);
            if second_hand {
                builder = builder.product_type(ProductType::SecondHand);
            }
            builder.build()
        },
    )
}

fn document(
    company_regime: VatRegime,
    subject_regime: VatRegime,
    sale: bool,
    country: &str,
) -> BusinessDocument {
    let company = CompanyBuilder::new("ACME", country)
        .vat_regime(company_regime)
        .build();
    let subject = SubjectBuilder::new("S1", "Sujeto")
        .vat_regime(subject_regime)
        .exemption_code("E1")
        .build();
    let builder = if sale {
        DocumentBuilder::customer(company, subject)
    } else {
        DocumentBuilder::supplier(company, subject)
    };
    builder.build().unwrap()
}

proptest! {
    #[test]
    fn discounts_compose_sequentially(value in amount(), d1 in percent(), d2 in percent()) {
        let once = apply_discounts(value, d1, d2);
        let twice = apply_discounts(apply_discounts(value, d1, Decimal::ZERO), d2, Decimal::ZERO);
        prop_assert_eq!(once, twice);
        prop_assert!(once <= value);
        prop_assert!(once >= Decimal::ZERO);
    }

    #[test]
    fn foreign_documents_untouched(
        lines in prop::collection::vec(line(), 1..8),
        company_regime in regime(),
        subject_regime in regime(),
        sale in any::<bool>(),
    ) {
        let doc = document(company_regime, subject_regime, sale, "PRT");
        let mut after = lines.clone();
        prop_assert!(SpainRules::new(TaxCatalog::spain()).apply(&doc, &mut after));
        for (a, b) in after.iter().zip(&lines) {
            prop_assert_eq!(&a.tax_code, &b.tax_code);
            prop_assert_eq!(a.tax_rate, b.tax_rate);
            prop_assert_eq!(a.surcharge_rate, b.surcharge_rate);
            prop_assert_eq!(&a.exemption_code, &b.exemption_code);
        }
    }

    #[test]
    fn surcharge_only_for_surcharge_subjects(
        lines in prop::collection::vec(line(), 1..8),
        company_regime in regime(),
        subject_regime in regime(),
        sale in any::<bool>(),
    ) {
        let doc = document(company_regime, subject_regime, sale, "ESP");
        let mut lines = lines;
        SpainRules::new(TaxCatalog::spain()).apply(&doc, &mut lines);
        for line in &lines {
            if subject_regime != VatRegime::Surcharge {
                prop_assert_eq!(line.surcharge_rate, Decimal::ZERO);
            }
            if subject_regime == VatRegime::Exempt {
                prop_assert_eq!(line.tax_rate, Decimal::ZERO);
            }
        }
    }

    #[test]
    fn total_is_sum_of_parts(
        lines in prop::collection::vec(line(), 0..12),
        company_regime in regime(),
        subject_regime in regime(),
        sale in any::<bool>(),
        d1 in percent(),
    ) {
        let mut doc = document(company_regime, subject_regime, sale, "ESP");
        doc.discount1 = d1;
        let mut lines = lines;
        let subtotals = calculator().calculate(&mut doc, &mut lines).unwrap();

        let t = &doc.totals;
        prop_assert_eq!(
            t.total,
            t.net + t.tax_total + t.surcharge_total - t.withholding_total + t.disbursement_total
        );
        let bucket_net: Decimal = subtotals.buckets.values().map(|b| b.net).sum();
        prop_assert_eq!(bucket_net, t.net);
    }

    #[test]
    fn every_taxable_line_has_a_bucket(
        lines in prop::collection::vec(line(), 1..12),
        subject_regime in regime(),
    ) {
        let mut doc = document(VatRegime::General, subject_regime, true, "ESP");
        let mut lines = lines;
        let subtotals = calculator().calculate(&mut doc, &mut lines).unwrap();
        for line in &lines {
            prop_assert!(subtotals.contains(&TaxKey::of(line)));
        }
    }

    #[test]
    fn calculation_is_deterministic(
        lines in prop::collection::vec(line(), 0..8),
        company_regime in regime(),
        subject_regime in regime(),
    ) {
        let calc = calculator();
        let mut doc = document(company_regime, subject_regime, true, "ESP");
        let mut lines = lines;
        let first = calc.calculate(&mut doc, &mut lines).unwrap();
        let second = calc.calculate(&mut doc, &mut lines).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn tax_key_display_roundtrips(rate in 0i64..=10_000, surcharge in 0i64..=1_000) {
        let key = TaxKey::new(Decimal::new(rate, 2), Decimal::new(surcharge, 2));
        let parsed: TaxKey = key.to_string().parse().unwrap();
        prop_assert_eq!(parsed, key);
    }
}

#[test]
fn margin_never_taxes_cost_basis() {
    let mut doc = document(VatRegime::UsedGoods, VatRegime::General, true, "ESP");
    let mut lines = vec![
        LineBuilder::new(dec!(2), dec!(100))
            .tax("IVA21", dec!(21))
            .cost(dec!(70))
            .product_type(ProductType::SecondHand)
            .build(),
    ];
    let subtotals = calculator().calculate(&mut doc, &mut lines).unwrap();
    assert_eq!(subtotals.get(&TaxKey::ZERO).unwrap().tax_total, dec!(0));
    assert_eq!(subtotals.get(&TaxKey::ZERO).unwrap().net, dec!(140));
    assert_eq!(doc.totals.tax_total, dec!(12.60));
}
