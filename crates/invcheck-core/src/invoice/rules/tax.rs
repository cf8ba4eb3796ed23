//! Tax arithmetic between taxable amount, tax and total.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::TaxRounding;
use crate::models::report::Finding;
use crate::models::text::RecognizedText;

use super::amounts::{extract_tax_amounts, TaxAmounts};
use super::ValidationRule;

/// Expected tax for a taxable amount, rounded to a whole currency unit.
///
/// Computed in decimal arithmetic so `10 × 0.05` is exactly `0.5` and the
/// rounding policy alone decides the result.
pub fn expected_tax(taxable: Decimal, rate: Decimal, rounding: TaxRounding) -> Decimal {
    taxable
        .checked_mul(rate)
        .unwrap_or(Decimal::MAX)
        .round_dp_with_strategy(0, rounding.strategy())
}

/// Checks tax and total against the taxable amount.
#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator {
    rate: Decimal,
    rounding: TaxRounding,
}

impl TaxCalculator {
    /// `rate` is a fraction in `0..=1` (0.05 = 5%).
    pub fn new(rate: Decimal, rounding: TaxRounding) -> Self {
        Self { rate, rounding }
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn rounding(&self) -> TaxRounding {
        self.rounding
    }

    pub fn expected_tax(&self, taxable: Decimal) -> Decimal {
        expected_tax(taxable, self.rate, self.rounding)
    }

    /// Findings for already extracted amounts.
    pub fn check(&self, amounts: &TaxAmounts) -> Vec<Finding> {
        check_tax_arithmetic(amounts, self.rate, self.rounding)
    }
}

impl Default for TaxCalculator {
    fn default() -> Self {
        Self::new(Decimal::new(5, 2), TaxRounding::HalfUp)
    }
}

impl ValidationRule for TaxCalculator {
    fn name(&self) -> &'static str {
        "tax_arithmetic"
    }

    fn evaluate(&self, text: &RecognizedText) -> Vec<Finding> {
        self.check(&extract_tax_amounts(text))
    }
}

/// Check the arithmetic group.
///
/// A missing amount yields a single `IncompleteTaxInfo` and nothing else.
/// Otherwise the tax is compared with the rounded rate, and the total with
/// taxable amount plus the *extracted* tax, so a wrong tax does not also
/// flag a total that is consistent with it.
pub fn check_tax_arithmetic(
    amounts: &TaxAmounts,
    rate: Decimal,
    rounding: TaxRounding,
) -> Vec<Finding> {
    let Some((taxable, tax, total)) = amounts.complete() else {
        let missing = amounts.missing();
        debug!("Incomplete tax info, missing {:?}", missing);
        return vec![Finding::IncompleteTaxInfo { missing }];
    };

    let mut findings = Vec::new();

    let expected = expected_tax(taxable, rate, rounding);
    if tax != expected {
        findings.push(Finding::TaxMismatch {
            expected,
            actual: tax,
        });
    }

    let expected_total = taxable + tax;
    if total != expected_total {
        findings.push(Finding::TotalMismatch {
            expected: expected_total,
            actual: total,
        });
    }

    debug!(
        "Tax arithmetic: taxable={}, tax={} (expected {}), total={} (expected {})",
        taxable, tax, expected, total, expected_total
    );

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::rules::amounts::extract_tax_amounts;
    use crate::models::report::AmountField;
    use pretty_assertions::assert_eq;

    fn rate() -> Decimal {
        Decimal::new(5, 2)
    }

    #[test]
    fn test_expected_tax_rounding_boundary() {
        let ten = Decimal::from(10);
        assert_eq!(expected_tax(ten, rate(), TaxRounding::HalfUp), Decimal::ONE);
        assert_eq!(expected_tax(ten, rate(), TaxRounding::HalfEven), Decimal::ZERO);

        // 30 × 0.05 = 1.5: both policies round to 2.
        let thirty = Decimal::from(30);
        assert_eq!(expected_tax(thirty, rate(), TaxRounding::HalfUp), Decimal::from(2));
        assert_eq!(expected_tax(thirty, rate(), TaxRounding::HalfEven), Decimal::from(2));

        assert_eq!(expected_tax(Decimal::from(1000), rate(), TaxRounding::HalfUp), Decimal::from(50));
        assert_eq!(expected_tax(Decimal::from(1009), rate(), TaxRounding::HalfUp), Decimal::from(50));
        assert_eq!(expected_tax(Decimal::from(1010), rate(), TaxRounding::HalfUp), Decimal::from(51));
    }

    #[test]
    fn test_consistent_amounts() {
        let amounts = extract_tax_amounts("應稅金額NT$1000 稅額NT$50 總金額NT$1050");
        assert!(check_tax_arithmetic(&amounts, rate(), TaxRounding::HalfUp).is_empty());
    }

    #[test]
    fn test_wrong_tax_reports_both() {
        let amounts = extract_tax_amounts("應稅金額NT$1000 稅額NT$60 總金額NT$1050");
        assert_eq!(
            check_tax_arithmetic(&amounts, rate(), TaxRounding::HalfUp),
            vec![
                Finding::TaxMismatch {
                    expected: Decimal::from(50),
                    actual: Decimal::from(60),
                },
                Finding::TotalMismatch {
                    expected: Decimal::from(1060),
                    actual: Decimal::from(1050),
                },
            ]
        );
    }

    #[test]
    fn test_wrong_tax_consistent_total() {
        // Total follows the extracted tax, so only the tax is flagged.
        let amounts = extract_tax_amounts("應稅金額NT$1000 稅額NT$60 總金額NT$1060");
        let findings = check_tax_arithmetic(&amounts, rate(), TaxRounding::HalfUp);
        assert_eq!(findings.len(), 1);
        assert!(matches!(findings[0], Finding::TaxMismatch { .. }));
    }

    #[test]
    fn test_wrong_total_only() {
        let amounts = extract_tax_amounts("應稅金額NT$1000 稅額NT$50 總金額NT$1100");
        assert_eq!(
            check_tax_arithmetic(&amounts, rate(), TaxRounding::HalfUp),
            vec![Finding::TotalMismatch {
                expected: Decimal::from(1050),
                actual: Decimal::from(1100),
            }]
        );
    }

    #[test]
    fn test_missing_total_short_circuits() {
        let amounts = extract_tax_amounts("應稅金額NT$1000 稅額NT$999");
        assert_eq!(
            check_tax_arithmetic(&amounts, rate(), TaxRounding::HalfUp),
            vec![Finding::IncompleteTaxInfo {
                missing: vec![AmountField::Total],
            }]
        );
    }

    #[test]
    fn test_rule_evaluates_text() {
        let rule = TaxCalculator::new(rate(), TaxRounding::HalfEven);
        assert!(rule.evaluate(&"應稅金額NT$10 稅額NT$0 總金額NT$10".into()).is_empty());

        let rule = TaxCalculator::default();
        assert_eq!(
            rule.evaluate(&"應稅金額NT$10 稅額NT$0 總金額NT$10".into()),
            vec![Finding::TaxMismatch {
                expected: Decimal::ONE,
                actual: Decimal::ZERO,
            }]
        );
    }
}
