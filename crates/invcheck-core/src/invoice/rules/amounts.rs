//! Amount extraction for Taiwanese invoices.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::report::{AmountField, Finding};
use crate::models::text::RecognizedText;

use super::patterns::{
    DECIMAL_DIGIT, NUMERIC_AMOUNT, TAXABLE_AMOUNT, TAX_AMOUNT, TOTAL_AMOUNT, TRADITIONAL_AMOUNT,
};
use super::{ExtractionMatch, FieldExtractor, ValidationRule};

/// Extractor for currency-prefixed numeric amounts (`NT$1,000`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericAmountExtractor;

impl NumericAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for NumericAmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        NUMERIC_AMOUNT.find(text).map(|m| {
            ExtractionMatch::new(m.as_str().to_string(), m.as_str()).with_position(m.start(), m.end())
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        NUMERIC_AMOUNT
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Extractor for amounts written in traditional numerals (`壹仟元`).
#[derive(Debug, Clone, Copy, Default)]
pub struct TraditionalAmountExtractor;

impl TraditionalAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for TraditionalAmountExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        TRADITIONAL_AMOUNT.find(text).map(|m| {
            ExtractionMatch::new(m.as_str().to_string(), m.as_str()).with_position(m.start(), m.end())
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        TRADITIONAL_AMOUNT
            .find_iter(text)
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

/// Requires both a numeric and a traditional numeral amount somewhere in the
/// text. The two are not tied to a field or compared with each other.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountFormatRule {
    numeric: NumericAmountExtractor,
    traditional: TraditionalAmountExtractor,
}

impl AmountFormatRule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ValidationRule for AmountFormatRule {
    fn name(&self) -> &'static str {
        "amount_format"
    }

    fn evaluate(&self, text: &RecognizedText) -> Vec<Finding> {
        let numeric_missing = self.numeric.extract(text).is_none();
        let traditional_missing = self.traditional.extract(text).is_none();
        debug!(
            "Amount formats: numeric_missing={}, traditional_missing={}",
            numeric_missing, traditional_missing
        );

        if numeric_missing || traditional_missing {
            vec![Finding::AmountFormatMissing {
                numeric_missing,
                traditional_missing,
            }]
        } else {
            Vec::new()
        }
    }
}

/// Extractor for one labeled amount (應稅金額, 稅額 or 總金額).
#[derive(Debug, Clone, Copy)]
pub struct LabeledAmountExtractor {
    field: AmountField,
}

impl LabeledAmountExtractor {
    pub fn new(field: AmountField) -> Self {
        Self { field }
    }

    pub fn field(&self) -> AmountField {
        self.field
    }

    fn pattern(&self) -> &'static regex::Regex {
        match self.field {
            AmountField::TaxableAmount => &*TAXABLE_AMOUNT,
            AmountField::Tax => &*TAX_AMOUNT,
            AmountField::Total => &*TOTAL_AMOUNT,
        }
    }

    fn to_match(caps: &regex::Captures<'_>) -> Option<ExtractionMatch<Decimal>> {
        let full = caps.get(0)?;
        let amount = parse_amount(&caps[1])?;
        Some(
            ExtractionMatch::new(amount, full.as_str())
                .with_position(full.start(), full.end()),
        )
    }
}

impl FieldExtractor for LabeledAmountExtractor {
    type Output = ExtractionMatch<Decimal>;

    /// Only the first labeled occurrence is considered; if it does not parse
    /// the field counts as missing.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.pattern()
            .captures(text)
            .and_then(|caps| Self::to_match(&caps))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern()
            .captures_iter(text)
            .filter_map(|caps| Self::to_match(&caps))
            .collect()
    }
}

/// The three labeled amounts of an invoice.
#[derive(Debug, Clone, Default)]
pub struct TaxAmounts {
    /// 應稅金額
    pub taxable: Option<ExtractionMatch<Decimal>>,
    /// 稅額
    pub tax: Option<ExtractionMatch<Decimal>>,
    /// 總金額
    pub total: Option<ExtractionMatch<Decimal>>,
}

impl TaxAmounts {
    pub fn get(&self, field: AmountField) -> Option<Decimal> {
        let found = match field {
            AmountField::TaxableAmount => &self.taxable,
            AmountField::Tax => &self.tax,
            AmountField::Total => &self.total,
        };
        found.as_ref().map(|m| m.value)
    }

    /// Fields that were not found or did not parse, in label order.
    pub fn missing(&self) -> Vec<AmountField> {
        AmountField::ALL
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    /// All three values, if present.
    pub fn complete(&self) -> Option<(Decimal, Decimal, Decimal)> {
        Some((
            self.get(AmountField::TaxableAmount)?,
            self.get(AmountField::Tax)?,
            self.get(AmountField::Total)?,
        ))
    }
}

/// Extract the labeled taxable amount, tax and total from invoice text.
pub fn extract_tax_amounts(text: &str) -> TaxAmounts {
    TaxAmounts {
        taxable: LabeledAmountExtractor::new(AmountField::TaxableAmount).extract(text),
        tax: LabeledAmountExtractor::new(AmountField::Tax).extract(text),
        total: LabeledAmountExtractor::new(AmountField::Total).extract(text),
    }
}

/// Parse an amount written with optional `,` thousand separators.
///
/// Digits of any script are accepted (`１,０００` parses as 1000). Amounts
/// beyond the 28 significant digits of `Decimal` do not parse.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let digits = s
        .chars()
        .filter(|c| *c != ',')
        .map(|c| digit_value(c).and_then(|d| char::from_digit(d, 10)))
        .collect::<Option<String>>()?;
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Value of a decimal digit in any script.
///
/// Unicode decimal digits sit in contiguous runs made of whole 0-9 blocks,
/// so the value is the offset from the start of the run, modulo ten.
fn digit_value(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    if !is_decimal_digit(c) {
        return None;
    }

    let mut offset = 0;
    let mut code = c as u32;
    while let Some(prev) = code.checked_sub(1).and_then(char::from_u32) {
        if !is_decimal_digit(prev) {
            break;
        }
        offset += 1;
        code -= 1;
    }
    Some(offset % 10)
}

fn is_decimal_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DECIMAL_DIGIT.is_match(c.encode_utf8(&mut buf))
}
