//! Rule-based field extractors and checks for Taiwanese invoices.

pub mod amounts;
pub mod issuer;
pub mod patterns;
pub mod tax;
pub mod tax_id;

pub use amounts::{
    extract_tax_amounts, parse_amount, LabeledAmountExtractor, NumericAmountExtractor,
    TaxAmounts, TraditionalAmountExtractor,
};
pub use issuer::IssuerMatcher;
pub use tax::{check_tax_arithmetic, expected_tax, TaxCalculator};
pub use tax_id::{extract_tax_id, TaxIdExtractor};

use crate::models::report::Finding;
use crate::models::text::RecognizedText;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field, in text order.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A single business rule evaluated against recognized text.
///
/// Rules are pure and independent of each other; the validator runs every
/// rule regardless of what earlier rules reported.
pub trait ValidationRule: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Findings for this rule, empty when the rule passes.
    fn evaluate(&self, text: &RecognizedText) -> Vec<Finding>;
}

/// Extracted value with the text it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
