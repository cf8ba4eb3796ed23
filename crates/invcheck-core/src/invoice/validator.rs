//! Invoice validator running every rule over recognized text.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::config::{RuleConfig, TaxRounding};
use crate::models::report::ValidationReport;
use crate::models::text::RecognizedText;

use super::rules::{
    amounts::AmountFormatRule, extract_tax_amounts, FieldExtractor, IssuerMatcher,
    NumericAmountExtractor, TaxCalculator, TaxIdExtractor, TraditionalAmountExtractor,
    ValidationRule,
};

/// Values the rules read from the text, for display next to the report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// First accepted issuer name found.
    pub issuer: Option<String>,
    /// First tax identifier candidate.
    pub tax_id: Option<String>,
    /// First currency-prefixed amount.
    pub numeric_amount: Option<String>,
    /// First traditional numeral amount.
    pub traditional_amount: Option<String>,
    /// 應稅金額
    pub taxable_amount: Option<Decimal>,
    /// 稅額
    pub tax_amount: Option<Decimal>,
    /// 總金額
    pub total_amount: Option<Decimal>,
}

/// Result of validating one invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Findings in rule order.
    pub report: ValidationReport,
    /// Extracted field values.
    pub fields: ExtractedFields,
    /// The text that was validated.
    pub text: RecognizedText,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

impl ValidationResult {
    pub fn is_success(&self) -> bool {
        self.report.is_success()
    }
}

/// Trait for invoice validation.
pub trait InvoiceValidator {
    /// Validate recognized text, returning findings and extracted fields.
    fn validate(&self, text: &RecognizedText) -> ValidationResult;

    /// Findings only.
    fn report(&self, text: &RecognizedText) -> ValidationReport {
        self.validate(text).report
    }
}

/// Validator applying issuer, tax id, amount format and tax arithmetic rules,
/// in that order, without short-circuiting.
#[derive(Debug, Clone)]
pub struct RuleValidator {
    issuer: IssuerMatcher,
    tax_id: TaxIdExtractor,
    amount_format: AmountFormatRule,
    tax: TaxCalculator,
}

impl RuleValidator {
    /// Create a validator with the default rules.
    pub fn new() -> Self {
        Self::from_config(&RuleConfig::default())
    }

    /// Create a validator from rule configuration.
    pub fn from_config(config: &RuleConfig) -> Self {
        Self {
            issuer: IssuerMatcher::new(config.issuer_names.iter().cloned()),
            tax_id: TaxIdExtractor::new(config.tax_id.clone())
                .with_label_anchoring(config.tax_id_label_anchored),
            amount_format: AmountFormatRule::new(),
            tax: TaxCalculator::new(config.tax_rate, config.rounding),
        }
    }

    /// Replace the accepted issuer names.
    pub fn with_issuers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.issuer = IssuerMatcher::new(names);
        self
    }

    /// Set the expected tax identifier.
    pub fn with_tax_id(mut self, tax_id: impl Into<String>) -> Self {
        let anchored = self.tax_id.label_anchored();
        self.tax_id = TaxIdExtractor::new(tax_id).with_label_anchoring(anchored);
        self
    }

    /// Set tax rate and rounding.
    pub fn with_tax_rate(mut self, rate: Decimal, rounding: TaxRounding) -> Self {
        self.tax = TaxCalculator::new(rate, rounding);
        self
    }

    /// Set the rounding policy, keeping the rate.
    pub fn with_rounding(mut self, rounding: TaxRounding) -> Self {
        self.tax = TaxCalculator::new(self.tax.rate(), rounding);
        self
    }

    /// Require a label in front of the tax identifier.
    pub fn with_tax_id_label_anchoring(mut self, anchored: bool) -> Self {
        self.tax_id = self.tax_id.with_label_anchoring(anchored);
        self
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> [&dyn ValidationRule; 4] {
        [&self.issuer, &self.tax_id, &self.amount_format, &self.tax]
    }

    fn extract_fields(&self, text: &str) -> ExtractedFields {
        let amounts = extract_tax_amounts(text);

        ExtractedFields {
            issuer: self.issuer.extract(text).map(|m| m.value),
            tax_id: self.tax_id.extract(text).map(|m| m.value),
            numeric_amount: NumericAmountExtractor::new().extract(text).map(|m| m.value),
            traditional_amount: TraditionalAmountExtractor::new().extract(text).map(|m| m.value),
            taxable_amount: amounts.taxable.map(|m| m.value),
            tax_amount: amounts.tax.map(|m| m.value),
            total_amount: amounts.total.map(|m| m.value),
        }
    }
}

impl Default for RuleValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceValidator for RuleValidator {
    fn validate(&self, text: &RecognizedText) -> ValidationResult {
        let start = start_timer();
        let mut report = ValidationReport::new();

        for rule in self.rules() {
            let findings = rule.evaluate(text);
            debug!("Rule {}: {} finding(s)", rule.name(), findings.len());
            report.extend(findings);
        }

        let fields = self.extract_fields(text);
        let processing_time_ms = start
            .map(|s| s.elapsed().as_millis() as u64)
            .unwrap_or(0);

        info!(
            "Validation complete: {} finding(s) in {}ms",
            report.len(),
            processing_time_ms
        );

        ValidationResult {
            report,
            fields,
            text: text.clone(),
            processing_time_ms,
        }
    }
}

// Instant::now panics on wasm32-unknown-unknown.
#[cfg(not(target_arch = "wasm32"))]
fn start_timer() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn start_timer() -> Option<Instant> {
    None
}

/// Validate text with the given rules.
pub fn validate_text(text: &str, config: &RuleConfig) -> ValidationReport {
    RuleValidator::from_config(config).report(&RecognizedText::from(text))
}
