//! Tax identifier (統一編號) extraction and checking.

use tracing::debug;

use crate::models::report::Finding;
use crate::models::text::RecognizedText;

use super::patterns::{TAX_ID_LABELED, TAX_ID_RUN};
use super::{ExtractionMatch, FieldExtractor, ValidationRule};

/// Tax identifier extractor and check.
///
/// Unanchored mode takes the first run of exactly eight digits anywhere in
/// the text. An invoice number or a date printed before the real identifier
/// is picked up instead; anchored mode requires a tax id label in front.
#[derive(Debug, Clone)]
pub struct TaxIdExtractor {
    expected: String,
    label_anchored: bool,
}

impl TaxIdExtractor {
    /// Create an extractor checking for the given identifier.
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            label_anchored: false,
        }
    }

    /// Only accept identifiers that follow a tax id label.
    pub fn with_label_anchoring(mut self, anchored: bool) -> Self {
        self.label_anchored = anchored;
        self
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn label_anchored(&self) -> bool {
        self.label_anchored
    }
}

impl FieldExtractor for TaxIdExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let pattern = if self.label_anchored {
            &*TAX_ID_LABELED
        } else {
            &*TAX_ID_RUN
        };

        pattern.captures(text).and_then(|caps| {
            let digits = caps.get(1)?;
            Some(
                ExtractionMatch::new(digits.as_str().to_string(), &caps[0])
                    .with_position(digits.start(), digits.end()),
            )
        })
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let pattern = if self.label_anchored {
            &*TAX_ID_LABELED
        } else {
            &*TAX_ID_RUN
        };

        // A run's trailing delimiter is consumed by the match, so restart the
        // search at the end of the digits rather than at the end of the match.
        let mut results = Vec::new();
        let mut offset = 0;
        while offset <= text.len() {
            let Some(caps) = pattern.captures_at(text, offset) else {
                break;
            };
            let Some(digits) = caps.get(1) else {
                break;
            };
            results.push(
                ExtractionMatch::new(digits.as_str().to_string(), &caps[0])
                    .with_position(digits.start(), digits.end()),
            );
            offset = digits.end();
        }

        results
    }
}

impl ValidationRule for TaxIdExtractor {
    fn name(&self) -> &'static str {
        "tax_id"
    }

    fn evaluate(&self, text: &RecognizedText) -> Vec<Finding> {
        let found = self.extract(text).map(|m| m.value);
        debug!("Tax id candidate: {:?}", found);

        match found {
            Some(ref id) if *id == self.expected => Vec::new(),
            found => vec![Finding::TaxIdMismatch {
                expected: self.expected.clone(),
                found,
            }],
        }
    }
}

/// Extract the first 8-digit tax identifier candidate from text.
pub fn extract_tax_id(text: &str) -> Option<String> {
    TaxIdExtractor::new(String::new()).extract(text).map(|m| m.value)
}
