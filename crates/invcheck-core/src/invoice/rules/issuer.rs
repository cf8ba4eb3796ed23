//! Issuer name (抬頭) matching.

use tracing::debug;

use crate::models::report::Finding;
use crate::models::text::RecognizedText;

use super::{ExtractionMatch, FieldExtractor, ValidationRule};

/// Finds accepted issuer names in recognized text.
///
/// Matching is an exact, case-sensitive substring search. Full-width and
/// half-width variants or extra whitespace are not folded, so OCR noise inside
/// the name is a mismatch.
#[derive(Debug, Clone)]
pub struct IssuerMatcher {
    names: Vec<String>,
}

impl IssuerMatcher {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether any accepted name occurs in the text.
    pub fn matches(&self, text: &str) -> bool {
        self.names
            .iter()
            .any(|name| !name.is_empty() && text.contains(name.as_str()))
    }
}

impl FieldExtractor for IssuerMatcher {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results: Vec<Self::Output> = self
            .names
            .iter()
            .filter(|name| !name.is_empty())
            .flat_map(|name| {
                text.match_indices(name.as_str()).map(|(start, matched)| {
                    ExtractionMatch::new(name.clone(), matched)
                        .with_position(start, start + matched.len())
                })
            })
            .collect();

        results.sort_by_key(|m| m.position);
        results
    }
}

impl ValidationRule for IssuerMatcher {
    fn name(&self) -> &'static str {
        "issuer"
    }

    fn evaluate(&self, text: &RecognizedText) -> Vec<Finding> {
        if self.matches(text) {
            debug!("Issuer name found");
            Vec::new()
        } else {
            debug!("No accepted issuer name among {} candidates", self.names.len());
            vec![Finding::IssuerMismatch]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn matcher() -> IssuerMatcher {
        IssuerMatcher::new(["伸太田工業股份有限公司", "伸太田工業(股)公司"])
    }

    #[test]
    fn test_matches_either_name() {
        assert!(matcher().matches("買受人\n伸太田工業股份有限公司\n"));
        assert!(matcher().matches("伸太田工業(股)公司"));
    }

    #[test]
    fn test_no_fuzzy_matching() {
        // Full-width parentheses are a different string.
        assert!(!matcher().matches("伸太田工業（股）公司"));
        // A stray space from OCR breaks the match.
        assert!(!matcher().matches("伸太田工業 股份有限公司"));
        assert!(!matcher().matches("某某公司"));
    }

    #[test]
    fn test_extract_returns_earliest() {
        let text = "伸太田工業(股)公司 ... 伸太田工業股份有限公司";
        let found = matcher().extract(text).unwrap();
        assert_eq!(found.value, "伸太田工業(股)公司");
        assert_eq!(found.position.map(|(start, _)| start), Some(0));

        assert_eq!(matcher().extract_all(text).len(), 2);
    }

    #[test]
    fn test_evaluate() {
        let rule = matcher();
        assert!(rule.evaluate(&"伸太田工業股份有限公司".into()).is_empty());
        assert_eq!(rule.evaluate(&"".into()), vec![Finding::IssuerMismatch]);
    }
}
