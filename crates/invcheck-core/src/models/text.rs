//! Recognized text handed from OCR to the validator.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Newline-joined text of every region recognized in one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecognizedText(String);

impl RecognizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Join fragments with `\n`, keeping their order.
    pub fn from_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        for (i, fragment) in fragments.into_iter().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            text.push_str(fragment.as_ref());
        }
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for RecognizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RecognizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecognizedText {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for RecognizedText {
    fn from(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl fmt::Display for RecognizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fragments_keeps_order() {
        let text = RecognizedText::from_fragments(["統一發票", "NT$1,000", "壹仟元"]);
        assert_eq!(text.as_str(), "統一發票\nNT$1,000\n壹仟元");
    }

    #[test]
    fn test_from_no_fragments_is_empty() {
        let text = RecognizedText::from_fragments(Vec::<String>::new());
        assert!(text.is_empty());
    }
}
