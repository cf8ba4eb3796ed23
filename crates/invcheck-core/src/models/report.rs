//! Validation findings and the report that collects them.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Language used for finding messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    /// English, `Kind: detail` style.
    #[default]
    #[serde(rename = "en")]
    En,
    /// Traditional Chinese as printed on the invoices.
    #[serde(rename = "zh-tw")]
    ZhTw,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "zh-tw" | "zh-hant" | "zh" => Ok(Locale::ZhTw),
            other => Err(format!("unknown locale '{}', expected en or zh-tw", other)),
        }
    }
}

/// One of the three labeled amounts used by the tax arithmetic check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountField {
    /// 應稅金額
    TaxableAmount,
    /// 稅額
    Tax,
    /// 總金額
    Total,
}

impl AmountField {
    pub const ALL: [AmountField; 3] = [AmountField::TaxableAmount, AmountField::Tax, AmountField::Total];

    /// The label printed on the invoice.
    pub fn label(self) -> &'static str {
        match self {
            AmountField::TaxableAmount => "應稅金額",
            AmountField::Tax => "稅額",
            AmountField::Total => "總金額",
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            AmountField::TaxableAmount => "taxable amount",
            AmountField::Tax => "tax",
            AmountField::Total => "total",
        }
    }
}

/// Machine-readable category of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    IssuerMismatch,
    TaxIdMismatch,
    AmountFormatMissing,
    IncompleteTaxInfo,
    TaxMismatch,
    TotalMismatch,
}

impl FindingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FindingKind::IssuerMismatch => "IssuerMismatch",
            FindingKind::TaxIdMismatch => "TaxIdMismatch",
            FindingKind::AmountFormatMissing => "AmountFormatMissing",
            FindingKind::IncompleteTaxInfo => "IncompleteTaxInfo",
            FindingKind::TaxMismatch => "TaxMismatch",
            FindingKind::TotalMismatch => "TotalMismatch",
        }
    }
}

impl fmt::Display for FindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Finding {
    /// None of the accepted issuer names occurs in the text.
    IssuerMismatch,

    /// The first 8-digit run is missing or differs from the expected id.
    TaxIdMismatch {
        expected: String,
        found: Option<String>,
    },

    /// A numeric or a traditional numeral amount is absent.
    AmountFormatMissing {
        numeric_missing: bool,
        traditional_missing: bool,
    },

    /// At least one labeled amount is missing or unparsable.
    IncompleteTaxInfo { missing: Vec<AmountField> },

    /// Extracted tax differs from the rate applied to the taxable amount.
    TaxMismatch { expected: Decimal, actual: Decimal },

    /// Extracted total differs from taxable amount plus extracted tax.
    TotalMismatch { expected: Decimal, actual: Decimal },
}

impl Finding {
    pub fn kind(&self) -> FindingKind {
        match self {
            Finding::IssuerMismatch => FindingKind::IssuerMismatch,
            Finding::TaxIdMismatch { .. } => FindingKind::TaxIdMismatch,
            Finding::AmountFormatMissing { .. } => FindingKind::AmountFormatMissing,
            Finding::IncompleteTaxInfo { .. } => FindingKind::IncompleteTaxInfo,
            Finding::TaxMismatch { .. } => FindingKind::TaxMismatch,
            Finding::TotalMismatch { .. } => FindingKind::TotalMismatch,
        }
    }

    /// Human-readable message in the given language.
    pub fn message(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.message_en(),
            Locale::ZhTw => self.message_zh_tw(),
        }
    }

    fn message_en(&self) -> String {
        let kind = self.kind();
        match self {
            Finding::IssuerMismatch => format!("{}: no accepted issuer name found", kind),
            Finding::TaxIdMismatch {
                expected,
                found: Some(found),
            } => format!("{}: expected {}, got {}", kind, expected, found),
            Finding::TaxIdMismatch {
                expected,
                found: None,
            } => format!("{}: expected {}, no 8-digit number found", kind, expected),
            Finding::AmountFormatMissing {
                numeric_missing,
                traditional_missing,
            } => {
                let missing = match (numeric_missing, traditional_missing) {
                    (true, true) => "numeric (NT$) and traditional numeral amounts",
                    (true, false) => "numeric (NT$) amount",
                    _ => "traditional numeral amount",
                };
                format!("{}: missing {}", kind, missing)
            }
            Finding::IncompleteTaxInfo { missing } => {
                let fields = missing
                    .iter()
                    .map(|f| format!("{} ({})", f.label(), f.english_name()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{}: missing {}", kind, fields)
            }
            Finding::TaxMismatch { expected, actual } | Finding::TotalMismatch { expected, actual } => {
                format!("{}: expected NT${}, got NT${}", kind, expected, actual)
            }
        }
    }

    fn message_zh_tw(&self) -> String {
        match self {
            Finding::IssuerMismatch => "抬頭錯誤：未找到合法公司名稱".to_string(),
            Finding::TaxIdMismatch { expected, .. } => {
                format!("統一編號錯誤：應為「{}」", expected)
            }
            Finding::AmountFormatMissing { .. } => "金額格式錯誤：未找到數字或大寫金額".to_string(),
            Finding::IncompleteTaxInfo { .. } => {
                "未找到完整稅額資訊（應稅金額 / 稅額 / 總金額）".to_string()
            }
            Finding::TaxMismatch { expected, actual } => {
                format!("稅額錯誤：應為 NT${}，實際為 NT${}", expected, actual)
            }
            Finding::TotalMismatch { expected, actual } => {
                format!("總金額錯誤：應為 NT${}，實際為 NT${}", expected, actual)
            }
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message_en())
    }
}

/// Ordered findings of one validation run. Empty means every check passed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// True when no rule failed.
    pub fn is_success(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }

    /// Finding kinds in report order.
    pub fn kinds(&self) -> Vec<FindingKind> {
        self.findings.iter().map(Finding::kind).collect()
    }

    /// Whether a finding of the given kind was reported.
    pub fn contains(&self, kind: FindingKind) -> bool {
        self.findings.iter().any(|f| f.kind() == kind)
    }

    /// Messages in report order.
    pub fn messages(&self, locale: Locale) -> Vec<String> {
        self.findings.iter().map(|f| f.message(locale)).collect()
    }
}

impl Extend<Finding> for ValidationReport {
    fn extend<I: IntoIterator<Item = Finding>>(&mut self, iter: I) {
        self.findings.extend(iter);
    }
}

impl IntoIterator for ValidationReport {
    type Item = Finding;
    type IntoIter = std::vec::IntoIter<Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationReport {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mismatch_messages() {
        let tax = Finding::TaxMismatch {
            expected: Decimal::from(50),
            actual: Decimal::from(60),
        };
        assert_eq!(tax.to_string(), "TaxMismatch: expected NT$50, got NT$60");
        assert_eq!(tax.message(Locale::ZhTw), "稅額錯誤：應為 NT$50，實際為 NT$60");

        let total = Finding::TotalMismatch {
            expected: Decimal::from(1060),
            actual: Decimal::from(1050),
        };
        assert_eq!(total.to_string(), "TotalMismatch: expected NT$1060, got NT$1050");
    }

    #[test]
    fn test_tax_id_messages() {
        let missing = Finding::TaxIdMismatch {
            expected: "55854972".to_string(),
            found: None,
        };
        assert_eq!(
            missing.to_string(),
            "TaxIdMismatch: expected 55854972, no 8-digit number found"
        );

        let wrong = Finding::TaxIdMismatch {
            expected: "55854972".to_string(),
            found: Some("20240101".to_string()),
        };
        assert_eq!(wrong.to_string(), "TaxIdMismatch: expected 55854972, got 20240101");
        assert_eq!(wrong.message(Locale::ZhTw), "統一編號錯誤：應為「55854972」");
    }

    #[test]
    fn test_incomplete_message_lists_fields() {
        let finding = Finding::IncompleteTaxInfo {
            missing: vec![AmountField::Total],
        };
        assert_eq!(finding.to_string(), "IncompleteTaxInfo: missing 總金額 (total)");
    }

    #[test]
    fn test_finding_serializes_with_kind_tag() {
        let finding = Finding::TaxMismatch {
            expected: Decimal::from(50),
            actual: Decimal::from(60),
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["kind"], "TaxMismatch");
        assert_eq!(json["expected"], "50");
        assert_eq!(json["actual"], "60");
    }

    #[test]
    fn test_report_accessors() {
        let mut report = ValidationReport::new();
        assert!(report.is_success());

        report.push(Finding::IssuerMismatch);
        report.extend([Finding::AmountFormatMissing {
            numeric_missing: true,
            traditional_missing: false,
        }]);

        assert!(!report.is_success());
        assert_eq!(
            report.kinds(),
            vec![FindingKind::IssuerMismatch, FindingKind::AmountFormatMissing]
        );
        assert!(report.contains(FindingKind::AmountFormatMissing));
        assert!(!report.contains(FindingKind::TaxMismatch));
        assert_eq!(
            report.messages(Locale::En)[1],
            "AmountFormatMissing: missing numeric (NT$) amount"
        );
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("en".parse::<Locale>(), Ok(Locale::En));
        assert_eq!("zh_TW".parse::<Locale>(), Ok(Locale::ZhTw));
        assert!("fr".parse::<Locale>().is_err());
    }
}
