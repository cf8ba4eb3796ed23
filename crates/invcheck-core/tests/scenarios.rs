//! End-to-end validation of invoice texts.

use invcheck_core::{
    Finding, FindingKind, InvoiceValidator, Locale, RecognizedText, RuleConfig, RuleValidator,
    TaxRounding, TextBox, TextExtractor, TextRecognizer,
};
use image::DynamicImage;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

const ISSUER: &str = "伸太田工業股份有限公司";

fn invoice(issuer: &str, tax_id: &str, taxable: &str, tax: &str, total: &str) -> RecognizedText {
    let mut lines = vec![
        issuer.to_string(),
        format!("統一編號 {}", tax_id),
        "NT$1,000".to_string(),
        "壹仟元".to_string(),
    ];
    if !taxable.is_empty() {
        lines.push(format!("應稅金額NT${}", taxable));
    }
    if !tax.is_empty() {
        lines.push(format!("稅額NT${}", tax));
    }
    if !total.is_empty() {
        lines.push(format!("總金額NT${}", total));
    }
    RecognizedText::from_fragments(lines)
}

fn scenario_a() -> RecognizedText {
    invoice(ISSUER, "55854972", "1000", "50", "1050")
}

#[test]
fn scenario_a_valid_invoice_passes() {
    let report = RuleValidator::new().report(&scenario_a());
    assert!(report.is_success(), "unexpected findings: {:?}", report);
}

#[test]
fn scenario_b_wrong_tax_reports_tax_and_total() {
    let text = invoice(ISSUER, "55854972", "1000", "60", "1050");
    let report = RuleValidator::new().report(&text);

    assert_eq!(
        report.messages(Locale::En),
        vec![
            "TaxMismatch: expected NT$50, got NT$60".to_string(),
            "TotalMismatch: expected NT$1060, got NT$1050".to_string(),
        ]
    );
}

#[test]
fn scenario_c_missing_tax_id() {
    let text = RecognizedText::from_fragments([
        ISSUER,
        "NT$1,000",
        "壹仟元",
        "應稅金額NT$1000",
        "稅額NT$50",
        "總金額NT$1050",
    ]);
    let report = RuleValidator::new().report(&text);

    assert_eq!(
        report.findings(),
        &[Finding::TaxIdMismatch {
            expected: "55854972".to_string(),
            found: None,
        }]
    );
}

#[test]
fn scenario_d_unknown_issuer() {
    let text = invoice("某某公司", "55854972", "1000", "50", "1050");
    let report = RuleValidator::new().report(&text);
    assert_eq!(report.kinds(), vec![FindingKind::IssuerMismatch]);
}

#[test]
fn validation_is_deterministic() {
    let text = invoice("某某公司", "12345678", "1000", "60", "");
    let validator = RuleValidator::new();

    let first = validator.report(&text).messages(Locale::En);
    for _ in 0..10 {
        assert_eq!(validator.report(&text).messages(Locale::En), first);
    }
}

#[test]
fn removing_issuer_changes_only_issuer_outcome() {
    let texts = [
        (invoice(ISSUER, "55854972", "1000", "60", "1050"), invoice("", "55854972", "1000", "60", "1050")),
        (invoice(ISSUER, "11111111", "1000", "50", ""), invoice("", "11111111", "1000", "50", "")),
    ];
    let validator = RuleValidator::new();

    for (with_issuer, without_issuer) in texts {
        let with = validator.report(&with_issuer);
        let without = validator.report(&without_issuer);

        assert!(!with.contains(FindingKind::IssuerMismatch));
        assert_eq!(without.findings()[0], Finding::IssuerMismatch);
        assert_eq!(&without.findings()[1..], with.findings());
    }
}

#[test]
fn rounding_boundary_is_pinned() {
    let text = invoice(ISSUER, "55854972", "10", "1", "11");

    let half_up = RuleValidator::new().report(&text);
    assert!(half_up.is_success());

    let rules = RuleConfig {
        rounding: TaxRounding::HalfEven,
        ..RuleConfig::default()
    };
    let half_even = RuleValidator::from_config(&rules).report(&text);
    assert_eq!(
        half_even.findings(),
        &[Finding::TaxMismatch {
            expected: Decimal::ZERO,
            actual: Decimal::ONE,
        }]
    );
}

#[test]
fn correct_tax_wrong_total_is_one_finding() {
    let text = invoice(ISSUER, "55854972", "1000", "50", "1060");
    let report = RuleValidator::new().report(&text);
    assert_eq!(report.kinds(), vec![FindingKind::TotalMismatch]);
}

#[test]
fn missing_total_reports_only_incomplete() {
    let text = invoice(ISSUER, "55854972", "1000", "70", "");
    let report = RuleValidator::new().report(&text);

    assert_eq!(report.kinds(), vec![FindingKind::IncompleteTaxInfo]);
    assert!(!report.contains(FindingKind::TaxMismatch));
    assert!(!report.contains(FindingKind::TotalMismatch));
}

#[test]
fn findings_follow_rule_order() {
    let text = RecognizedText::from_fragments(["某某公司", "12345678", "應稅金額NT$1000"]);
    let report = RuleValidator::new().report(&text);

    assert_eq!(
        report.kinds(),
        vec![
            FindingKind::IssuerMismatch,
            FindingKind::TaxIdMismatch,
            FindingKind::AmountFormatMissing,
            FindingKind::IncompleteTaxInfo,
        ]
    );
}

struct ScannedInvoice;

impl TextRecognizer for ScannedInvoice {
    fn recognize(&self, _image: &DynamicImage) -> Result<Vec<TextBox>, invcheck_core::OcrError> {
        let region = |text: &str| TextBox::new([0.0; 8], text, 0.95);
        Ok(vec![
            region(ISSUER),
            region("55854972"),
            region("NT$1,000"),
            region("壹仟元"),
            region("應稅金額NT$1000"),
            region("稅額NT$50"),
            region("總金額NT$1050"),
        ])
    }
}

#[test]
fn extracted_text_feeds_validator() {
    let extractor = TextExtractor::new(ScannedInvoice);
    let text = extractor.extract_text(&DynamicImage::new_rgb8(8, 8)).unwrap();

    assert_eq!(text.lines().count(), 7);
    assert!(RuleValidator::new().report(&text).is_success());
}

#[test]
fn full_width_amounts_pass() {
    let text = RecognizedText::from_fragments([
        ISSUER,
        "55854972",
        "NT$１,０００",
        "壹仟元",
        "應稅金額NT$１０００",
        "稅額NT$５０",
        "總金額NT$１０５０",
    ]);

    let report = RuleValidator::new().report(&text);
    assert!(report.is_success(), "unexpected findings: {:?}", report);
}

#[test]
fn full_width_wrong_tax_is_reported() {
    let text = RecognizedText::from_fragments([
        ISSUER,
        "55854972",
        "NT$１,０００",
        "壹仟元",
        "應稅金額NT$１０００",
        "稅額NT$６０",
        "總金額NT$１０６０",
    ]);

    let report = RuleValidator::new().report(&text);
    assert_eq!(
        report.messages(Locale::En),
        vec!["TaxMismatch: expected NT$50, got NT$60".to_string()]
    );
}

#[test]
fn legacy_half_even_rounding() {
    // 50 × 5% = 2.5
    let text = invoice(ISSUER, "55854972", "50", "2", "52");

    let half_up = RuleValidator::new().report(&text);
    assert_eq!(half_up.kinds(), vec![FindingKind::TaxMismatch]);

    let half_even = RuleValidator::new()
        .with_rounding(TaxRounding::HalfEven)
        .report(&text);
    assert!(half_even.is_success(), "unexpected findings: {:?}", half_even);
}
