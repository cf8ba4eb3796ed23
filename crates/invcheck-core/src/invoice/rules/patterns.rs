//! Regex patterns for Taiwanese uniform invoice fields.
//!
//! `\d` is Unicode-aware, so full-width digits produced by OCR (`１０００`)
//! match like ASCII ones.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Tax identifier (統一編號): a run of exactly 8 digits, not part of a longer number
    pub static ref TAX_ID_RUN: Regex = Regex::new(
        r"(?:^|\D)(\d{8})(?:\D|$)"
    ).unwrap();

    pub static ref TAX_ID_LABELED: Regex = Regex::new(
        r"(?:統一編號|統編|(?i:tax\s*id))[\s:：]*(\d{8})(?:\D|$)"
    ).unwrap();

    // Currency-prefixed numeric amount (NT$1,000)
    pub static ref NUMERIC_AMOUNT: Regex = Regex::new(
        r"NT\$(\d[\d,]*)"
    ).unwrap();

    // A single decimal digit of any script
    pub static ref DECIMAL_DIGIT: Regex = Regex::new(
        r"^\d$"
    ).unwrap();

    // Traditional numeral amount followed by the whole-unit character (壹仟元)
    pub static ref TRADITIONAL_AMOUNT: Regex = Regex::new(
        r"[壹貳參肆伍陸柒捌玖拾佰仟萬億]+元"
    ).unwrap();

    // Labeled amounts
    pub static ref TAXABLE_AMOUNT: Regex = Regex::new(
        r"應稅金額[:：]?\s*NT\$([\d,]+)"
    ).unwrap();

    pub static ref TAX_AMOUNT: Regex = Regex::new(
        r"稅額[:：]?\s*NT\$([\d,]+)"
    ).unwrap();

    pub static ref TOTAL_AMOUNT: Regex = Regex::new(
        r"總金額[:：]?\s*NT\$([\d,]+)"
    ).unwrap();
}
