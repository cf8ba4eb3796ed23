//! Core library for scanned invoice checking.
//!
//! This crate provides:
//! - An OCR seam ([`TextRecognizer`]) and a text extractor joining region texts
//! - A `pure-onnx-ocr` backed recognizer (feature `native`)
//! - Field extractors for issuer name, tax identifier and amounts
//! - Validation of issuer, tax id, amount formats and tax arithmetic

pub mod error;
pub mod invoice;
pub mod models;
pub mod ocr;

pub use error::{CheckError, ConfigError, OcrError, Result};
pub use invoice::{
    validate_text, ExtractedFields, InvoiceValidator, RuleValidator, ValidationResult,
};
pub use models::config::{InvcheckConfig, RuleConfig, TaxRounding};
pub use models::report::{AmountField, Finding, FindingKind, Locale, ValidationReport};
pub use models::text::RecognizedText;
pub use ocr::{OcrResult, TextBox, TextExtractor, TextRecognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
