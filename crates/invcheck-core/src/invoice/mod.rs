//! Invoice field extraction and cross-validation.

pub mod rules;
mod validator;

pub use validator::{
    validate_text, ExtractedFields, InvoiceValidator, RuleValidator, ValidationResult,
};
