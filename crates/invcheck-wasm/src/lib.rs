//! WASM bindings for scanned invoice checking.
//!
//! OCR runs on the JavaScript side; the recognized text is validated here.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use invcheck_core::{
    ExtractedFields, Finding, InvoiceValidator, Locale, RecognizedText, RuleConfig, RuleValidator,
    TaxRounding, ValidationResult,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Validate recognized invoice text with the default rules.
#[wasm_bindgen]
pub fn validate_invoice_text(text: &str) -> Result<JsValue, JsValue> {
    InvoiceChecker::new().validate(text)
}

/// Messages for recognized invoice text, empty when every check passes.
#[wasm_bindgen]
pub fn invoice_messages(text: &str, locale: &str) -> Result<Vec<String>, JsValue> {
    let locale: Locale = locale.parse().map_err(|e: String| JsValue::from_str(&e))?;
    let report = RuleValidator::new().report(&RecognizedText::from(text));
    Ok(report.messages(locale))
}

#[derive(Serialize)]
struct CheckOutput {
    success: bool,
    messages: Vec<String>,
    findings: Vec<Finding>,
    fields: ExtractedFields,
    text: String,
}

impl CheckOutput {
    fn new(result: ValidationResult, locale: Locale) -> Self {
        Self {
            success: result.is_success(),
            messages: result.report.messages(locale),
            findings: result.report.findings().to_vec(),
            fields: result.fields,
            text: result.text.into_string(),
        }
    }
}

/// Configurable invoice checker for browser use.
#[wasm_bindgen]
pub struct InvoiceChecker {
    rules: RuleConfig,
    locale: Locale,
}

#[wasm_bindgen]
impl InvoiceChecker {
    /// Create a checker with the default rules.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            rules: RuleConfig::default(),
            locale: Locale::default(),
        }
    }

    /// Replace the accepted issuer names.
    #[wasm_bindgen]
    pub fn set_issuers(&mut self, names: js_sys::Array) -> Result<(), JsValue> {
        let names: Vec<String> = names.iter().filter_map(|v| v.as_string()).collect();
        self.update(|rules| rules.issuer_names = names)
    }

    /// Set the expected 8-digit tax identifier.
    #[wasm_bindgen]
    pub fn set_tax_id(&mut self, tax_id: &str) -> Result<(), JsValue> {
        let tax_id = tax_id.to_string();
        self.update(|rules| rules.tax_id = tax_id)
    }

    /// Set the rounding of the expected tax ("half_up" or "half_even").
    #[wasm_bindgen]
    pub fn set_rounding(&mut self, rounding: &str) -> Result<(), JsValue> {
        let rounding: TaxRounding = rounding.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.update(|rules| rules.rounding = rounding)
    }

    /// Only accept a tax identifier following a tax id label.
    #[wasm_bindgen]
    pub fn set_label_anchored(&mut self, anchored: bool) {
        self.rules.tax_id_label_anchored = anchored;
    }

    /// Set the message language ("en" or "zh-tw").
    #[wasm_bindgen]
    pub fn set_locale(&mut self, locale: &str) -> Result<(), JsValue> {
        self.locale = locale.parse().map_err(|e: String| JsValue::from_str(&e))?;
        Ok(())
    }

    /// Validate text and return the result with extracted fields.
    #[wasm_bindgen]
    pub fn validate(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = self.run(text);
        serde_wasm_bindgen::to_value(&CheckOutput::new(result, self.locale))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Validate text and return the result as a JSON string.
    #[wasm_bindgen]
    pub fn validate_json(&self, text: &str) -> Result<String, JsValue> {
        let result = self.run(text);
        serde_json::to_string(&CheckOutput::new(result, self.locale))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Validate text and return only the messages.
    #[wasm_bindgen]
    pub fn messages(&self, text: &str) -> Vec<String> {
        self.run(text).report.messages(self.locale)
    }
}

impl InvoiceChecker {
    fn run(&self, text: &str) -> ValidationResult {
        RuleValidator::from_config(&self.rules).validate(&RecognizedText::from(text))
    }

    fn update(&mut self, change: impl FnOnce(&mut RuleConfig)) -> Result<(), JsValue> {
        let mut rules = self.rules.clone();
        change(&mut rules);
        rules
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.rules = rules;
        Ok(())
    }
}

impl Default for InvoiceChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// OCR result from browser-side processing.
#[wasm_bindgen]
pub struct OcrResultJs {
    fragments: Vec<String>,
}

#[wasm_bindgen]
impl OcrResultJs {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Add one recognized region, in reading order.
    #[wasm_bindgen]
    pub fn add_fragment(&mut self, text: &str) {
        self.fragments.push(text.to_string());
    }

    /// Get the joined text.
    #[wasm_bindgen]
    pub fn get_text(&self) -> String {
        RecognizedText::from_fragments(self.fragments.iter().map(String::as_str)).into_string()
    }

    /// Validate the joined text with the given checker.
    #[wasm_bindgen]
    pub fn check(&self, checker: &InvoiceChecker) -> Result<JsValue, JsValue> {
        checker.validate(&self.get_text())
    }
}

impl Default for OcrResultJs {
    fn default() -> Self {
        Self::new()
    }
}
