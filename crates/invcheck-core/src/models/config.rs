//! Configuration structures for OCR and invoice checking.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::report::Locale;

/// Issuer names accepted when no configuration overrides them.
pub const DEFAULT_ISSUER_NAMES: [&str; 2] = ["伸太田工業股份有限公司", "伸太田工業(股)公司"];

/// Tax identifier expected when no configuration overrides it.
pub const DEFAULT_TAX_ID: &str = "55854972";

/// Main configuration for the invcheck pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvcheckConfig {
    /// Business rules applied to recognized text.
    pub rules: RuleConfig,

    /// OCR post-processing configuration.
    pub ocr: OcrConfig,

    /// Model configuration.
    pub models: ModelConfig,

    /// Report presentation.
    pub output: OutputConfig,
}

/// Rounding applied when computing the expected tax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRounding {
    /// Halves round away from zero (0.5 -> 1).
    #[default]
    HalfUp,
    /// Halves round to the nearest even integer (0.5 -> 0, 1.5 -> 2).
    HalfEven,
}

impl TaxRounding {
    /// The `rust_decimal` strategy implementing this policy.
    pub fn strategy(self) -> RoundingStrategy {
        match self {
            TaxRounding::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            TaxRounding::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaxRounding::HalfUp => "half_up",
            TaxRounding::HalfEven => "half_even",
        }
    }
}

impl FromStr for TaxRounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "half_up" | "up" => Ok(TaxRounding::HalfUp),
            "half_even" | "even" | "bankers" => Ok(TaxRounding::HalfEven),
            other => Err(format!(
                "unknown rounding '{}', expected half_up or half_even",
                other
            )),
        }
    }
}

/// Invoice business rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Accepted issuer names, matched as exact substrings.
    pub issuer_names: Vec<String>,

    /// Expected 8-digit tax identifier.
    pub tax_id: String,

    /// Tax rate applied to the taxable amount (0.05 = 5%).
    pub tax_rate: Decimal,

    /// Rounding policy for the expected tax.
    pub rounding: TaxRounding,

    /// Only accept a tax identifier that follows a tax id label.
    ///
    /// When false the first 8-digit run anywhere in the text is used, even if
    /// it is a date or an invoice number.
    pub tax_id_label_anchored: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            issuer_names: DEFAULT_ISSUER_NAMES.iter().map(|s| s.to_string()).collect(),
            tax_id: DEFAULT_TAX_ID.to_string(),
            tax_rate: Decimal::new(5, 2),
            rounding: TaxRounding::HalfUp,
            tax_id_label_anchored: false,
        }
    }
}

impl RuleConfig {
    /// Check that the rules can be applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer_names.is_empty() {
            return Err(ConfigError::invalid(
                "rules.issuer_names",
                "at least one issuer name is required",
            ));
        }

        if self.issuer_names.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "rules.issuer_names",
                "issuer names must not be blank",
            ));
        }

        if self.tax_id.len() != 8 || !self.tax_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::invalid(
                "rules.tax_id",
                format!("'{}' is not 8 ASCII digits", self.tax_id),
            ));
        }

        if self.tax_rate < Decimal::ZERO || self.tax_rate > Decimal::ONE {
            return Err(ConfigError::invalid(
                "rules.tax_rate",
                format!("{} is outside 0..=1", self.tax_rate),
            ));
        }

        Ok(())
    }
}

/// OCR post-processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Regions recognized below this confidence are dropped (0.0 keeps all).
    pub min_confidence: f32,

    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Re-sort regions top-to-bottom, left-to-right instead of keeping the
    /// recognizer's order.
    pub sort_reading_order: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            keep_unk: false,
            sort_reading_order: false,
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name (Traditional Chinese + Latin).
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl ModelConfig {
    /// Full path to a file in the model directory.
    pub fn path(&self, file_name: &str) -> PathBuf {
        self.model_dir.join(file_name)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "chinese_cht_rec.onnx".to_string(),
            dictionary: "chinese_cht_dict.txt".to_string(),
        }
    }
}

/// Report presentation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Language of finding messages.
    pub locale: Locale,
}

impl InvcheckConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()?;

        if !(0.0..=1.0).contains(&self.ocr.min_confidence) {
            return Err(ConfigError::invalid(
                "ocr.min_confidence",
                format!("{} is outside 0.0..=1.0", self.ocr.min_confidence),
            ));
        }

        Ok(())
    }
}
