//! Text extractor turning recognizer output into recognized text.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::{CheckError, OcrError};
use crate::models::config::OcrConfig;
use crate::models::text::RecognizedText;

use super::{OcrResult, TextBox, TextRecognizer};

/// Token emitted by the recognizer for characters outside its dictionary.
const UNK_TOKEN: &str = "[UNK]";

/// Runs a recognizer once per image and joins the region texts with newlines.
pub struct TextExtractor<R: TextRecognizer> {
    recognizer: R,
    config: OcrConfig,
}

impl<R: TextRecognizer> TextExtractor<R> {
    /// Create an extractor with the default configuration.
    pub fn new(recognizer: R) -> Self {
        Self {
            recognizer,
            config: OcrConfig::default(),
        }
    }

    /// Set configuration.
    pub fn with_config(mut self, config: OcrConfig) -> Self {
        self.config = config;
        self
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    /// Recognize an image and build the joined text.
    pub fn process(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        info!("Processing image: {}x{}", width, height);

        let regions = self.recognizer.recognize(image)?;
        let recognized = regions.len();

        let boxes: Vec<TextBox> = regions
            .into_iter()
            .filter(|b| b.confidence >= self.config.min_confidence)
            .map(|mut b| {
                if !self.config.keep_unk {
                    b.text = b.text.replace(UNK_TOKEN, " ");
                }
                b
            })
            .collect();

        if boxes.len() < recognized {
            debug!(
                "Dropped {} regions below confidence {}",
                recognized - boxes.len(),
                self.config.min_confidence
            );
        }

        let text = RecognizedText::from_fragments(boxes.iter().map(|b| b.text.as_str()));
        let mut result = OcrResult {
            boxes,
            text,
            processing_time_ms: 0,
            image_size: (width, height),
        };

        if self.config.sort_reading_order {
            result.sort_by_reading_order();
        }

        result.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "OCR complete: {} text boxes in {}ms",
            result.boxes.len(),
            result.processing_time_ms
        );

        Ok(result)
    }

    /// Convenience: extract text only.
    pub fn extract_text(&self, image: &DynamicImage) -> Result<RecognizedText, OcrError> {
        Ok(self.process(image)?.text)
    }

    /// Load an image file and process it.
    pub fn process_path(&self, path: &Path) -> Result<OcrResult, CheckError> {
        let image = image::open(path)?;
        debug!("Loaded image {}", path.display());
        Ok(self.process(&image)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FixedRecognizer(Vec<TextBox>);

    impl TextRecognizer for FixedRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> Result<Vec<TextBox>, OcrError> {
            Ok(self.0.clone())
        }
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn recognize(&self, _image: &DynamicImage) -> Result<Vec<TextBox>, OcrError> {
            Err(OcrError::Recognition("model crashed".to_string()))
        }
    }

    fn region(y: f32, text: &str, confidence: f32) -> TextBox {
        TextBox::new([0.0, y, 10.0, y, 10.0, y + 10.0, 0.0, y + 10.0], text, confidence)
    }

    fn image() -> DynamicImage {
        DynamicImage::new_rgb8(4, 4)
    }

    #[test]
    fn test_keeps_recognizer_order() {
        let extractor = TextExtractor::new(FixedRecognizer(vec![
            region(100.0, "總金額NT$1050", 0.9),
            region(0.0, "伸太田工業股份有限公司", 0.8),
        ]));

        let result = extractor.process(&image()).unwrap();
        assert_eq!(result.text.as_str(), "總金額NT$1050\n伸太田工業股份有限公司");
        assert_eq!(result.image_size, (4, 4));
    }

    #[test]
    fn test_optional_reading_order() {
        let config = OcrConfig {
            sort_reading_order: true,
            ..OcrConfig::default()
        };
        let extractor = TextExtractor::new(FixedRecognizer(vec![
            region(100.0, "second", 0.9),
            region(0.0, "first", 0.9),
        ]))
        .with_config(config);

        assert_eq!(extractor.extract_text(&image()).unwrap().as_str(), "first\nsecond");
    }

    #[test]
    fn test_unk_tokens_and_confidence_filter() {
        let config = OcrConfig {
            min_confidence: 0.5,
            ..OcrConfig::default()
        };
        let extractor = TextExtractor::new(FixedRecognizer(vec![
            region(0.0, "統一[UNK]編號", 0.9),
            region(10.0, "noise", 0.1),
        ]))
        .with_config(config);

        assert_eq!(extractor.extract_text(&image()).unwrap().as_str(), "統一 編號");

        let keep = OcrConfig {
            keep_unk: true,
            ..OcrConfig::default()
        };
        let extractor = TextExtractor::new(FixedRecognizer(vec![region(0.0, "統一[UNK]編號", 0.9)]))
            .with_config(keep);
        assert_eq!(extractor.extract_text(&image()).unwrap().as_str(), "統一[UNK]編號");
    }

    #[test]
    fn test_no_regions_is_empty_text() {
        let extractor = TextExtractor::new(FixedRecognizer(Vec::new()));
        assert!(extractor.extract_text(&image()).unwrap().is_empty());
    }

    #[test]
    fn test_recognizer_error_propagates() {
        let extractor = TextExtractor::new(FailingRecognizer);
        assert!(matches!(
            extractor.process(&image()),
            Err(OcrError::Recognition(_))
        ));
    }

    #[test]
    fn test_empty_image_rejected() {
        let extractor = TextExtractor::new(FixedRecognizer(Vec::new()));
        assert!(matches!(
            extractor.process(&DynamicImage::new_rgb8(0, 0)),
            Err(OcrError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_process_path_missing_file() {
        let extractor = TextExtractor::new(FixedRecognizer(Vec::new()));
        assert!(extractor.process_path(Path::new("/nonexistent/invoice.png")).is_err());
    }
}
