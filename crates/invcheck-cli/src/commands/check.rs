//! Check command - OCR an invoice image and validate the recognized text.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invcheck_core::{
    InvcheckConfig, InvoiceValidator, OcrResult, PureOcrEngine, RuleValidator, TextExtractor,
};

use super::config::load_config;
use super::validate::{emit_report, ReportArgs, RuleOverrides};

const SUPPORTED_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Arguments for the check command.
#[derive(Args)]
pub struct CheckArgs {
    /// Invoice image (PNG, JPEG, BMP, TIFF or WebP)
    #[arg(required = true)]
    input: PathBuf,

    /// Model directory (overrides models.model_dir)
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    #[command(flatten)]
    report: ReportArgs,

    #[command(flatten)]
    rules: RuleOverrides,
}

pub async fn run(args: CheckArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.rules.apply(&mut config)?;
    if let Some(model_dir) = &args.model_dir {
        config.models.model_dir = model_dir.clone();
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("invalid progress template")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting text...");

    // Model loading and recognition block; keep them off the async runtime.
    let input = args.input.clone();
    let ocr_config = config.clone();
    let ocr = tokio::task::spawn_blocking(move || run_ocr(&input, &ocr_config))
        .await
        .context("OCR task panicked")?;

    let ocr = match ocr {
        Ok(ocr) => ocr,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };
    pb.finish_with_message(format!("Recognized {} text regions", ocr.boxes.len()));

    if ocr.text.trim().is_empty() {
        tracing::warn!("No text recognized in {}", args.input.display());
    }

    let validator = RuleValidator::from_config(&config.rules);
    let result = validator.validate(&ocr.text);

    debug!("Total processing time: {:?}", start.elapsed());

    emit_report(&result, &args.report, config.output.locale)
}

/// Load the OCR engine and recognize one image.
fn run_ocr(input: &Path, config: &InvcheckConfig) -> anyhow::Result<OcrResult> {
    let engine = PureOcrEngine::from_config(&config.models).with_context(|| {
        format!(
            "Failed to load OCR models from {}. Pass --model-dir or set models.model_dir.",
            config.models.model_dir.display()
        )
    })?;

    let extractor = TextExtractor::new(engine).with_config(config.ocr.clone());
    let result = extractor
        .process_path(input)
        .with_context(|| format!("OCR failed for {}", input.display()))?;

    debug!(
        "OCR detected {} text boxes in {}ms",
        result.boxes.len(),
        result.processing_time_ms
    );

    Ok(result)
}
