//! Validate command - check already recognized invoice text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use console::style;
use tracing::{debug, info};

use invcheck_core::{
    InvcheckConfig, InvoiceValidator, Locale, RecognizedText, RuleValidator, TaxRounding,
    ValidationResult,
};

use super::config::load_config;

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Text file with recognized invoice text ("-" reads stdin)
    #[arg(required = true)]
    input: String,

    #[command(flatten)]
    pub report: ReportArgs,

    #[command(flatten)]
    pub rules: RuleOverrides,
}

/// Report output options shared by `check` and `validate`.
#[derive(Args)]
pub struct ReportArgs {
    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Do not print the recognized text in text output
    #[arg(long)]
    pub hide_text: bool,

    /// Exit with status 1 when any check fails
    #[arg(long)]
    pub strict: bool,
}

/// Per-invocation overrides of the configured rules.
#[derive(Args)]
pub struct RuleOverrides {
    /// Accepted issuer name (repeatable, replaces the configured list)
    #[arg(long = "issuer")]
    pub issuers: Vec<String>,

    /// Expected 8-digit tax identifier
    #[arg(long)]
    pub tax_id: Option<String>,

    /// Rounding for the expected tax (half_up or half_even)
    #[arg(long)]
    pub rounding: Option<TaxRounding>,

    /// Only accept a tax identifier that follows a tax id label
    #[arg(long)]
    pub anchor_tax_id: bool,

    /// Message language (en or zh-tw)
    #[arg(long)]
    pub locale: Option<Locale>,
}

impl RuleOverrides {
    /// Apply the overrides and re-check the resulting configuration.
    pub fn apply(&self, config: &mut InvcheckConfig) -> anyhow::Result<()> {
        if !self.issuers.is_empty() {
            config.rules.issuer_names = self.issuers.clone();
        }
        if let Some(tax_id) = &self.tax_id {
            config.rules.tax_id = tax_id.clone();
        }
        if let Some(rounding) = self.rounding {
            config.rules.rounding = rounding;
        }
        if self.anchor_tax_id {
            config.rules.tax_id_label_anchored = true;
        }
        if let Some(locale) = self.locale {
            config.output.locale = locale;
        }

        config.validate()?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON output
    Json,
    /// CSV output, one row per finding
    Csv,
}

pub async fn run(args: ValidateArgs, config_path: Option<&str>) -> anyhow::Result<ExitCode> {
    let mut config = load_config(config_path)?;
    args.rules.apply(&mut config)?;

    let text = read_input(&args.input)?;
    info!("Validating {} bytes of text from {}", text.len(), args.input);

    let validator = RuleValidator::from_config(&config.rules);
    let result = validator.validate(&RecognizedText::new(text));

    emit_report(&result, &args.report, config.output.locale)
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    Ok(fs::read_to_string(&path)?)
}

/// Format, write and map the result to an exit code.
pub fn emit_report(
    result: &ValidationResult,
    args: &ReportArgs,
    locale: Locale,
) -> anyhow::Result<ExitCode> {
    let output = format_result(result, args.format, locale, !args.hide_text)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    debug!("Validation took {}ms", result.processing_time_ms);

    if args.strict && !result.is_success() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

pub fn format_result(
    result: &ValidationResult,
    format: OutputFormat,
    locale: Locale,
    show_text: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(format_text(result, locale, show_text)),
        OutputFormat::Json => format_json(result, locale),
        OutputFormat::Csv => format_csv(result, locale),
    }
}

fn format_json(result: &ValidationResult, locale: Locale) -> anyhow::Result<String> {
    let mut findings = Vec::with_capacity(result.report.len());
    for finding in result.report.iter() {
        let mut value = serde_json::to_value(finding)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "message".to_string(),
                serde_json::Value::String(finding.message(locale)),
            );
        }
        findings.push(value);
    }

    let output = serde_json::json!({
        "success": result.is_success(),
        "findings": findings,
        "fields": result.fields,
        "text": result.text,
    });

    Ok(format!("{}\n", serde_json::to_string_pretty(&output)?))
}

fn format_csv(result: &ValidationResult, locale: Locale) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["kind", "message"])?;
    for finding in result.report.iter() {
        wtr.write_record([finding.kind().as_str(), finding.message(locale).as_str()])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ValidationResult, locale: Locale, show_text: bool) -> String {
    let mut output = String::new();

    if show_text {
        output.push_str("Recognized text:\n");
        for line in result.text.lines() {
            output.push_str(&format!("  {}\n", line));
        }
        output.push('\n');
    }

    let fields = &result.fields;
    output.push_str("Fields:\n");
    output.push_str(&format!("  Issuer:      {}\n", display(&fields.issuer)));
    output.push_str(&format!("  Tax ID:      {}\n", display(&fields.tax_id)));
    output.push_str(&format!(
        "  Amounts:     {} / {}\n",
        display(&fields.numeric_amount),
        display(&fields.traditional_amount)
    ));
    output.push_str(&format!("  Taxable:     {}\n", display(&fields.taxable_amount)));
    output.push_str(&format!("  Tax:         {}\n", display(&fields.tax_amount)));
    output.push_str(&format!("  Total:       {}\n", display(&fields.total_amount)));
    output.push('\n');

    if result.is_success() {
        let message = match locale {
            Locale::En => "All checks passed",
            Locale::ZhTw => "全部正確",
        };
        output.push_str(&format!("{} {}\n", style("✓").green(), message));
    } else {
        output.push_str(&format!(
            "{} {} check(s) failed:\n",
            style("✗").red(),
            result.report.len()
        ));
        for message in result.report.messages(locale) {
            output.push_str(&format!("  - {}\n", message));
        }
    }

    output
}

fn display<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
