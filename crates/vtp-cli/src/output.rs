//! # Output Rendering
//!
//! Results are printed to stdout as text, JSON or YAML. Operator
//! notifications go to stderr so that stdout stays machine-readable.

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use vtp_license::{Outcome, OutcomeSink};

/// Format of command results on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Pretty-printed JSON.
    Json,
    /// YAML.
    Yaml,
}

/// Render `value` in `format`. `text` produces the human-readable form.
pub fn render<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text(value)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("failed to serialize result as JSON")
        }
        OutputFormat::Yaml => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .context("failed to serialize result as YAML"),
    }
}

/// Render and print `value` to stdout.
pub fn emit<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> Result<()> {
    println!("{}", render(format, value, text)?);
    Ok(())
}

/// Operator notifications on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl OutcomeSink for StderrSink {
    fn report(&self, outcome: Outcome) {
        match &outcome {
            Outcome::Success { message, .. } => eprintln!("ok: {message}"),
            Outcome::Failure { operation, message } => eprintln!("{operation} failed: {message}"),
        }
    }
}
