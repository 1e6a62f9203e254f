//! User interface module - output rendering.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Choosing between JSON and text output

use serde::Serialize;

use crate::error::Result;

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_status, format_metrics, format_releases, format_time_series,
};

/// How query results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact single-line JSON
    #[default]
    Json,
    /// Indented JSON
    Pretty,
    /// Human-readable summary
    Text,
}

/// Render `value` in `format`, using `text` for the human-readable form.
///
/// # Arguments
/// * `value` - Output record to render
/// * `format` - Requested output format
/// * `text` - Formatter producing the text rendering
///
/// # Returns
/// * `Ok(String)` - The rendered output without trailing newline handling
/// * `Err` - If JSON serialization fails
pub fn render<T, F>(value: &T, format: OutputFormat, text: F) -> Result<String>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        OutputFormat::Text => text(value),
    };
    Ok(rendered)
}
