//! Pure formatting functions for UI output.
//!
//! Text renderings return a `String` so they can be tested without a
//! terminal; the `display_*` helpers print to stderr to keep stdout for
//! query output.

use std::fmt::Write;

use console::style;

use crate::output::{DurationWithUnit, MetricsOutput, ReleasesOutput, TimeSeriesOutput};

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

fn days(duration: &DurationWithUnit) -> String {
    format!("{:.2} {}s", duration.value, duration.unit)
}

fn window(since: &impl std::fmt::Display, until: &impl std::fmt::Display) -> String {
    format!("{} .. {}", since, until)
}

/// Render aggregate metrics as an aligned summary.
pub fn format_metrics(output: &MetricsOutput) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{} {}",
        style("Four keys").bold(),
        window(&output.option.since, &output.option.until)
    );
    let _ = writeln!(
        text,
        "  Deployment frequency: {:.3} per day",
        output.deployment_frequency
    );
    let _ = writeln!(
        text,
        "  Lead time for changes: {}",
        days(&output.lead_time_for_changes)
    );
    let _ = writeln!(text, "  Time to restore:      {}", days(&output.time_to_restore));
    let _ = writeln!(
        text,
        "  Change failure rate:  {:.1}%",
        output.change_failure_rate * 100.0
    );
    text
}

/// Render releases one per line, newest first.
///
/// Shows at most 50 releases; the rest are summarised in a trailing count.
pub fn format_releases(output: &ReleasesOutput) -> String {
    const MAX_LISTED: usize = 50;

    let mut text = String::new();
    let _ = writeln!(
        text,
        "{} {}",
        style(format!("{} releases", output.releases.len())).bold(),
        window(&output.option.since, &output.option.until)
    );

    for release in output.releases.iter().take(MAX_LISTED) {
        let status = if release.result.is_success {
            style("ok").green().to_string()
        } else {
            style("failed").red().to_string()
        };
        let _ = write!(
            text,
            "  {:<20} {}  lead {}  {}",
            release.tag,
            release.date.format("%Y-%m-%d %H:%M"),
            days(&release.lead_time_for_changes),
            status
        );
        if let Some(restore) = &release.result.time_to_restore {
            let _ = write!(text, "  restored in {}", days(restore));
        }
        text.push('\n');
    }

    if output.releases.len() > MAX_LISTED {
        let _ = writeln!(
            text,
            "  ... and {} more releases",
            output.releases.len() - MAX_LISTED
        );
    }
    text
}

/// Render a time series as a table, newest bucket first.
pub fn format_time_series(output: &TimeSeriesOutput) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "{}",
        style(format!(
            "{:<12} {:>10} {:>14} {:>14} {:>8}",
            "start", "frequency", "lead (h)", "restore (h)", "failure"
        ))
        .bold()
    );

    for item in &output.items {
        let _ = writeln!(
            text,
            "{:<12} {:>10.3} {:>14.1} {:>14.1} {:>7.1}%",
            item.time.format("%Y-%m-%d"),
            item.deployment_frequency,
            item.lead_time_for_changes,
            item.time_to_restore,
            item.change_failure_rate * 100.0
        );
    }
    text
}
