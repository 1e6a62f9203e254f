//! Command-line surface
//!
//! [Cli] is the clap definition parsed by the binary; [orchestration] holds
//! the workflows it dispatches to.

pub mod orchestration;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::Interval;
use crate::git::BackendKind;
use crate::ui::OutputFormat;

pub use orchestration::{build_option, run_metrics, run_releases, run_time_series, QueryArgs};

#[derive(Debug, Parser)]
#[command(
    name = "four-keys",
    version,
    about = "Derive DORA four keys metrics from git tags and commits"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List releases with lead time and result
    Releases,

    /// List the four keys per day, week or month
    #[command(name = "time-series", alias = "timeSeries")]
    TimeSeries {
        #[arg(long, help = "Interval of time series: day, week, month [default: month]")]
        interval: Option<Interval>,
    },
}

/// Flags accepted before or after any subcommand
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Path inside the repository to analyze"
    )]
    pub repository: PathBuf,

    #[arg(
        long,
        global = true,
        help = "Start date of the range, YYYY-MM-DD (inclusive) [default: 1 month ago]"
    )]
    pub since: Option<NaiveDate>,

    #[arg(
        long,
        global = true,
        help = "End date of the range, YYYY-MM-DD (inclusive) [default: now]"
    )]
    pub until: Option<NaiveDate>,

    #[arg(
        long,
        global = true,
        visible_alias = "ignorePattern",
        help = "Ignore tags matching this regex"
    )]
    pub ignore_pattern: Option<String>,

    #[arg(
        long,
        global = true,
        visible_alias = "fixCommitPattern",
        help = "Commits whose message matches this regex fix the previous release [default: contains 'hotfix']"
    )]
    pub fix_commit_pattern: Option<String>,

    #[arg(long, global = true, help = "Repository backend: library or shell")]
    pub backend: Option<BackendKind>,

    #[arg(long, global = true, help = "Worker threads (0 = one per core)")]
    pub jobs: Option<usize>,

    #[arg(short, long, global = true, help = "Custom configuration file path")]
    pub config: Option<String>,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Json,
        help = "Output format"
    )]
    pub format: OutputFormat,

    #[arg(long, global = true, help = "Show debug messages and stage timings")]
    pub debug: bool,
}

impl CommonArgs {
    pub fn query_args(&self) -> QueryArgs {
        QueryArgs {
            repository: self.repository.clone(),
            since: self.since,
            until: self.until,
            ignore_pattern: self.ignore_pattern.clone(),
            fix_commit_pattern: self.fix_commit_pattern.clone(),
            backend: self.backend,
            jobs: self.jobs,
        }
    }
}

impl Cli {
    /// Flags shared by every command
    pub fn common(&self) -> &CommonArgs {
        &self.common
    }
}
