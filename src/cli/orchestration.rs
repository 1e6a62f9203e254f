//! Command workflows
//!
//! Each workflow turns query arguments plus the loaded configuration into an
//! output record. Arguments are decoupled from clap so the workflows can be
//! driven programmatically and tested with a fixed clock.

use std::path::PathBuf;

use chrono::{DateTime, Duration, FixedOffset, Months, NaiveDate, NaiveTime, TimeZone};
use tracing::debug;

use crate::config::{Config, QueryConfig};
use crate::domain::{Interval, QueryOption};
use crate::error::{FourKeysError, Result};
use crate::git::{self, BackendKind};
use crate::metrics::{self, Metrics};
use crate::observer::{QueryObserver, TimerGuard};
use crate::output::{MetricsOutput, ReleasesOutput, TimeSeriesOutput};
use crate::releases::query_releases;

/// Arguments shared by every query command
///
/// Values left as `None` fall back to the configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryArgs {
    /// Path inside the repository to analyze
    pub repository: PathBuf,

    /// First day of the range (inclusive)
    pub since: Option<NaiveDate>,

    /// Last day of the range (inclusive, up to 23:59:59)
    pub until: Option<NaiveDate>,

    pub ignore_pattern: Option<String>,

    pub fix_commit_pattern: Option<String>,

    pub backend: Option<BackendKind>,

    pub jobs: Option<usize>,
}

impl Default for QueryArgs {
    fn default() -> Self {
        QueryArgs {
            repository: PathBuf::from("."),
            since: None,
            until: None,
            ignore_pattern: None,
            fix_commit_pattern: None,
            backend: None,
            jobs: None,
        }
    }
}

/// Build the query option for `args`
///
/// Bare dates are placed in `now`'s time zone at the offset in effect on
/// that date, so a range may start and end at different UTC offsets.
/// Without `--since` the range starts
/// `since_days_ago` days before `now`, or one calendar month before when that
/// is unset; without `--until` it ends at `now`.
///
/// # Errors
/// Invalid patterns and inverted ranges are rejected here, before any
/// repository access.
pub fn build_option<Tz: TimeZone>(
    args: &QueryArgs,
    config: &QueryConfig,
    now: DateTime<Tz>,
) -> Result<QueryOption> {
    let zone = now.timezone();

    let since = match (args.since, config.since_days_ago) {
        (Some(date), _) => start_of_day(date, &zone)?,
        (None, Some(days)) => (now.clone() - Duration::days(i64::from(days))).fixed_offset(),
        (None, None) => now
            .clone()
            .checked_sub_months(Months::new(1))
            .ok_or_else(|| FourKeysError::config("Cannot compute default start date"))?
            .fixed_offset(),
    };

    let until = match args.until {
        Some(date) => end_of_day(date, &zone)?,
        None => now.fixed_offset(),
    };

    let mut option = QueryOption::new(since, until)?
        .with_backend(args.backend.unwrap_or(config.backend))
        .with_jobs(args.jobs.unwrap_or(config.jobs));

    if let Some(pattern) = args.ignore_pattern.as_ref().or(config.ignore_pattern.as_ref()) {
        option = option.with_ignore_pattern(pattern)?;
    }
    if let Some(pattern) = args
        .fix_commit_pattern
        .as_ref()
        .or(config.fix_commit_pattern.as_ref())
    {
        option = option.with_fix_commit_pattern(pattern)?;
    }

    debug!(
        "Query range {} .. {} using {} backend",
        option.since, option.until, option.backend
    );
    Ok(option)
}

fn start_of_day<Tz: TimeZone>(date: NaiveDate, zone: &Tz) -> Result<DateTime<FixedOffset>> {
    zone.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .map(|time| time.fixed_offset())
        .ok_or_else(|| FourKeysError::config(format!("Cannot place {} in local time", date)))
}

fn end_of_day<Tz: TimeZone>(date: NaiveDate, zone: &Tz) -> Result<DateTime<FixedOffset>> {
    let end = NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| FourKeysError::config("Invalid end of day"))?;
    zone.from_local_datetime(&date.and_time(end))
        .latest()
        .map(|time| time.fixed_offset())
        .ok_or_else(|| FourKeysError::config(format!("Cannot place {} in local time", date)))
}

fn open_repository(
    args: &QueryArgs,
    option: &QueryOption,
    observer: &dyn QueryObserver,
) -> Result<Box<dyn git::Repository>> {
    let _timer = TimerGuard::start(observer, "Open Repository");
    git::open(&args.repository, option.backend)
}

/// Aggregate metrics over the releases in range
///
/// Deployment frequency is reported per day.
pub fn run_metrics<Tz: TimeZone>(
    args: &QueryArgs,
    config: &Config,
    observer: &dyn QueryObserver,
    now: DateTime<Tz>,
) -> Result<MetricsOutput> {
    let option = build_option(args, &config.query, now)?;
    let repo = open_repository(args, &option, observer)?;
    let releases = query_releases(repo.as_ref(), &option, observer)?;

    let _timer = TimerGuard::start(observer, "Calculate metrics");
    let metrics = Metrics::compute(&releases, option.since, option.until, Interval::Day);
    Ok(MetricsOutput::new(&option, &metrics))
}

/// List the releases in range, newest first
pub fn run_releases<Tz: TimeZone>(
    args: &QueryArgs,
    config: &Config,
    observer: &dyn QueryObserver,
    now: DateTime<Tz>,
) -> Result<ReleasesOutput> {
    let option = build_option(args, &config.query, now)?;
    let repo = open_repository(args, &option, observer)?;
    let releases = query_releases(repo.as_ref(), &option, observer)?;
    Ok(ReleasesOutput::new(&option, &releases))
}

/// Bucket metrics by `interval`, or the configured interval when `None`
pub fn run_time_series<Tz: TimeZone>(
    args: &QueryArgs,
    interval: Option<Interval>,
    config: &Config,
    observer: &dyn QueryObserver,
    now: DateTime<Tz>,
) -> Result<TimeSeriesOutput> {
    let interval = interval.unwrap_or(config.time_series.interval);
    let option = build_option(args, &config.query, now)?;
    metrics::validate_interval(&option, interval)?;

    let repo = open_repository(args, &option, observer)?;
    let points = metrics::time_series(repo.as_ref(), &option, interval, observer)?;
    Ok(TimeSeriesOutput::new(&option, &points))
}
