//! DORA metric aggregation over a release list
//!
//! Point metrics reduce the visible releases of a query to a single value
//! each. [time_series] splits the query range into calendar buckets walked
//! backward from `until` and computes the same metrics per bucket.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveTime};

use crate::domain::{Interval, QueryOption, Release};
use crate::error::{FourKeysError, Result};
use crate::git::Repository;
use crate::observer::{QueryObserver, TimerGuard};
use crate::releases::query_releases;

/// Number of `interval` units spanned by `[since, until]`, at least 1
///
/// Days and weeks count whole units of elapsed time; months count the
/// calendar month difference.
pub fn frequency_unit_count(
    since: DateTime<FixedOffset>,
    until: DateTime<FixedOffset>,
    interval: Interval,
) -> i64 {
    let units = match interval {
        Interval::Day => (until - since).num_days(),
        Interval::Week => (until - since).num_weeks(),
        Interval::Month => {
            (i64::from(until.year()) - i64::from(since.year())) * 12
                + (i64::from(until.month()) - i64::from(since.month()))
        }
    };
    units.max(1)
}

/// Releases per `interval` unit between `since` and `until`
pub fn deployment_frequency_between(
    releases: &[Release],
    since: DateTime<FixedOffset>,
    until: DateTime<FixedOffset>,
    interval: Interval,
) -> f64 {
    releases.len() as f64 / frequency_unit_count(since, until, interval) as f64
}

/// Releases per `interval` unit over the query window of `option`
pub fn deployment_frequency(releases: &[Release], option: &QueryOption, interval: Interval) -> f64 {
    deployment_frequency_between(releases, option.since, option.until, interval)
}

/// Mean lead time for changes, zero without releases
pub fn mean_lead_time(releases: &[Release]) -> Duration {
    mean(releases.iter().map(|r| r.lead_time_for_changes))
}

/// Mean over the releases carrying a time to restore, zero when none does
pub fn mean_time_to_restore(releases: &[Release]) -> Duration {
    mean(releases.iter().filter_map(|r| r.result.time_to_restore))
}

/// Share of failed releases, zero without releases
pub fn change_failure_rate(releases: &[Release]) -> f64 {
    if releases.is_empty() {
        return 0.0;
    }
    let failures = releases.iter().filter(|r| !r.result.is_success).count();
    failures as f64 / releases.len() as f64
}

fn mean(durations: impl Iterator<Item = Duration>) -> Duration {
    let (sum, count) = durations.fold((0i64, 0i64), |(sum, count), d| {
        (sum.saturating_add(d.num_milliseconds()), count + 1)
    });
    if count == 0 {
        return Duration::zero();
    }
    Duration::milliseconds(sum / count)
}

/// The four metrics computed over one set of releases
#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub deployment_frequency: f64,
    pub lead_time_for_changes: Duration,
    pub time_to_restore: Duration,
    pub change_failure_rate: f64,
}

impl Metrics {
    pub fn compute(
        releases: &[Release],
        since: DateTime<FixedOffset>,
        until: DateTime<FixedOffset>,
        interval: Interval,
    ) -> Self {
        Metrics {
            deployment_frequency: deployment_frequency_between(releases, since, until, interval),
            lead_time_for_changes: mean_lead_time(releases),
            time_to_restore: mean_time_to_restore(releases),
            change_failure_rate: change_failure_rate(releases),
        }
    }
}

/// Metrics of one time-series bucket, keyed by the bucket start
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub time: DateTime<FixedOffset>,
    pub metrics: Metrics,
}

/// Reject a range shorter than one `interval` unit
pub fn validate_interval(option: &QueryOption, interval: Interval) -> Result<()> {
    let range = option.until - option.since;
    if range < interval.minimum_range() {
        return Err(FourKeysError::IntervalTooShort {
            interval: interval.to_string(),
            hours: range.num_hours(),
        });
    }
    Ok(())
}

/// Bucket `releases` into `interval` units walking back from `until`
///
/// The first bucket starts at the unit boundary containing `until` and ends at
/// `until`; each further bucket ends where the previous one started. Buckets
/// are emitted while their start is not before `since`. A bucket holds the
/// releases strictly between its start and end.
pub fn bin_time_series(
    releases: &[Release],
    since: DateTime<FixedOffset>,
    until: DateTime<FixedOffset>,
    interval: Interval,
) -> Vec<TimeSeriesPoint> {
    let mut points = Vec::new();
    let mut end = until;
    let mut start = bucket_start(until, interval);

    while let Some(current) = start.filter(|s| *s >= since) {
        let in_bucket: Vec<Release> = releases
            .iter()
            .filter(|r| current < r.date && r.date < end)
            .cloned()
            .collect();

        points.push(TimeSeriesPoint {
            time: current,
            metrics: Metrics::compute(&in_bucket, current, end, interval),
        });

        end = current;
        start = previous_start(current, interval);
    }

    points
}

/// Query releases and bucket them into a time series
///
/// The interval is validated against the query range before the repository is
/// touched.
pub fn time_series<R: Repository + ?Sized>(
    repo: &R,
    option: &QueryOption,
    interval: Interval,
    observer: &dyn QueryObserver,
) -> Result<Vec<TimeSeriesPoint>> {
    validate_interval(option, interval)?;

    let releases = query_releases(repo, option, observer)?;

    let _timer = TimerGuard::start(observer, "Calculate time series");
    Ok(bin_time_series(
        &releases,
        option.since,
        option.until,
        interval,
    ))
}

fn bucket_start(until: DateTime<FixedOffset>, interval: Interval) -> Option<DateTime<FixedOffset>> {
    let date = until.date_naive();
    let date = match interval {
        Interval::Day => date,
        Interval::Week => {
            date - Duration::days(i64::from(until.weekday().num_days_from_sunday()))
        }
        Interval::Month => date.with_day(1)?,
    };
    date.and_time(NaiveTime::MIN)
        .and_local_timezone(*until.offset())
        .single()
}

fn previous_start(
    start: DateTime<FixedOffset>,
    interval: Interval,
) -> Option<DateTime<FixedOffset>> {
    match interval {
        Interval::Day => start.checked_sub_signed(Duration::days(1)),
        Interval::Week => start.checked_sub_signed(Duration::weeks(1)),
        Interval::Month => start.checked_sub_months(Months::new(1)),
    }
}
