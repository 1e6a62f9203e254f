//! JSON records written by the command line
//!
//! Field names are camelCase. Durations in release and metrics records are
//! presented as fractional days; time-series items carry plain hours.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::domain::{QueryOption, Release, ReleaseResult};
use crate::metrics::{Metrics, TimeSeriesPoint};

pub const UNIT_DAY: &str = "day";

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// A duration presented as a value in a named unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationWithUnit {
    pub value: f64,
    pub unit: String,
}

impl DurationWithUnit {
    pub fn days(duration: Duration) -> Self {
        DurationWithUnit {
            value: duration.num_milliseconds() as f64 / MILLIS_PER_DAY,
            unit: UNIT_DAY.to_string(),
        }
    }

    /// Convert back into a duration, rounded to milliseconds
    ///
    /// Only the day unit is understood; anything else yields `None`.
    pub fn to_duration(&self) -> Option<Duration> {
        if self.unit != UNIT_DAY || !self.value.is_finite() {
            return None;
        }
        Some(Duration::milliseconds(
            (self.value * MILLIS_PER_DAY).round() as i64,
        ))
    }
}

impl From<Duration> for DurationWithUnit {
    fn from(duration: Duration) -> Self {
        DurationWithUnit::days(duration)
    }
}

fn hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// The query window echoed alongside every output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionEcho {
    pub since: DateTime<FixedOffset>,
    pub until: DateTime<FixedOffset>,
}

impl From<&QueryOption> for OptionEcho {
    fn from(option: &QueryOption) -> Self {
        OptionEcho {
            since: option.since,
            until: option.until,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub is_success: bool,
    pub time_to_restore: Option<DurationWithUnit>,
}

impl From<&ReleaseResult> for ResultRecord {
    fn from(result: &ReleaseResult) -> Self {
        ResultRecord {
            is_success: result.is_success,
            time_to_restore: result.time_to_restore.map(DurationWithUnit::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRecord {
    pub tag: String,
    pub date: DateTime<FixedOffset>,
    pub lead_time_for_changes: DurationWithUnit,
    pub result: ResultRecord,
}

impl From<&Release> for ReleaseRecord {
    fn from(release: &Release) -> Self {
        ReleaseRecord {
            tag: release.tag.clone(),
            date: release.date,
            lead_time_for_changes: release.lead_time_for_changes.into(),
            result: (&release.result).into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasesOutput {
    pub option: OptionEcho,
    pub releases: Vec<ReleaseRecord>,
}

impl ReleasesOutput {
    pub fn new(option: &QueryOption, releases: &[Release]) -> Self {
        ReleasesOutput {
            option: option.into(),
            releases: releases.iter().map(ReleaseRecord::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsOutput {
    pub option: OptionEcho,
    pub deployment_frequency: f64,
    pub lead_time_for_changes: DurationWithUnit,
    pub time_to_restore: DurationWithUnit,
    pub change_failure_rate: f64,
}

impl MetricsOutput {
    pub fn new(option: &QueryOption, metrics: &Metrics) -> Self {
        MetricsOutput {
            option: option.into(),
            deployment_frequency: metrics.deployment_frequency,
            lead_time_for_changes: metrics.lead_time_for_changes.into(),
            time_to_restore: metrics.time_to_restore.into(),
            change_failure_rate: metrics.change_failure_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesItem {
    pub time: DateTime<FixedOffset>,
    pub deployment_frequency: f64,
    /// Hours
    pub lead_time_for_changes: f64,
    /// Hours
    pub time_to_restore: f64,
    pub change_failure_rate: f64,
}

impl From<&TimeSeriesPoint> for TimeSeriesItem {
    fn from(point: &TimeSeriesPoint) -> Self {
        TimeSeriesItem {
            time: point.time,
            deployment_frequency: point.metrics.deployment_frequency,
            lead_time_for_changes: hours(point.metrics.lead_time_for_changes),
            time_to_restore: hours(point.metrics.time_to_restore),
            change_failure_rate: point.metrics.change_failure_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesOutput {
    pub option: OptionEcho,
    pub items: Vec<TimeSeriesItem>,
}

impl TimeSeriesOutput {
    pub fn new(option: &QueryOption, points: &[TimeSeriesPoint]) -> Self {
        TimeSeriesOutput {
            option: option.into(),
            items: points.iter().map(TimeSeriesItem::from).collect(),
        }
    }
}
