use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::FourKeysError;

/// Calendar unit used for deployment frequency and time-series buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Day,
    Week,
    #[default]
    Month,
}

impl Interval {
    /// Shortest range a time series in this interval may cover
    pub fn minimum_range(&self) -> Duration {
        match self {
            Interval::Day => Duration::days(1),
            Interval::Week => Duration::days(7),
            Interval::Month => Duration::days(28),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Day => "day",
            Interval::Week => "week",
            Interval::Month => "month",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = FourKeysError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Interval::Day),
            "week" => Ok(Interval::Week),
            "month" => Ok(Interval::Month),
            other => Err(FourKeysError::UnknownInterval(other.to_string())),
        }
    }
}
