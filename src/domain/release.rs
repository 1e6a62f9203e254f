use chrono::{DateTime, Duration, FixedOffset};

use crate::git::CommitInfo;

/// A resolved pairing of a tag with the commit it points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseSource {
    /// Short tag name
    pub tag: String,
    pub commit: CommitInfo,
}

impl ReleaseSource {
    pub fn new(tag: impl Into<String>, commit: CommitInfo) -> Self {
        ReleaseSource {
            tag: tag.into(),
            commit,
        }
    }

    /// Committer time of the tagged commit
    pub fn date(&self) -> DateTime<FixedOffset> {
        self.commit.committed_at
    }
}

/// Outcome of a release as seen from the next newer release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReleaseResult {
    pub is_success: bool,
    /// Set only on a successful release that ended a failure streak
    pub time_to_restore: Option<Duration>,
}

impl ReleaseResult {
    pub fn success() -> Self {
        ReleaseResult {
            is_success: true,
            time_to_restore: None,
        }
    }

    pub fn failure() -> Self {
        ReleaseResult::default()
    }

    pub fn restored_after(time_to_restore: Duration) -> Self {
        ReleaseResult {
            is_success: true,
            time_to_restore: Some(time_to_restore),
        }
    }
}

/// A tagged commit treated as a deployable unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub tag: String,
    pub date: DateTime<FixedOffset>,
    pub lead_time_for_changes: Duration,
    pub result: ReleaseResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_release_source_date_is_commit_time() {
        let committed_at = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2016, 1, 11, 12, 9, 15)
            .unwrap();
        let source = ReleaseSource::new(
            "v2.1.2",
            CommitInfo {
                hash: "abc".to_string(),
                committed_at,
                message: "release".to_string(),
                parents: vec![],
            },
        );

        assert_eq!(source.date(), committed_at);
        assert_eq!(source.tag, "v2.1.2");
    }

    #[test]
    fn test_release_result_constructors() {
        assert!(ReleaseResult::success().is_success);
        assert!(!ReleaseResult::failure().is_success);
        assert_eq!(ReleaseResult::failure().time_to_restore, None);

        let restored = ReleaseResult::restored_after(Duration::hours(3));
        assert!(restored.is_success);
        assert_eq!(restored.time_to_restore, Some(Duration::hours(3)));
    }
}
