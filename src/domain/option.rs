use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;

use crate::error::{FourKeysError, Result};
use crate::git::BackendKind;

/// Commit messages containing this text restore the previous release when no
/// fix commit pattern is configured
pub const DEFAULT_FIX_KEYWORD: &str = "hotfix";

/// Query configuration, immutable for the duration of a query
#[derive(Debug, Clone)]
pub struct QueryOption {
    /// Inclusive lower bound of the visible release window
    pub since: DateTime<FixedOffset>,
    /// Inclusive upper bound of the visible release window
    pub until: DateTime<FixedOffset>,
    /// Releases whose tag name matches are dropped before any computation
    pub ignore_pattern: Option<Regex>,
    /// Commits whose message matches restore the previous release
    pub fix_commit_pattern: Option<Regex>,
    pub backend: BackendKind,
    /// Worker threads for per-release computation, 0 for the rayon default
    pub jobs: usize,
}

impl QueryOption {
    /// Create an option covering `[since, until]`
    ///
    /// Fails when `since` is after `until`.
    pub fn new(since: DateTime<FixedOffset>, until: DateTime<FixedOffset>) -> Result<Self> {
        if since > until {
            return Err(FourKeysError::InvalidRange {
                since: since.to_rfc3339(),
                until: until.to_rfc3339(),
            });
        }

        Ok(QueryOption {
            since,
            until,
            ignore_pattern: None,
            fix_commit_pattern: None,
            backend: BackendKind::default(),
            jobs: 0,
        })
    }

    /// An option whose window admits every release
    pub fn unbounded() -> Self {
        QueryOption {
            since: DateTime::<Utc>::MIN_UTC.fixed_offset(),
            until: DateTime::<Utc>::MAX_UTC.fixed_offset(),
            ignore_pattern: None,
            fix_commit_pattern: None,
            backend: BackendKind::default(),
            jobs: 0,
        }
    }

    /// Compile and set the tag ignore pattern
    pub fn with_ignore_pattern(mut self, pattern: &str) -> Result<Self> {
        self.ignore_pattern = Some(compile("ignorePattern", pattern)?);
        Ok(self)
    }

    /// Compile and set the fix commit pattern
    pub fn with_fix_commit_pattern(mut self, pattern: &str) -> Result<Self> {
        self.fix_commit_pattern = Some(compile("fixCommitPattern", pattern)?);
        Ok(self)
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// True when `time` lies inside `[since, until]`
    pub fn is_in_range(&self, time: DateTime<FixedOffset>) -> bool {
        self.since <= time && time <= self.until
    }

    pub fn should_ignore(&self, tag_name: &str) -> bool {
        self.ignore_pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(tag_name))
    }

    /// True when `message` marks a commit fixing the previous release
    pub fn is_fix_commit(&self, message: &str) -> bool {
        match &self.fix_commit_pattern {
            Some(pattern) => pattern.is_match(message),
            None => message.contains(DEFAULT_FIX_KEYWORD),
        }
    }
}

fn compile(filter: &'static str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| FourKeysError::InvalidFilterPattern { filter, source })
}
