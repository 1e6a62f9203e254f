use chrono::Duration;
use rayon::prelude::*;
use tracing::warn;

use crate::domain::{QueryOption, Release, ReleaseResult, ReleaseSource};
use crate::error::{FourKeysError, Result};
use crate::git::{CommitInfo, Repository};
use crate::observer::{QueryObserver, TimerGuard};

use super::walker::walk;

/// Per-release facts gathered from one commit window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFacts {
    /// The release with its lead time set and a placeholder result
    pub release: Release,
    /// The window contains a commit fixing the previous release
    pub restores_previous: bool,
    /// The release lies inside the query's `[since, until]` window
    pub visible: bool,
}

/// Compute lead time and restoration flags for every source in parallel
///
/// `sources` must be ordered newest first; source `i` is bounded by
/// `sources[i + 1]`, and the oldest source by the start of the repository.
/// Window failures are absorbed: the release gets a zero lead time and does
/// not restore its predecessor.
///
/// The result is sorted by date descending with ties kept in source order.
pub fn compute_release_facts<R: Repository + ?Sized>(
    sources: &[ReleaseSource],
    option: &QueryOption,
    repo: &R,
    observer: &dyn QueryObserver,
) -> Result<Vec<ReleaseFacts>> {
    let compute_all = || -> Vec<ReleaseFacts> {
        sources
            .par_iter()
            .enumerate()
            .map(|(i, source)| {
                let older = sources.get(i + 1).map(|s| &s.commit);
                compute_one(i, source, older, option, repo, observer)
            })
            .collect()
    };

    let mut facts = if option.jobs > 0 {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(option.jobs)
            .build()
            .map_err(|e| FourKeysError::backend(format!("Failed to start worker pool: {}", e)))?;
        pool.install(compute_all)
    } else {
        compute_all()
    };

    facts.sort_by(|a, b| b.release.date.cmp(&a.release.date));
    Ok(facts)
}

fn compute_one<R: Repository + ?Sized>(
    index: usize,
    source: &ReleaseSource,
    older: Option<&CommitInfo>,
    option: &QueryOption,
    repo: &R,
    observer: &dyn QueryObserver,
) -> ReleaseFacts {
    let _timer = TimerGuard::start(observer, format!("source[{}]({})", index, source.tag));

    let mut oldest: Option<CommitInfo> = None;
    let mut restores_previous = false;

    let walked = walk(repo, older, Some(&source.commit), |commit| {
        if option.is_fix_commit(&commit.message) {
            restores_previous = true;
        }
        // visits run newest first
        oldest = Some(commit.clone());
    });

    let lead_time_for_changes = match walked {
        Ok(()) => oldest
            .map(|commit| source.date() - commit.committed_at)
            .unwrap_or_else(Duration::zero),
        Err(e) => {
            warn!("Skipping commit window of '{}': {}", source.tag, e);
            observer.on_trace(&format!("{}: {}", source.tag, e));
            restores_previous = false;
            Duration::zero()
        }
    };

    ReleaseFacts {
        release: Release {
            tag: source.tag.clone(),
            date: source.date(),
            lead_time_for_changes,
            result: ReleaseResult::default(),
        },
        restores_previous,
        visible: option.is_in_range(source.date()),
    }
}
