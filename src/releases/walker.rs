use chrono::Duration;

use crate::error::{FourKeysError, Result};
use crate::git::{CommitInfo, Repository};

/// Commits committed within this many hours after the older boundary are
/// left out of a window
pub const WINDOW_CUTOFF_HOURS: i64 = 24;

/// Visit every commit in the window `(older, newer]`, newest first
///
/// The window holds the commits reachable from `newer` but not from `older`,
/// ordered by committer time descending with ties broken by hash. Commits
/// committed before `older`'s committer time plus [WINDOW_CUTOFF_HOURS] are
/// cut off as well.
///
/// When `older` is `None` the lower boundary is the root commit reachable
/// from `newer`; the root itself is excluded like any other boundary.
///
/// # Errors
/// * `NoNewerCommit` - `newer` is `None`
/// * `AmbiguousRoot` - `older` is `None` and `newer` reaches several roots
/// * `IllegalCommitOrder` - `older` is not an ancestor of (or equal to) `newer`
/// * `LogUnavailable` - the backend cannot answer for this range
pub fn walk<R, F>(
    repo: &R,
    older: Option<&CommitInfo>,
    newer: Option<&CommitInfo>,
    mut visit: F,
) -> Result<()>
where
    R: Repository + ?Sized,
    F: FnMut(&CommitInfo),
{
    let newer = newer.ok_or(FourKeysError::NoNewerCommit)?;

    let boundary = match older {
        Some(older) => older.clone(),
        None => find_root(repo, newer)?,
    };

    let is_ancestor = repo
        .is_ancestor(&boundary, newer)
        .map_err(unavailable)?;
    if !is_ancestor {
        return Err(FourKeysError::IllegalCommitOrder {
            older: boundary.hash,
            newer: newer.hash.clone(),
        });
    }

    if boundary.hash == newer.hash {
        return Ok(());
    }

    let since = boundary.committed_at + Duration::hours(WINDOW_CUTOFF_HOURS);
    let mut commits = repo
        .log_window(newer, Some(&boundary), Some(since))
        .map_err(unavailable)?;

    // backends order by committer time with differing tie-breaks
    commits.sort_by(|a, b| {
        b.committed_at
            .cmp(&a.committed_at)
            .then_with(|| a.hash.cmp(&b.hash))
    });

    for commit in &commits {
        visit(commit);
    }

    Ok(())
}

fn unavailable(err: FourKeysError) -> FourKeysError {
    match err {
        FourKeysError::LogUnavailable(_) => err,
        other => FourKeysError::log_unavailable(other.to_string()),
    }
}

fn find_root<R: Repository + ?Sized>(repo: &R, newer: &CommitInfo) -> Result<CommitInfo> {
    let mut roots = repo
        .root_commits(newer)
        .map_err(unavailable)?;

    match roots.len() {
        1 => Ok(roots.remove(0)),
        0 => Err(FourKeysError::log_unavailable(format!(
            "no root commit reachable from {}",
            newer.hash
        ))),
        count => Err(FourKeysError::AmbiguousRoot {
            from: newer.hash.clone(),
            count,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn at(day: i64) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .timestamp_opt(1_600_000_000 + day * 86_400, 0)
            .unwrap()
    }

    fn collect<R: Repository>(
        repo: &R,
        older: Option<&CommitInfo>,
        newer: Option<&CommitInfo>,
    ) -> Result<Vec<String>> {
        let mut visited = Vec::new();
        walk(repo, older, newer, |c| visited.push(c.hash.clone()))?;
        Ok(visited)
    }

    fn linear_history() -> (MockRepository, Vec<CommitInfo>) {
        let mut repo = MockRepository::new();
        let commits = vec![
            repo.add_commit("c0", at(0), "initial", &[]),
            repo.add_commit("c1", at(2), "feat: a", &["c0"]),
            repo.add_commit("c2", at(4), "feat: b", &["c1"]),
            repo.add_commit("c3", at(6), "hotfix: b", &["c2"]),
        ];
        (repo, commits)
    }

    #[test]
    fn test_walk_requires_newer_commit() {
        let (repo, commits) = linear_history();
        let err = collect(&repo, Some(&commits[0]), None).unwrap_err();
        assert!(matches!(err, FourKeysError::NoNewerCommit));
    }

    #[test]
    fn test_walk_excludes_older_boundary() {
        let (repo, commits) = linear_history();
        let visited = collect(&repo, Some(&commits[1]), Some(&commits[3])).unwrap();
        assert_eq!(visited, vec!["c3", "c2"]);
    }

    #[test]
    fn test_walk_from_repository_start() {
        let (repo, commits) = linear_history();
        let visited = collect(&repo, None, Some(&commits[3])).unwrap();
        assert_eq!(visited, vec!["c3", "c2", "c1"]);
    }

    #[test]
    fn test_walk_same_commit_is_empty() {
        let (repo, commits) = linear_history();
        assert!(collect(&repo, Some(&commits[2]), Some(&commits[2]))
            .unwrap()
            .is_empty());
        assert!(collect(&repo, None, Some(&commits[0])).unwrap().is_empty());
    }

    #[test]
    fn test_walk_rejects_swapped_boundaries() {
        let (repo, commits) = linear_history();
        let err = collect(&repo, Some(&commits[3]), Some(&commits[1])).unwrap_err();
        assert!(matches!(err, FourKeysError::IllegalCommitOrder { .. }));
    }

    #[test]
    fn test_walk_cuts_off_commits_close_to_boundary() {
        let mut repo = MockRepository::new();
        let base = repo.add_commit("c0", at(0), "initial", &[]);
        repo.add_commit("c1", at(0) + Duration::hours(3), "quick fix", &["c0"]);
        let tip = repo.add_commit("c2", at(2), "feat", &["c1"]);

        let visited = collect(&repo, Some(&base), Some(&tip)).unwrap();
        assert_eq!(visited, vec!["c2"]);
    }

    #[test]
    fn test_walk_includes_merged_branches() {
        let mut repo = MockRepository::new();
        let base = repo.add_commit("c0", at(0), "initial", &[]);
        repo.add_commit("a1", at(2), "main work", &["c0"]);
        repo.add_commit("b1", at(3), "branch work", &["c0"]);
        let merge = repo.add_commit("m", at(4), "merge", &["a1", "b1"]);

        let visited = collect(&repo, Some(&base), Some(&merge)).unwrap();
        assert_eq!(visited, vec!["m", "b1", "a1"]);
    }

    #[test]
    fn test_walk_orders_ties_by_hash() {
        let mut repo = MockRepository::new();
        let base = repo.add_commit("c0", at(0), "initial", &[]);
        repo.add_commit("bb", at(2), "b", &["c0"]);
        repo.add_commit("aa", at(2), "a", &["c0"]);
        let merge = repo.add_commit("m", at(3), "merge", &["bb", "aa"]);

        let visited = collect(&repo, Some(&base), Some(&merge)).unwrap();
        assert_eq!(visited, vec!["m", "aa", "bb"]);
    }

    #[test]
    fn test_walk_reports_ambiguous_root() {
        let mut repo = MockRepository::new();
        repo.add_commit("r1", at(0), "first root", &[]);
        repo.add_commit("r2", at(1), "second root", &[]);
        let merge = repo.add_commit("m", at(3), "merge unrelated", &["r1", "r2"]);

        let err = collect(&repo, None, Some(&merge)).unwrap_err();
        assert!(matches!(err, FourKeysError::AmbiguousRoot { count: 2, .. }));
    }

    #[test]
    fn test_walk_reports_unavailable_log() {
        let (mut repo, commits) = linear_history();
        repo.break_log_from("c3");

        let err = collect(&repo, Some(&commits[1]), Some(&commits[3])).unwrap_err();
        assert!(matches!(err, FourKeysError::LogUnavailable(_)));
    }
}
