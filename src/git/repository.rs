use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, TimeZone};
use git2::{Oid, Repository as Git2Repo, Sort};
use tracing::debug;

use crate::error::{FourKeysError, Result};
use crate::git::{CommitInfo, TagRef};

/// libgit2-backed repository queries
///
/// `git2::Repository` handles cannot be shared between threads, so each query
/// opens its own handle from the discovered git directory.
pub struct Git2Repository {
    git_dir: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;
        debug!("Opened git repository at {:?}", repo.path());

        Ok(Git2Repository {
            git_dir: repo.path().to_path_buf(),
        })
    }

    /// Path of the `.git` directory (or the bare repository)
    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    fn handle(&self) -> Result<Git2Repo> {
        Ok(Git2Repo::open(&self.git_dir)?)
    }
}

/// Convert a libgit2 commit into the backend-neutral representation
pub(crate) fn to_commit_info(commit: &git2::Commit<'_>) -> Result<CommitInfo> {
    let time = commit.time();
    let committed_at = git_time_to_datetime(time).ok_or_else(|| {
        FourKeysError::backend(format!(
            "Commit {} has an unrepresentable committer time",
            commit.id()
        ))
    })?;

    Ok(CommitInfo {
        hash: commit.id().to_string(),
        committed_at,
        message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
        parents: commit.parent_ids().map(|oid| oid.to_string()).collect(),
    })
}

fn git_time_to_datetime(time: git2::Time) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)?;
    offset.timestamp_opt(time.seconds(), 0).single()
}

impl super::Repository for Git2Repository {
    fn list_tags(&self) -> Result<Vec<TagRef>> {
        let repo = self.handle()?;
        let names = repo.tag_names(None)?;

        let mut tags = Vec::new();
        for name in names.iter().flatten() {
            let reference = match repo.find_reference(&format!("refs/tags/{}", name)) {
                Ok(reference) => reference,
                Err(e) => {
                    debug!("Skipping tag '{}': {}", name, e);
                    continue;
                }
            };

            match reference.target() {
                Some(oid) => tags.push(TagRef::new(name, oid.to_string())),
                None => debug!("Skipping symbolic tag '{}'", name),
            }
        }

        Ok(tags)
    }

    fn resolve_tag_commit(&self, tag: &TagRef) -> Result<CommitInfo> {
        let repo = self.handle()?;
        let oid = Oid::from_str(&tag.target)?;

        // peel follows annotated tags, including tags pointing at other tags
        let commit = repo.find_object(oid, None)?.peel_to_commit()?;
        to_commit_info(&commit)
    }

    fn log_window(
        &self,
        from: &CommitInfo,
        exclude: Option<&CommitInfo>,
        since: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<CommitInfo>> {
        let repo = self.handle()?;
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME)?;
        revwalk.push(Oid::from_str(&from.hash)?)?;

        if let Some(exclude) = exclude {
            revwalk.hide(Oid::from_str(&exclude.hash)?)?;
        }

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let commit = repo.find_commit(oid_result?)?;
            let info = to_commit_info(&commit)?;

            if since.is_some_and(|since| info.committed_at < since) {
                continue;
            }
            commits.push(info);
        }

        Ok(commits)
    }

    fn is_ancestor(&self, ancestor: &CommitInfo, descendant: &CommitInfo) -> Result<bool> {
        if ancestor.hash == descendant.hash {
            return Ok(true);
        }

        let repo = self.handle()?;
        let ancestor = Oid::from_str(&ancestor.hash)?;
        let descendant = Oid::from_str(&descendant.hash)?;

        Ok(repo.graph_descendant_of(descendant, ancestor)?)
    }

    fn root_commits(&self, from: &CommitInfo) -> Result<Vec<CommitInfo>> {
        let repo = self.handle()?;
        let mut revwalk = repo.revwalk()?;
        revwalk.push(Oid::from_str(&from.hash)?)?;

        let mut roots = Vec::new();
        for oid_result in revwalk {
            let commit = repo.find_commit(oid_result?)?;
            if commit.parent_count() == 0 {
                roots.push(to_commit_info(&commit)?);
            }
        }

        Ok(roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use tempfile::TempDir;

    fn commit_at(repo: &Git2Repo, message: &str, seconds: i64, parents: &[Oid]) -> Oid {
        let tree_id = repo.treebuilder(None).unwrap().write().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let signature =
            git2::Signature::new("Test User", "test@example.com", &git2::Time::new(seconds, 120))
                .unwrap();
        let parents: Vec<git2::Commit> = parents
            .iter()
            .map(|oid| repo.find_commit(*oid).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        repo.commit(None, &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
    }

    #[test]
    fn test_open_discovers_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested");
        std::fs::create_dir(&nested).unwrap();
        Git2Repo::init(temp_dir.path()).unwrap();

        let repo = Git2Repository::open(&nested).unwrap();
        assert!(repo.git_dir().ends_with(".git"));
    }

    #[test]
    fn test_commit_info_keeps_offset() {
        let temp_dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(temp_dir.path()).unwrap();
        let oid = commit_at(&raw, "initial", 1_600_000_000, &[]);

        let commit = raw.find_commit(oid).unwrap();
        let info = to_commit_info(&commit).unwrap();

        assert_eq!(info.hash, oid.to_string());
        assert_eq!(info.committed_at.timestamp(), 1_600_000_000);
        assert_eq!(info.committed_at.offset().local_minus_utc(), 7200);
        assert!(info.parents.is_empty());
    }

    #[test]
    fn test_annotated_tag_resolves_to_commit() {
        let temp_dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(temp_dir.path()).unwrap();
        let oid = commit_at(&raw, "initial", 1_600_000_000, &[]);
        let signature = git2::Signature::now("Test User", "test@example.com").unwrap();
        let object = raw.find_object(oid, None).unwrap();
        raw.tag("v1.0.0", &object, &signature, "release", false)
            .unwrap();

        let repo = Git2Repository::open(temp_dir.path()).unwrap();
        let tags = repo.list_tags().unwrap();
        assert_eq!(tags.len(), 1);
        assert_ne!(tags[0].target, oid.to_string());

        let commit = repo.resolve_tag_commit(&tags[0]).unwrap();
        assert_eq!(commit.hash, oid.to_string());
    }

    #[test]
    fn test_tag_on_tree_does_not_resolve() {
        let temp_dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(temp_dir.path()).unwrap();
        let tree_id = raw.treebuilder(None).unwrap().write().unwrap();
        let tree = raw.find_object(tree_id, None).unwrap();
        raw.tag_lightweight("tree-tag", &tree, false).unwrap();

        let repo = Git2Repository::open(temp_dir.path()).unwrap();
        let tags = repo.list_tags().unwrap();
        assert_eq!(tags.len(), 1);
        assert!(repo.resolve_tag_commit(&tags[0]).is_err());
    }

    #[test]
    fn test_log_window_excludes_older_history() {
        let temp_dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(temp_dir.path()).unwrap();
        let first = commit_at(&raw, "first", 1_600_000_000, &[]);
        let second = commit_at(&raw, "second", 1_600_100_000, &[first]);
        let third = commit_at(&raw, "third", 1_600_200_000, &[second]);

        let repo = Git2Repository::open(temp_dir.path()).unwrap();
        let handle = repo.handle().unwrap();
        let first = to_commit_info(&handle.find_commit(first).unwrap()).unwrap();
        let third = to_commit_info(&handle.find_commit(third).unwrap()).unwrap();

        let window = repo.log_window(&third, Some(&first), None).unwrap();
        let messages: Vec<&str> = window.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second"]);

        assert!(repo.is_ancestor(&first, &third).unwrap());
        assert!(!repo.is_ancestor(&third, &first).unwrap());
        assert!(repo.is_ancestor(&third, &third).unwrap());

        let roots = repo.root_commits(&third).unwrap();
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].hash, first.hash);
    }
}
