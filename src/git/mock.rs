use std::collections::{HashMap, HashSet};

use chrono::{DateTime, FixedOffset};

use crate::error::{FourKeysError, Result};
use crate::git::{CommitInfo, Repository, TagRef};

/// In-memory commit graph for testing without actual git operations
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    commits: HashMap<String, CommitInfo>,
    tags: Vec<TagRef>,
    tag_objects: HashMap<String, String>,
    broken_logs: HashSet<String>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit to the mock repository and return it
    pub fn add_commit(
        &mut self,
        hash: impl Into<String>,
        committed_at: DateTime<FixedOffset>,
        message: impl Into<String>,
        parents: &[&str],
    ) -> CommitInfo {
        let info = CommitInfo {
            hash: hash.into(),
            committed_at,
            message: message.into(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
        };
        self.commits.insert(info.hash.clone(), info.clone());
        info
    }

    /// Add a lightweight tag pointing to a commit
    pub fn add_tag(&mut self, name: impl Into<String>, target: impl Into<String>) {
        self.tags.push(TagRef::new(name, target));
    }

    /// Add an annotated tag: a tag object `object` wrapping `target`
    ///
    /// `target` may be a commit or another tag object.
    pub fn add_annotated_tag(
        &mut self,
        name: impl Into<String>,
        object: impl Into<String>,
        target: impl Into<String>,
    ) {
        let object = object.into();
        self.tag_objects.insert(object.clone(), target.into());
        self.tags.push(TagRef::new(name, object));
    }

    /// Make every log starting at `hash` fail, as with missing objects
    pub fn break_log_from(&mut self, hash: impl Into<String>) {
        self.broken_logs.insert(hash.into());
    }

    fn reachable(&self, from: &str) -> HashSet<String> {
        let mut seen = HashSet::new();
        let mut stack = vec![from.to_string()];

        while let Some(hash) = stack.pop() {
            if !seen.insert(hash.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&hash) {
                stack.extend(commit.parents.iter().cloned());
            }
        }

        seen
    }
}

impl Repository for MockRepository {
    fn list_tags(&self) -> Result<Vec<TagRef>> {
        Ok(self.tags.clone())
    }

    fn resolve_tag_commit(&self, tag: &TagRef) -> Result<CommitInfo> {
        let mut target = tag.target.as_str();
        let mut hops = 0;

        while let Some(next) = self.tag_objects.get(target) {
            target = next;
            hops += 1;
            if hops > self.tag_objects.len() {
                return Err(FourKeysError::backend(format!(
                    "Tag '{}' forms a cycle",
                    tag.name
                )));
            }
        }

        self.commits.get(target).cloned().ok_or_else(|| {
            FourKeysError::backend(format!("Tag '{}' points at missing object", tag.name))
        })
    }

    fn log_window(
        &self,
        from: &CommitInfo,
        exclude: Option<&CommitInfo>,
        since: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<CommitInfo>> {
        if self.broken_logs.contains(&from.hash) {
            return Err(FourKeysError::log_unavailable(format!(
                "object {} is missing",
                from.hash
            )));
        }

        let hidden = exclude
            .map(|commit| self.reachable(&commit.hash))
            .unwrap_or_default();

        let mut commits: Vec<CommitInfo> = self
            .reachable(&from.hash)
            .into_iter()
            .filter(|hash| !hidden.contains(hash))
            .filter_map(|hash| self.commits.get(&hash).cloned())
            .filter(|commit| since.map_or(true, |since| commit.committed_at >= since))
            .collect();

        commits.sort_by(|a, b| {
            b.committed_at
                .cmp(&a.committed_at)
                .then_with(|| a.hash.cmp(&b.hash))
        });
        Ok(commits)
    }

    fn is_ancestor(&self, ancestor: &CommitInfo, descendant: &CommitInfo) -> Result<bool> {
        Ok(self.reachable(&descendant.hash).contains(&ancestor.hash))
    }

    fn root_commits(&self, from: &CommitInfo) -> Result<Vec<CommitInfo>> {
        let mut roots: Vec<CommitInfo> = self
            .reachable(&from.hash)
            .into_iter()
            .filter_map(|hash| self.commits.get(&hash).cloned())
            .filter(|commit| commit.parents.is_empty())
            .collect();

        roots.sort_by(|a, b| a.hash.cmp(&b.hash));
        Ok(roots)
    }
}
