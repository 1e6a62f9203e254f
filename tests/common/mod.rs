// Shared fixtures for integration tests
#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use four_keys::git::{self, BackendKind};

pub const DAY: i64 = 86_400;

/// 2022-01-01T00:00:00Z
pub const EPOCH: i64 = 1_640_995_200;

/// A throwaway repository whose commits carry explicit committer times
pub struct Fixture {
    pub dir: TempDir,
    pub repo: Repository,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Fixture { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Commit on HEAD at `EPOCH + seconds`
    pub fn commit(&self, message: &str, seconds: i64) -> Oid {
        let parents: Vec<Oid> = self
            .repo
            .head()
            .ok()
            .and_then(|head| head.target())
            .into_iter()
            .collect();
        self.commit_with_parents(Some("HEAD"), message, seconds, &parents)
    }

    /// Commit with explicit parents, optionally moving `update_ref`
    pub fn commit_with_parents(
        &self,
        update_ref: Option<&str>,
        message: &str,
        seconds: i64,
        parents: &[Oid],
    ) -> Oid {
        let tree_id = self.repo.treebuilder(None).unwrap().write().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let signature =
            Signature::new("Four Keys", "four-keys@example.com", &Time::new(EPOCH + seconds, 0))
                .unwrap();
        let parents: Vec<git2::Commit> = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        self.repo
            .commit(update_ref, &signature, &signature, message, &tree, &parent_refs)
            .unwrap()
    }

    pub fn tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    pub fn annotated_tag(&self, name: &str, target: Oid) {
        let object = self.repo.find_object(target, None).unwrap();
        let tagger = Signature::new("Four Keys", "four-keys@example.com", &Time::new(EPOCH, 0))
            .unwrap();
        self.repo
            .tag(name, &object, &tagger, &format!("Release {}", name), false)
            .unwrap();
    }

    /// v1 on the root commit at day 0, v2 at day 10, v3 at day 20 with a
    /// hotfix commit since v2
    pub fn three_releases() -> Self {
        let fixture = Fixture::new();
        let v1 = fixture.commit("initial commit", 0);
        fixture.commit("feat: login", 5 * DAY);
        let v2 = fixture.commit("feat: logout", 10 * DAY);
        fixture.commit("hotfix: logout crash", 15 * DAY);
        let v3 = fixture.commit("chore: release", 20 * DAY);

        fixture.tag("v1", v1);
        fixture.tag("v2", v2);
        fixture.annotated_tag("v3", v3);
        fixture
    }
}

pub fn at(seconds: i64) -> DateTime<FixedOffset> {
    Utc.timestamp_opt(EPOCH + seconds, 0).unwrap().fixed_offset()
}

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Backends to run a scenario against; the shell backend only when `git` is installed
pub fn backends() -> Vec<BackendKind> {
    let mut kinds = vec![BackendKind::Library];
    if git_available() {
        kinds.push(BackendKind::Shell);
    } else {
        eprintln!("git not found on PATH, skipping shell backend");
    }
    kinds
}

pub fn open(fixture: &Fixture, kind: BackendKind) -> Box<dyn git::Repository> {
    git::open(fixture.path(), kind).unwrap()
}
