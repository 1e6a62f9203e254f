//! Version-control backend abstraction layer
//!
//! This module provides a trait-based abstraction over the read-only git
//! queries the release engine needs, allowing the library-backed and the
//! native-shell implementations to be swapped per query.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete
//! implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [shell::GitCliRepository]: An implementation invoking the native `git` binary
//! - [mock::MockRepository]: An in-memory commit graph for testing
//!
//! # Usage
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations; [open] picks one from a [BackendKind].
//!
//! ```rust,no_run
//! # use four_keys::git::{open, BackendKind};
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = open(".", BackendKind::Library)?;
//! for tag in repo.list_tags()? {
//!     let commit = repo.resolve_tag_commit(&tag)?;
//!     println!("{} -> {}", tag.name, commit.hash);
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;
pub mod shell;

pub use mock::MockRepository;
pub use repository::Git2Repository;
pub use shell::GitCliRepository;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{FourKeysError, Result};

/// A tag reference as enumerated from the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    /// Short tag name (e.g. "v1.2.0")
    pub name: String,
    /// Hash the ref points at: a commit for lightweight tags, a tag object otherwise
    pub target: String,
}

impl TagRef {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        TagRef {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// Commit information needed for lead time and restoration analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full commit hash
    pub hash: String,
    /// Committer timestamp, keeping the committer's UTC offset
    pub committed_at: DateTime<FixedOffset>,
    /// Full commit message
    pub message: String,
    /// Parent commit hashes
    pub parents: Vec<String>,
}

/// Which backend implementation answers repository queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// libgit2 through the `git2` crate
    #[default]
    Library,
    /// The native `git` executable
    Shell,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Library => write!(f, "library"),
            BackendKind::Shell => write!(f, "shell"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = FourKeysError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "library" | "git2" => Ok(BackendKind::Library),
            "shell" | "git" => Ok(BackendKind::Shell),
            other => Err(FourKeysError::config(format!(
                "Unknown backend '{}', expected 'library' or 'shell'",
                other
            ))),
        }
    }
}

/// Read-only version-control queries used by the release engine
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync`; release windows are walked from
/// several worker threads against the same backend.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map their
/// underlying failures (`git2::Error`, process failures) to
/// [crate::error::FourKeysError] variants.
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository)
/// - [GitCliRepository](shell::GitCliRepository)
/// - [MockRepository](mock::MockRepository)
pub trait Repository: Send + Sync {
    /// Enumerate all tag references, in no particular order
    fn list_tags(&self) -> Result<Vec<TagRef>>;

    /// Resolve a tag to the commit it ultimately points at
    ///
    /// Annotated tags (including tags of tags) are dereferenced. Fails when the
    /// target is missing or does not lead to a commit.
    fn resolve_tag_commit(&self, tag: &TagRef) -> Result<CommitInfo>;

    /// Commits reachable from `from`, newest committer time first
    ///
    /// # Arguments
    /// * `from` - Commit to start walking from (included)
    /// * `exclude` - Commits reachable from this one are left out
    /// * `since` - Commits committed before this instant are left out
    fn log_window(
        &self,
        from: &CommitInfo,
        exclude: Option<&CommitInfo>,
        since: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<CommitInfo>>;

    /// True when `ancestor` is `descendant` or one of its ancestors
    fn is_ancestor(&self, ancestor: &CommitInfo, descendant: &CommitInfo) -> Result<bool>;

    /// Parentless commits reachable from `from`
    fn root_commits(&self, from: &CommitInfo) -> Result<Vec<CommitInfo>>;
}

/// Open the repository at `path` with the selected backend
pub fn open<P: AsRef<Path>>(path: P, kind: BackendKind) -> Result<Box<dyn Repository>> {
    match kind {
        BackendKind::Library => Ok(Box::new(Git2Repository::open(path)?)),
        BackendKind::Shell => Ok(Box::new(GitCliRepository::open(path)?)),
    }
}
