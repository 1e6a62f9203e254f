use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::error::{FourKeysError, Result};
use crate::git::{CommitInfo, TagRef};

/// Field separator (ASCII unit separator) inside one formatted commit
const FIELD_SEPARATOR: char = '\x1f';
/// Record separator (ASCII record separator) between formatted commits
const RECORD_SEPARATOR: char = '\x1e';
/// `git log` format producing hash, strict ISO committer date, parents and raw body
const COMMIT_FORMAT: &str = "--format=%H%x1f%cI%x1f%P%x1f%B%x1e";

/// Repository queries answered by the native `git` executable
///
/// Output-equivalent to [super::Git2Repository]; a local `git` binary is
/// usually considerably faster than libgit2 for long histories.
pub struct GitCliRepository {
    workdir: PathBuf,
}

impl GitCliRepository {
    /// Open the repository containing `path`
    ///
    /// Fails when `git` cannot be executed or `path` is not inside a repository.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = GitCliRepository {
            workdir: path.as_ref().to_path_buf(),
        };
        let git_dir = repo.run_ok(&["rev-parse", "--git-dir"])?;
        debug!("Opened git repository at {:?} via git CLI", git_dir.trim());

        Ok(repo)
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        Command::new("git")
            .arg("-C")
            .arg(&self.workdir)
            .args(args)
            .output()
            .map_err(|e| FourKeysError::backend(format!("Failed to execute git: {}", e)))
    }

    fn run_ok(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FourKeysError::backend(format!(
                "git {} failed with exit code {}: {}",
                args.first().unwrap_or(&""),
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn log(&self, args: &[&str]) -> Result<Vec<CommitInfo>> {
        parse_commit_records(&self.run_ok(&log_args(args))?)
    }
}

/// `git log` arguments whose output does not depend on user configuration
///
/// `log.showSignature` would interleave GPG output with the records.
fn log_args<'a>(args: &[&'a str]) -> Vec<&'a str> {
    let mut full_args = vec!["log", "--no-show-signature", COMMIT_FORMAT];
    full_args.extend_from_slice(args);
    full_args
}

/// Parse `git log` output produced with [COMMIT_FORMAT]
fn parse_commit_records(output: &str) -> Result<Vec<CommitInfo>> {
    output
        .split(RECORD_SEPARATOR)
        .map(|record| record.trim_start_matches('\n'))
        .filter(|record| !record.trim().is_empty())
        .map(parse_commit_record)
        .collect()
}

fn parse_commit_record(record: &str) -> Result<CommitInfo> {
    let mut fields = record.splitn(4, FIELD_SEPARATOR);
    let (Some(hash), Some(date), Some(parents), Some(message)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(FourKeysError::backend(format!(
            "Malformed git log record: {:?}",
            record
        )));
    };

    let committed_at: DateTime<FixedOffset> = DateTime::parse_from_rfc3339(date.trim())
        .map_err(|e| {
            FourKeysError::backend(format!("Invalid committer date '{}': {}", date, e))
        })?;

    Ok(CommitInfo {
        hash: hash.trim().to_string(),
        committed_at,
        message: message.to_string(),
        parents: parents.split_whitespace().map(str::to_string).collect(),
    })
}

impl super::Repository for GitCliRepository {
    fn list_tags(&self) -> Result<Vec<TagRef>> {
        let output = self.run_ok(&[
            "for-each-ref",
            "--format=%(refname:strip=2)%09%(objectname)",
            "refs/tags",
        ])?;

        Ok(output
            .lines()
            .filter_map(|line| line.split_once('\t'))
            .map(|(name, target)| TagRef::new(name, target.trim()))
            .collect())
    }

    fn resolve_tag_commit(&self, tag: &TagRef) -> Result<CommitInfo> {
        let peeled = format!("{}^{{commit}}", tag.target);
        let mut commits = self.log(&["-1", &peeled, "--"])?;

        commits.pop().ok_or_else(|| {
            FourKeysError::backend(format!("Tag '{}' does not point at a commit", tag.name))
        })
    }

    fn log_window(
        &self,
        from: &CommitInfo,
        exclude: Option<&CommitInfo>,
        since: Option<DateTime<FixedOffset>>,
    ) -> Result<Vec<CommitInfo>> {
        let hidden = exclude.map(|commit| format!("^{}", commit.hash));
        let mut args = vec!["--date-order", from.hash.as_str()];
        if let Some(hidden) = hidden.as_deref() {
            args.push(hidden);
        }
        args.push("--");

        let mut commits = self.log(&args)?;
        if let Some(since) = since {
            commits.retain(|commit| commit.committed_at >= since);
        }

        Ok(commits)
    }

    fn is_ancestor(&self, ancestor: &CommitInfo, descendant: &CommitInfo) -> Result<bool> {
        if ancestor.hash == descendant.hash {
            return Ok(true);
        }

        let output = self.run(&[
            "merge-base",
            "--is-ancestor",
            &ancestor.hash,
            &descendant.hash,
        ])?;

        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            code => Err(FourKeysError::backend(format!(
                "git merge-base failed with exit code {}: {}",
                code.unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    fn root_commits(&self, from: &CommitInfo) -> Result<Vec<CommitInfo>> {
        self.log(&["--max-parents=0", &from.hash, "--"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commit_records() {
        let output = "aaa\x1f2020-10-09T11:49:30+02:00\x1fbbb ccc\x1fMerge hotfix\n\nbody\n\x1e\n\
                      bbb\x1f2020-10-08T09:00:00+00:00\x1f\x1finitial\n\x1e\n";

        let commits = parse_commit_records(output).unwrap();
        assert_eq!(commits.len(), 2);

        assert_eq!(commits[0].hash, "aaa");
        assert_eq!(commits[0].parents, vec!["bbb", "ccc"]);
        assert_eq!(commits[0].message, "Merge hotfix\n\nbody\n");
        assert_eq!(commits[0].committed_at.offset().local_minus_utc(), 7200);

        assert_eq!(commits[1].hash, "bbb");
        assert!(commits[1].parents.is_empty());
    }

    #[test]
    fn test_log_args_disable_signatures() {
        let args = log_args(&["-1", "abc", "--"]);
        assert_eq!(&args[..3], &["log", "--no-show-signature", COMMIT_FORMAT]);
        assert_eq!(&args[3..], &["-1", "abc", "--"]);
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_commit_records("").unwrap().is_empty());
        assert!(parse_commit_records("\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_malformed_record() {
        assert!(parse_commit_record("only-a-hash").is_err());
        assert!(parse_commit_record("aaa\x1fnot a date\x1f\x1fmsg").is_err());
    }
}
