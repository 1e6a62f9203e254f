use tracing::debug;

use crate::domain::{QueryOption, ReleaseSource};
use crate::error::Result;
use crate::git::Repository;
use crate::observer::QueryObserver;

/// Pair every resolvable tag with its commit
///
/// Annotated tags are dereferenced to the commit they wrap. Tags whose target
/// cannot be resolved to a commit are dropped. The result is unordered.
pub fn resolve_tags<R: Repository + ?Sized>(repo: &R) -> Result<Vec<ReleaseSource>> {
    let tags = repo.list_tags()?;

    let mut sources = Vec::with_capacity(tags.len());
    for tag in tags {
        match repo.resolve_tag_commit(&tag) {
            Ok(commit) => sources.push(ReleaseSource::new(tag.name, commit)),
            Err(e) => debug!("Dropping unresolvable tag '{}': {}", tag.name, e),
        }
    }

    Ok(sources)
}

/// Order resolved tags newest first and drop ignored tag names
///
/// The sort is stable, so tags on commits with equal committer times keep
/// their enumeration order. The `[since, until]` window is not applied here;
/// releases outside it still bound their neighbours' commit windows.
pub fn build_sources(
    mut resolved: Vec<ReleaseSource>,
    option: &QueryOption,
    observer: &dyn QueryObserver,
) -> Vec<ReleaseSource> {
    resolved.sort_by(|a, b| b.date().cmp(&a.date()));

    resolved.retain(|source| {
        let ignored = option.should_ignore(&source.tag);
        if ignored {
            observer.on_trace(&format!("{} is ignored", source.tag));
        }
        !ignored
    });

    resolved
}
