use crate::domain::{QueryOption, Release};
use crate::error::Result;
use crate::git::Repository;
use crate::observer::{QueryObserver, TimerGuard};

use super::classifier::classify;
use super::facts::compute_release_facts;
use super::tags::{build_sources, resolve_tags};

/// Query the releases of `repo` visible through `option`, newest first
///
/// Every tag not matching the ignore pattern takes part in lead time and
/// classification; the `[since, until]` window only selects which releases
/// are returned.
pub fn query_releases<R: Repository + ?Sized>(
    repo: &R,
    option: &QueryOption,
    observer: &dyn QueryObserver,
) -> Result<Vec<Release>> {
    let _timer = TimerGuard::start(observer, "QueryReleases");

    let resolved = {
        let _timer = TimerGuard::start(observer, "QueryTags");
        resolve_tags(repo)?
    };
    observer.on_trace(&format!("Tags count: {}", resolved.len()));

    let sources = build_sources(resolved, option, observer);
    observer.on_trace(&format!("Sources count: {}", sources.len()));

    let mut facts = compute_release_facts(&sources, option, repo, observer)?;
    classify(&mut facts);

    Ok(facts
        .into_iter()
        .filter(|fact| fact.visible)
        .map(|fact| fact.release)
        .collect())
}
