use crate::domain::ReleaseResult;

use super::facts::ReleaseFacts;

/// Assign success, failure and time to restore to releases ordered newest first
///
/// A release failed when the next newer release restores it; the newest
/// release is always successful. When a success follows a failure streak, the
/// successful release that ended the streak receives the time between the
/// streak's oldest failure and itself.
///
/// Runs over every release, visible or not, so window edges see their real
/// neighbours.
pub fn classify(facts: &mut [ReleaseFacts]) {
    let mut known_good: Option<usize> = None;

    for i in 0..facts.len() {
        let newer = i.checked_sub(1).map(|j| {
            let newer = &facts[j];
            (
                newer.restores_previous,
                newer.release.result,
                newer.release.date,
            )
        });

        let is_success = newer.map_or(true, |(restores, _, _)| !restores);
        if !is_success {
            facts[i].release.result = ReleaseResult::failure();
            continue;
        }

        facts[i].release.result = ReleaseResult::success();
        if let (Some((_, newer_result, failed_at)), Some(good)) = (newer, known_good) {
            if !newer_result.is_success {
                let restored_at = facts[good].release.date;
                facts[good].release.result =
                    ReleaseResult::restored_after(restored_at - failed_at);
            }
        }
        known_good = Some(i);
    }
}
