//! Best-container selection for compare-all responses.

use std::collections::BTreeMap;

use crate::model::ContainerOutcome;

/// Picks the winning container of a compare-all run.
///
/// Selection rule, in order: maximum `summary.placed`, then maximum
/// `summary.utilization_area`, residual ties resolved by the map's
/// iteration order with the first qualifying entry winning. The input map
/// iterates in a fixed order, so repeated evaluation of identical input
/// always names the same winner.
///
/// Returns `None` only for an empty map. The caller renders every entry,
/// not just the winner.
pub fn select_best(results: &BTreeMap<String, ContainerOutcome>) -> Option<&str> {
    let mut best: Option<(&str, &ContainerOutcome)> = None;
    for (code, outcome) in results {
        let better = match best {
            None => true,
            Some((_, current)) => {
                let placed = outcome.result.summary.placed;
                let current_placed = current.result.summary.placed;
                placed > current_placed
                    || (placed == current_placed
                        && outcome.result.summary.utilization_area
                            > current.result.summary.utilization_area)
            }
        };
        if better {
            best = Some((code.as_str(), outcome));
        }
    }
    best.map(|(code, _)| code)
}
