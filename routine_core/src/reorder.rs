//! Exercise reordering by muscle group.
//!
//! Model output does not reliably follow the requested slot order, so the
//! parsed list is regrouped to match the day's muscle-group order afterwards.

use crate::catalog::candidates_for;
use crate::muscle::{contains_either_way, same_group};
use crate::{CandidatesByGroup, CatalogExercise, GeneratedExercise};

fn known_in(pool: &[CatalogExercise], name: &str) -> bool {
    pool.iter()
        .any(|candidate| candidate.names().any(|n| contains_either_way(n, name)))
}

/// Regroup `exercises` following `ordered_groups`
///
/// Each exercise goes to the first of the day's groups whose candidates
/// contain it. An exercise only known to another day's groups is dropped;
/// one unknown everywhere is kept under the first group. Relative order within
/// a group is preserved.
pub fn reorder(
    exercises: Vec<GeneratedExercise>,
    ordered_groups: &[String],
    candidates: &CandidatesByGroup,
) -> Vec<GeneratedExercise> {
    if exercises.is_empty() || ordered_groups.is_empty() {
        return exercises;
    }

    let mut buckets: Vec<Vec<GeneratedExercise>> = vec![Vec::new(); ordered_groups.len()];

    for exercise in exercises {
        let slot = ordered_groups
            .iter()
            .position(|group| known_in(candidates_for(candidates, group), &exercise.name));

        if let Some(slot) = slot {
            tracing::debug!(exercise = %exercise.name, group = %ordered_groups[slot], "reorder.assigned");
            buckets[slot].push(exercise);
            continue;
        }

        let foreign = candidates.iter().find(|(group, pool)| {
            !ordered_groups.iter().any(|own| same_group(own, group)) && known_in(pool, &exercise.name)
        });

        match foreign {
            Some((group, _)) => {
                tracing::debug!(exercise = %exercise.name, %group, "reorder.dropped_other_day");
            }
            None => {
                tracing::debug!(exercise = %exercise.name, group = %ordered_groups[0], "reorder.defaulted");
                buckets[0].push(exercise);
            }
        }
    }

    buckets.into_iter().flatten().collect()
}
