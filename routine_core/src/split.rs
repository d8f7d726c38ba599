//! Weekly muscle-group split planner.
//!
//! The split is a fixed lookup on training days per week. Level and age are
//! accepted so callers do not have to change when personalisation lands, but
//! the table does not branch on them today.

use crate::muscle::{BACK, BICEPS, CHEST, CORE, FULL_BODY, GLUTES, LEGS, SHOULDERS, TRICEPS};
use crate::{FitnessLevel, MuscleGroupDay};

/// Plan the week for the requested number of training days
///
/// Out-of-range values (0 or more than 7) get a single full-body day.
/// Identical inputs always yield identical output.
pub fn plan(days_per_week: u8, level: FitnessLevel, age: u32) -> Vec<MuscleGroupDay> {
    let table: &[&[&str]] = match days_per_week {
        1 => &[&[CHEST, BACK, LEGS, CORE]],
        2 => &[
            &[CHEST, BACK, LEGS, CORE],
            &[SHOULDERS, BICEPS, TRICEPS, GLUTES, CORE],
        ],
        3 => &[
            &[CHEST, SHOULDERS, TRICEPS],
            &[BACK, BICEPS],
            &[LEGS, GLUTES, CORE],
        ],
        4 => &[
            &[CHEST, SHOULDERS, TRICEPS],
            &[LEGS, GLUTES],
            &[BACK, BICEPS],
            &[LEGS, CORE],
        ],
        5 => &[
            &[CHEST, TRICEPS],
            &[BACK, BICEPS],
            &[LEGS],
            &[SHOULDERS, CORE],
            &[GLUTES, CORE],
        ],
        6 => &[
            &[CHEST],
            &[BACK],
            &[LEGS],
            &[SHOULDERS],
            &[BICEPS],
            &[TRICEPS, CORE],
        ],
        7 => &[
            &[CHEST],
            &[BACK],
            &[LEGS],
            &[SHOULDERS],
            &[BICEPS],
            &[TRICEPS],
            &[CORE, FULL_BODY],
        ],
        _ => &[&[CHEST, BACK, LEGS]],
    };

    tracing::debug!(
        days_per_week,
        ?level,
        age,
        planned_days = table.len(),
        "split.plan"
    );

    table
        .iter()
        .enumerate()
        .map(|(i, groups)| MuscleGroupDay::new(format!("Day {}", i + 1), groups))
        .collect()
}

/// Every distinct muscle group used by a plan, in first-seen order.
pub fn distinct_groups(plan: &[MuscleGroupDay]) -> Vec<String> {
    let mut groups: Vec<String> = Vec::new();
    for day in plan {
        for group in &day.muscle_groups {
            if !groups.contains(group) {
                groups.push(group.clone());
            }
        }
    }
    groups
}
