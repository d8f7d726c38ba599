//! Classic (non-AI) day generation.
//!
//! Picks exercises straight from the catalog candidates: the same per-group
//! distribution the prompt asks the model for, filtered for the client's level
//! and age, with sets/reps from a fixed prescription table.

use crate::catalog::candidates_for;
use crate::distribution::distribute;
use crate::muscle::normalize;
use crate::{
    CandidatesByGroup, CatalogExercise, DaySource, ExerciseType, FitnessLevel, GeneratedExercise,
    MuscleGroupDay, UserProfile, WorkoutDay,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

/// Clients at or above this age get lower volume and joint-friendly equipment
pub const SENIOR_AGE: u32 = 50;

/// Equipment keywords allowed for senior clients (English and Spanish)
const SENIOR_EQUIPMENT: &[&str] = &[
    "bodyweight",
    "body weight",
    "peso corporal",
    "dumbbell",
    "mancuerna",
    "resistance",
    "band",
    "banda",
    "elastic",
    "machine",
    "maquina",
];

/// Sets/reps for an exercise of `exercise_type` given the client profile
pub fn prescription(profile: &UserProfile, exercise_type: ExerciseType) -> String {
    let senior = profile.age >= SENIOR_AGE;

    if exercise_type == ExerciseType::Cardio {
        let minutes = if senior { "10-15" } else { "15-20" };
        return format!("1 x {} min", minutes);
    }

    let reps = match profile.level {
        FitnessLevel::Beginner => "8-10",
        FitnessLevel::Intermediate => "10-12",
        FitnessLevel::Advanced => "12-15",
    };
    let sets = if senior {
        2
    } else if profile.level == FitnessLevel::Beginner {
        3
    } else {
        4
    };

    format!("{} x {}", sets, reps)
}

/// Whether an exercise suits the client's level and age
///
/// Unknown difficulty or equipment never excludes an exercise.
pub fn suits_profile(exercise: &CatalogExercise, profile: &UserProfile) -> bool {
    let max_difficulty = match profile.level {
        FitnessLevel::Beginner => Some(1),
        FitnessLevel::Intermediate => Some(2),
        FitnessLevel::Advanced => None,
    };
    if let (Some(max), Some(difficulty)) = (max_difficulty, exercise.difficulty) {
        if difficulty > max {
            return false;
        }
    }

    if profile.age >= SENIOR_AGE {
        if let Some(equipment) = exercise.equipment.as_deref() {
            let equipment = normalize(equipment);
            if !SENIOR_EQUIPMENT.iter().any(|k| equipment.contains(k)) {
                return false;
            }
        }
    }

    true
}

/// Candidates for one group after profile filtering
///
/// Falls back to the unfiltered pool when filtering leaves nothing.
pub fn filter_for_profile<'a>(
    pool: &'a [CatalogExercise],
    profile: &UserProfile,
) -> Vec<&'a CatalogExercise> {
    let filtered: Vec<&CatalogExercise> = pool.iter().filter(|e| suits_profile(e, profile)).collect();
    if filtered.is_empty() {
        pool.iter().collect()
    } else {
        filtered
    }
}

fn to_generated(exercise: &CatalogExercise, profile: &UserProfile) -> GeneratedExercise {
    let instructions = exercise
        .instructions
        .clone()
        .or_else(|| exercise.description.clone())
        .unwrap_or_default();
    GeneratedExercise::new(
        exercise.name.clone(),
        prescription(profile, exercise.exercise_type),
        instructions,
    )
}

/// Build one day without the model
///
/// Each group gets its share of `exercises_per_day`; short groups are topped
/// up from the other groups' remaining candidates. The day may still come out
/// shorter when the catalog simply has too few exercises.
pub fn classic_day<R: Rng + ?Sized>(
    profile: &UserProfile,
    day: &MuscleGroupDay,
    candidates: &CandidatesByGroup,
    exercises_per_day: usize,
    rng: &mut R,
) -> WorkoutDay {
    let groups = &day.muscle_groups;
    let shares = distribute(groups.len(), exercises_per_day);
    let pools: Vec<Vec<&CatalogExercise>> = groups
        .iter()
        .map(|group| filter_for_profile(candidates_for(candidates, group), profile))
        .collect();

    let mut used: HashSet<String> = HashSet::new();
    let mut picked: Vec<Vec<&CatalogExercise>> = vec![Vec::new(); groups.len()];

    for (i, pool) in pools.iter().enumerate() {
        let share = shares.get(i).copied().unwrap_or(0);
        let fresh: Vec<&CatalogExercise> = pool
            .iter()
            .copied()
            .filter(|e| !used.contains(&normalize(&e.name)))
            .collect();
        for &exercise in fresh.choose_multiple(rng, share) {
            used.insert(normalize(&exercise.name));
            picked[i].push(exercise);
        }
    }

    let mut total: usize = picked.iter().map(Vec::len).sum();
    for (i, pool) in pools.iter().enumerate() {
        if total >= exercises_per_day {
            break;
        }
        let mut fresh: Vec<&CatalogExercise> = pool
            .iter()
            .copied()
            .filter(|e| !used.contains(&normalize(&e.name)))
            .collect();
        fresh.shuffle(rng);
        for exercise in fresh.into_iter().take(exercises_per_day - total) {
            used.insert(normalize(&exercise.name));
            picked[i].push(exercise);
            total += 1;
        }
    }

    let exercises: Vec<GeneratedExercise> = picked
        .into_iter()
        .flatten()
        .map(|e| to_generated(e, profile))
        .collect();

    tracing::debug!(day = %day.label, count = exercises.len(), "fallback.classic_day");

    WorkoutDay {
        name: day.label.clone(),
        exercises,
        muscle_groups: groups.clone(),
        source: DaySource::Classic,
    }
}
