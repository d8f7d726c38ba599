//! Prompt construction for one training day.
//!
//! The prompt lists the catalog candidates per muscle group, pins every
//! exercise slot to a group, gives level-appropriate sets/reps guidance and
//! demands a strict tagged output grammar that [`crate::parser`] understands.

use crate::catalog::candidates_for;
use crate::distribution::slot_groups;
use crate::types::goals_mention_strength;
use crate::{CandidatesByGroup, FitnessLevel, MuscleGroupDay, UserProfile};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

pub const TAG_EXERCISE: &str = "[EXERCISE]";
pub const TAG_SETS: &str = "[SETS]";
pub const TAG_INSTRUCTIONS: &str = "[INSTRUCTIONS]";
pub const TAG_END: &str = "[END]";

/// Default number of candidates listed per muscle group
pub const DEFAULT_CANDIDATE_CAP: usize = 10;

const VARIATION_PHRASES: [&str; 4] = [
    "Pick a varied and effective set of exercises.",
    "Choose a different combination of exercises than usual.",
    "Vary the exercise selection to keep training interesting.",
    "Create a unique routine with diverse exercises.",
];

/// Sampling parameters sent with a generation request
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u32>,
}

impl SamplingOptions {
    pub fn standard(num_predict: u32) -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            num_predict,
            seed: None,
        }
    }

    /// Hotter preset used for "alternative routine" requests
    pub fn alternative(num_predict: u32) -> Self {
        Self {
            temperature: 0.9,
            top_p: 0.95,
            top_k: 80,
            num_predict,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Sets/reps guidance for the client's level and goals
pub fn sets_reps_guide(level: FitnessLevel, goals: &[String]) -> &'static str {
    match level {
        FitnessLevel::Advanced if goals_mention_strength(goals) => {
            "ADVANCED - STRENGTH:\n\
             - Heavy compound lifts (bench press, squat, deadlift, overhead press): 3 x 6-8 reps, first set as a progressive warm-up\n\
             - Cable or accessory work: 3 x 8-10 reps\n\
             - Only 3 working sets in total per exercise"
        }
        FitnessLevel::Advanced => {
            "ADVANCED - HYPERTROPHY:\n\
             - Compound exercises: 4 x 8-10 reps\n\
             - Isolation exercises: 3 x 10-12 reps"
        }
        FitnessLevel::Intermediate => {
            "INTERMEDIATE:\n\
             - Compound exercises: 3-4 x 10-12 reps\n\
             - Isolation exercises: 3 x 12-15 reps"
        }
        FitnessLevel::Beginner => {
            "BEGINNER:\n\
             - All exercises: 3 x 12-15 reps\n\
             - Focus on correct technique"
        }
    }
}

/// Build the prompt for `day`
///
/// `variation` is only supplied for alternative routines: it shuffles each
/// group's candidate list and adds a variation phrase. With `None` the output
/// is a pure function of the other arguments.
pub fn build_prompt<R: Rng + ?Sized>(
    profile: &UserProfile,
    day: &MuscleGroupDay,
    candidates: &CandidatesByGroup,
    distribution: &[usize],
    mut variation: Option<&mut R>,
    cap: usize,
) -> String {
    let total: usize = distribution.iter().sum();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "You are an expert personal trainer. Generate exercises for: {}\n",
        day.label
    );
    let _ = writeln!(
        out,
        "CLIENT: {}, {} years, {}, {}",
        profile.name, profile.age, profile.gender, profile.level
    );
    let _ = writeln!(out, "MUSCLE GROUPS: {}", day.muscle_groups.join(", "));
    if !profile.goals.is_empty() {
        let _ = writeln!(out, "GOALS: {}", profile.goals.join(", "));
    }
    out.push('\n');

    out.push_str("EXACT EXERCISE DISTRIBUTION:\n");
    for (group, count) in day.muscle_groups.iter().zip(distribution) {
        let _ = writeln!(out, "- {}: {} exercises", group, count);
    }
    out.push('\n');

    out.push_str("AVAILABLE EXERCISES:\n");
    for group in &day.muscle_groups {
        let pool = candidates_for(candidates, group);
        if pool.is_empty() {
            continue;
        }
        let mut names: Vec<&str> = pool.iter().map(|e| e.name.as_str()).collect();
        if let Some(rng) = variation.as_deref_mut() {
            names.shuffle(rng);
        }
        let _ = writeln!(out, "=== {} ===", group.to_uppercase());
        for name in names.into_iter().take(cap) {
            let _ = writeln!(out, "- {}", name);
        }
        out.push('\n');
    }

    if let Some(rng) = variation.as_deref_mut() {
        let phrase = VARIATION_PHRASES[rng.gen_range(0..VARIATION_PHRASES.len())];
        let _ = writeln!(out, "{}\n", phrase);
    }

    let _ = writeln!(
        out,
        "SETS AND REPS RULES:\n{}\n",
        sets_reps_guide(profile.level, &profile.goals)
    );

    let _ = writeln!(
        out,
        "STRICT ORDER:\nGenerate EXACTLY {} EXERCISES in this mandatory order:",
        total
    );
    for (slot, group_index) in slot_groups(distribution).into_iter().enumerate() {
        if let Some(group) = day.muscle_groups.get(group_index) {
            let _ = writeln!(
                out,
                "Exercise #{}: pick from === {} ===",
                slot + 1,
                group.to_uppercase()
            );
        }
    }
    out.push('\n');

    let _ = writeln!(out, "MANDATORY RULES:");
    let _ = writeln!(out, "1. Generate ONLY {} exercises, no more and no less", total);
    let _ = writeln!(out, "2. COPY the EXACT name from the list (do not translate, do not invent)");
    let _ = writeln!(out, "3. Follow the numbered order above");
    let _ = writeln!(out, "4. No extra text, commentary or explanations");
    let _ = writeln!(out, "5. No emoji and no markdown code fences (```)");
    let _ = writeln!(out, "6. Respect the sets/reps rules for the client's level\n");

    let _ = writeln!(out, "MANDATORY FORMAT:");
    let _ = writeln!(out, "{}Exact name copied from the list", TAG_EXERCISE);
    let _ = writeln!(out, "{}3 x 12", TAG_SETS);
    let _ = writeln!(out, "{}Keep correct posture and breathe steadily", TAG_INSTRUCTIONS);
    let _ = writeln!(out, "{}\n", TAG_END);

    let _ = write!(
        out,
        "GENERATE THE {} EXERCISES NOW (STOP AFTER {} #{}):",
        total, TAG_END, total
    );

    tracing::debug!(day = %day.label, chars = out.len(), "prompt.built");
    out
}
