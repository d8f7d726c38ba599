//! Plain-text rendering of a generated routine.

use crate::{DaySource, GenerationResult, UserProfile};
use std::fmt::Write;

const RULE_WIDTH: usize = 50;

/// Display-ready text for the trainer: client info, goals, numbered
/// exercises per day and the generation mode.
pub fn render_routine(profile: &UserProfile, result: &GenerationResult) -> String {
    let mut out = String::new();
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);

    let _ = writeln!(out, "PERSONALIZED ROUTINE");
    let _ = writeln!(out, "{}\n", heavy);

    let _ = writeln!(out, "CLIENT");
    let _ = writeln!(out, "Name: {}", profile.name);
    let _ = writeln!(out, "Age: {} years", profile.age);
    if !profile.gender.trim().is_empty() {
        let _ = writeln!(out, "Gender: {}", profile.gender);
    }
    let _ = writeln!(out, "Level: {}", profile.level);
    let _ = writeln!(out, "Training days: {} days/week\n", profile.days_per_week);

    if !profile.goals.is_empty() {
        let _ = writeln!(out, "GOALS");
        for goal in &profile.goals {
            let _ = writeln!(out, "  - {}", goal);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "TRAINING PLAN");
    let _ = writeln!(out, "{}\n", light);

    for (i, day) in result.days.iter().enumerate() {
        let _ = write!(out, "DAY {}: {}", i + 1, day.name.to_uppercase());
        if !day.muscle_groups.is_empty() {
            let _ = write!(out, " ({})", day.muscle_groups.join(", "));
        }
        if day.source == DaySource::Classic && result.generated_with_ai {
            out.push_str(" [classic]");
        }
        out.push_str("\n\n");

        if day.exercises.is_empty() {
            let _ = writeln!(out, "   No exercises available for this day\n");
        }
        for (n, exercise) in day.exercises.iter().enumerate() {
            let _ = write!(out, "{}. {}", n + 1, exercise.name);
            if !exercise.sets_reps.is_empty() {
                let _ = write!(out, " - {}", exercise.sets_reps);
            }
            out.push('\n');
            if !exercise.instructions.is_empty() {
                let _ = writeln!(out, "   Note: {}", exercise.instructions);
            }
            if let Some(path) = exercise.image.as_ref().and_then(|img| img.path.as_ref()) {
                let _ = writeln!(out, "   Image: {}", path.display());
            }
            out.push('\n');
        }
    }

    let _ = writeln!(out, "{}", light);
    let _ = writeln!(
        out,
        "{} in {:.1}s",
        result.message,
        result.elapsed_ms as f64 / 1000.0
    );
    out.push('\n');

    let _ = writeln!(out, "IMPORTANT:");
    let _ = writeln!(out, "- Warm up 5-10 minutes before each session");
    let _ = writeln!(out, "- Rest 60-90 seconds between sets");
    let _ = write!(out, "- Keep good form on every exercise");

    out
}
