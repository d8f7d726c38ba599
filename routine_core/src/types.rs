//! Core domain types for the routine generator.
//!
//! This module defines the fundamental types used throughout the system:
//! - Client profile and fitness level
//! - Weekly muscle-group split days
//! - Catalog exercises (read-only input) and generated exercises (output)
//! - Workout days and the aggregated generation result

use crate::muscle::normalize;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Highest accepted client age; anything above is treated as a data-entry bug.
pub const MAX_AGE: u32 = 120;

// ============================================================================
// Profile Types
// ============================================================================

/// Training experience of the client
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FitnessLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl FromStr for FitnessLevel {
    type Err = Error;

    /// Accepts English and Spanish labels ("Intermediate", "Intermedio", ...).
    fn from_str(s: &str) -> Result<Self> {
        let key = normalize(s);
        match key.as_str() {
            "beginner" | "principiante" | "novice" | "basico" => Ok(FitnessLevel::Beginner),
            "intermediate" | "intermedio" => Ok(FitnessLevel::Intermediate),
            "advanced" | "avanzado" | "expert" | "experto" => Ok(FitnessLevel::Advanced),
            _ => Err(Error::InvalidProfile(format!("unknown fitness level '{}'", s))),
        }
    }
}

impl fmt::Display for FitnessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FitnessLevel::Beginner => "Beginner",
            FitnessLevel::Intermediate => "Intermediate",
            FitnessLevel::Advanced => "Advanced",
        };
        f.write_str(label)
    }
}

/// Client data captured by the trainer. Immutable for one generation request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub level: FitnessLevel,
    pub days_per_week: u8,
    #[serde(default)]
    pub goals: Vec<String>,
}

impl UserProfile {
    /// Reject profiles that can only come from an integration bug.
    pub fn validate(&self) -> Result<()> {
        if !(1..=7).contains(&self.days_per_week) {
            return Err(Error::InvalidProfile(format!(
                "days_per_week must be between 1 and 7, got {}",
                self.days_per_week
            )));
        }
        if self.age == 0 || self.age > MAX_AGE {
            return Err(Error::InvalidProfile(format!(
                "age must be between 1 and {}, got {}",
                MAX_AGE, self.age
            )));
        }
        Ok(())
    }

    /// True when any goal mentions strength ("strength", "fuerza").
    pub fn wants_strength(&self) -> bool {
        goals_mention_strength(&self.goals)
    }
}

pub(crate) fn goals_mention_strength(goals: &[String]) -> bool {
    goals.iter().any(|goal| {
        let goal = normalize(goal);
        goal.contains("strength") || goal.contains("fuerz")
    })
}

// ============================================================================
// Split Types
// ============================================================================

/// One training day of the weekly split. Group order drives exercise order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MuscleGroupDay {
    pub label: String,
    pub muscle_groups: Vec<String>,
}

impl MuscleGroupDay {
    pub fn new(label: impl Into<String>, groups: &[&str]) -> Self {
        Self {
            label: label.into(),
            muscle_groups: groups.iter().map(|g| (*g).to_string()).collect(),
        }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Broad kind of exercise, used for sets/reps prescription
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    #[default]
    Strength,
    Cardio,
    Mobility,
}

/// A stored exercise record. Read-only to the generator.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct CatalogExercise {
    pub name: String,
    #[serde(default)]
    pub localized_name: Option<String>,
    pub muscle_groups: Vec<String>,
    #[serde(default)]
    pub equipment: Option<String>,
    /// 1 = beginner friendly, 3 = advanced
    #[serde(default)]
    pub difficulty: Option<u8>,
    #[serde(default)]
    pub exercise_type: ExerciseType,
    #[serde(default)]
    pub image_path: Option<PathBuf>,
    #[serde(default, skip_serializing)]
    pub image_data: Option<Vec<u8>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
}

impl CatalogExercise {
    pub fn new(name: impl Into<String>, groups: &[&str]) -> Self {
        Self {
            name: name.into(),
            muscle_groups: groups.iter().map(|g| (*g).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_localized_name(mut self, localized: impl Into<String>) -> Self {
        self.localized_name = Some(localized.into());
        self
    }

    pub fn with_equipment(mut self, equipment: impl Into<String>) -> Self {
        self.equipment = Some(equipment.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_type(mut self, exercise_type: ExerciseType) -> Self {
        self.exercise_type = exercise_type;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    /// Primary name followed by the localized name, if any.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.localized_name.as_deref())
    }

    /// Whether the record carries an image of its own.
    pub fn has_image(&self) -> bool {
        self.image_data.as_ref().is_some_and(|d| !d.is_empty()) || self.image_path.is_some()
    }
}

/// Catalog candidates keyed by muscle group, as offered to one generation run
pub type CandidatesByGroup = BTreeMap<String, Vec<CatalogExercise>>;

// ============================================================================
// Output Types
// ============================================================================

/// Where an attached image was found
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Catalog,
    Folder,
    FolderPartialMatch,
}

/// Image attached to a generated exercise. Bytes are never serialized.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseImage {
    pub path: Option<PathBuf>,
    #[serde(skip)]
    pub data: Option<Vec<u8>>,
    pub source: ImageSource,
}

/// One exercise of a generated workout day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratedExercise {
    pub name: String,
    pub sets_reps: String,
    pub instructions: String,
    #[serde(default)]
    pub image: Option<ExerciseImage>,
}

impl GeneratedExercise {
    pub fn new(
        name: impl Into<String>,
        sets_reps: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            sets_reps: sets_reps.into(),
            instructions: instructions.into(),
            image: None,
        }
    }
}

/// Which path produced a workout day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DaySource {
    Model,
    Classic,
}

/// Terminal output unit handed to the UI/export layers
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutDay {
    pub name: String,
    pub exercises: Vec<GeneratedExercise>,
    #[serde(default)]
    pub muscle_groups: Vec<String>,
    pub source: DaySource,
}

/// A full routine plus how it was produced
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationResult {
    pub days: Vec<WorkoutDay>,
    pub generated_with_ai: bool,
    pub elapsed_ms: u64,
    pub message: String,
}

impl GenerationResult {
    pub fn total_exercises(&self) -> usize {
        self.days.iter().map(|d| d.exercises.len()).sum()
    }
}
