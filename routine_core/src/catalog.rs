//! Exercise catalog access.
//!
//! The generator only ever asks two questions of a catalog: "what is active?"
//! and "what trains this muscle group?". Sources:
//! - a CSV export of the primary exercise database
//! - a folder tree `root/<group>/<exercise>/<image>` (secondary store)
//! - the built-in bilingual default set, used when nothing else is configured

use crate::images::first_image_in;
use crate::muscle::{normalize, same_group};
use crate::types::*;
use crate::Result;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Read-only exercise lookup consumed by the generator
pub trait ExerciseCatalog: Send + Sync {
    /// Every exercise available for generation
    fn all_active(&self) -> Vec<CatalogExercise>;

    /// Exercises whose muscle groups include `group` (Spanish or English label)
    fn by_muscle_group(&self, group: &str) -> Vec<CatalogExercise> {
        self.all_active()
            .into_iter()
            .filter(|e| e.muscle_groups.iter().any(|g| same_group(g, group)))
            .collect()
    }
}

/// Candidates for every group of a plan, keyed by the group label as planned
pub fn collect_candidates(catalog: &dyn ExerciseCatalog, groups: &[String]) -> CandidatesByGroup {
    groups
        .iter()
        .map(|group| (group.clone(), catalog.by_muscle_group(group)))
        .collect()
}

/// Candidate list for `group`, tolerating Spanish/English label differences
pub fn candidates_for<'a>(candidates: &'a CandidatesByGroup, group: &str) -> &'a [CatalogExercise] {
    candidates
        .get(group)
        .or_else(|| {
            candidates
                .iter()
                .find(|(key, _)| same_group(key, group))
                .map(|(_, list)| list)
        })
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Catalog held entirely in memory
#[derive(Clone, Debug, Default)]
pub struct InMemoryCatalog {
    exercises: Vec<CatalogExercise>,
}

impl ExerciseCatalog for InMemoryCatalog {
    fn all_active(&self) -> Vec<CatalogExercise> {
        self.exercises.clone()
    }
}

/// One row of the catalog CSV export
#[derive(Debug, Deserialize)]
struct CsvRow {
    name: String,
    #[serde(default)]
    localized_name: Option<String>,
    muscle_groups: String,
    #[serde(default)]
    equipment: Option<String>,
    #[serde(default)]
    difficulty: Option<u8>,
    #[serde(default)]
    exercise_type: Option<String>,
    #[serde(default)]
    image_path: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    instructions: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_exercise_type(s: &str) -> ExerciseType {
    match normalize(s).as_str() {
        "cardio" => ExerciseType::Cardio,
        "mobility" | "movilidad" | "flexibility" | "flexibilidad" => ExerciseType::Mobility,
        _ => ExerciseType::Strength,
    }
}

impl CsvRow {
    fn into_exercise(self, base: &Path) -> CatalogExercise {
        let muscle_groups = self
            .muscle_groups
            .split(';')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();

        CatalogExercise {
            name: self.name.trim().to_string(),
            localized_name: non_empty(self.localized_name),
            muscle_groups,
            equipment: non_empty(self.equipment),
            difficulty: self.difficulty,
            exercise_type: non_empty(self.exercise_type)
                .map(|t| parse_exercise_type(&t))
                .unwrap_or_default(),
            image_path: non_empty(self.image_path).map(|p| base.join(p)),
            image_data: None,
            description: non_empty(self.description),
            instructions: non_empty(self.instructions),
        }
    }
}

impl InMemoryCatalog {
    pub fn new(exercises: Vec<CatalogExercise>) -> Self {
        Self { exercises }
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn exercises(&self) -> &[CatalogExercise] {
        &self.exercises
    }

    /// Load a catalog from a CSV export
    ///
    /// Columns: `name,localized_name,muscle_groups,equipment,difficulty,
    /// exercise_type,image_path,description,instructions`. Muscle groups are
    /// `;`-separated. Relative image paths resolve against the CSV's directory.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(path)?;

        let mut exercises = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let exercise = row?.into_exercise(base);
            if exercise.name.is_empty() {
                tracing::warn!("Skipping catalog row with empty name in {:?}", path);
                continue;
            }
            exercises.push(exercise);
        }

        tracing::info!("Loaded {} exercises from {:?}", exercises.len(), path);
        Ok(Self::new(exercises))
    }

    /// Seed a catalog from `root/<muscle group>/<exercise>/<image files>`
    ///
    /// Only exercise folders holding at least one image are included.
    /// A missing root yields an empty catalog.
    pub fn from_folder_tree(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            tracing::debug!("Exercise folder {:?} not found, folder catalog empty", root);
            return Ok(Self::default());
        }

        let mut group_dirs: Vec<_> = std::fs::read_dir(root)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect();
        group_dirs.sort();

        let mut exercises = Vec::new();
        for group_dir in group_dirs {
            let group = dir_name(&group_dir);

            let mut exercise_dirs: Vec<_> = match std::fs::read_dir(&group_dir) {
                Ok(entries) => entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .collect(),
                Err(e) => {
                    tracing::warn!("Unable to read {:?}: {}. Skipping group.", group_dir, e);
                    continue;
                }
            };
            exercise_dirs.sort();

            for exercise_dir in exercise_dirs {
                if let Some(image) = first_image_in(&exercise_dir) {
                    let mut exercise = CatalogExercise::new(dir_name(&exercise_dir), &[group.as_str()]);
                    exercise.image_path = Some(image);
                    exercises.push(exercise);
                }
            }
        }

        tracing::info!("Seeded {} exercises from folder {:?}", exercises.len(), root);
        Ok(Self::new(exercises))
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            if exercise.name.trim().is_empty() {
                errors.push("Exercise has empty name".to_string());
                continue;
            }
            if !seen.insert(normalize(&exercise.name)) {
                errors.push(format!("Duplicate exercise name '{}'", exercise.name));
            }
            if exercise.muscle_groups.is_empty() {
                errors.push(format!("Exercise '{}' has no muscle group", exercise.name));
            }
            if let Some(difficulty) = exercise.difficulty {
                if !(1..=3).contains(&difficulty) {
                    errors.push(format!(
                        "Exercise '{}': difficulty {} outside 1..=3",
                        exercise.name, difficulty
                    ));
                }
            }
        }

        errors
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Catalog that consults several sources in priority order
///
/// For a muscle group, layers are read until `min_candidates` distinct
/// exercises have been collected (primary store, then secondary, then folder).
pub struct LayeredCatalog {
    layers: Vec<Box<dyn ExerciseCatalog>>,
    min_candidates: usize,
}

impl LayeredCatalog {
    pub fn new(min_candidates: usize) -> Self {
        Self {
            layers: Vec::new(),
            min_candidates,
        }
    }

    pub fn with_layer(mut self, layer: impl ExerciseCatalog + 'static) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

fn push_unique(into: &mut Vec<CatalogExercise>, seen: &mut HashSet<String>, items: Vec<CatalogExercise>) {
    for item in items {
        if seen.insert(normalize(&item.name)) {
            into.push(item);
        }
    }
}

impl ExerciseCatalog for LayeredCatalog {
    fn all_active(&self) -> Vec<CatalogExercise> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for layer in &self.layers {
            push_unique(&mut out, &mut seen, layer.all_active());
        }
        out
    }

    fn by_muscle_group(&self, group: &str) -> Vec<CatalogExercise> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for (i, layer) in self.layers.iter().enumerate() {
            if i > 0 && out.len() >= self.min_candidates {
                break;
            }
            push_unique(&mut out, &mut seen, layer.by_muscle_group(group));
        }
        out
    }
}

// ============================================================================
// Built-in catalog
// ============================================================================

/// Cached built-in catalog - built once and reused
static DEFAULT_CATALOG: Lazy<InMemoryCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached built-in catalog
pub fn default_catalog() -> &'static InMemoryCatalog {
    &DEFAULT_CATALOG
}

/// Builds the small built-in exercise set used when no catalog is configured
pub fn build_default_catalog() -> InMemoryCatalog {
    use crate::muscle::*;

    // (name, localized, group, equipment, difficulty)
    let rows: &[(&str, &str, &str, &str, u8)] = &[
        ("Bench Press", "Press de Banca", CHEST, "Barbell", 2),
        ("Incline Dumbbell Press", "Press Inclinado con Mancuernas", CHEST, "Dumbbells", 2),
        ("Push-Up", "Flexiones", CHEST, "Bodyweight", 1),
        ("Dumbbell Fly", "Aperturas con Mancuernas", CHEST, "Dumbbells", 1),
        ("Cable Crossover", "Cruce de Poleas", CHEST, "Machine", 2),
        ("Lat Pulldown", "Jalón al Pecho", BACK, "Machine", 1),
        ("Barbell Row", "Remo con Barra", BACK, "Barbell", 2),
        ("Seated Cable Row", "Remo en Polea Baja", BACK, "Machine", 1),
        ("One-Arm Dumbbell Row", "Remo con Mancuerna", BACK, "Dumbbells", 1),
        ("Pull-Up", "Dominadas", BACK, "Bodyweight", 3),
        ("Barbell Squat", "Sentadilla con Barra", LEGS, "Barbell", 2),
        ("Leg Press", "Prensa de Piernas", LEGS, "Machine", 1),
        ("Walking Lunge", "Zancadas", LEGS, "Dumbbells", 1),
        ("Leg Extension", "Extensión de Cuádriceps", LEGS, "Machine", 1),
        ("Romanian Deadlift", "Peso Muerto Rumano", LEGS, "Barbell", 3),
        ("Overhead Press", "Press Militar", SHOULDERS, "Barbell", 2),
        ("Lateral Raise", "Elevaciones Laterales", SHOULDERS, "Dumbbells", 1),
        ("Front Raise", "Elevaciones Frontales", SHOULDERS, "Dumbbells", 1),
        ("Face Pull", "Face Pull en Polea", SHOULDERS, "Machine", 2),
        ("Barbell Curl", "Curl con Barra", BICEPS, "Barbell", 1),
        ("Hammer Curl", "Curl Martillo", BICEPS, "Dumbbells", 1),
        ("Preacher Curl", "Curl en Banco Scott", BICEPS, "Machine", 2),
        ("Triceps Pushdown", "Extensión de Tríceps en Polea", TRICEPS, "Machine", 1),
        ("Bench Dip", "Fondos en Banco", TRICEPS, "Bodyweight", 1),
        ("Overhead Triceps Extension", "Extensión de Tríceps sobre la Cabeza", TRICEPS, "Dumbbells", 2),
        ("Hip Thrust", "Empuje de Cadera con Barra", GLUTES, "Barbell", 2),
        ("Glute Bridge", "Puente de Glúteos", GLUTES, "Bodyweight", 1),
        ("Cable Kickback", "Patada de Glúteo en Polea", GLUTES, "Machine", 1),
        ("Bulgarian Split Squat", "Sentadilla Búlgara", GLUTES, "Dumbbells", 3),
        ("Plank", "Plancha", CORE, "Bodyweight", 1),
        ("Crunch", "Abdominales", CORE, "Bodyweight", 1),
        ("Russian Twist", "Giro Ruso", CORE, "Bodyweight", 2),
        ("Hanging Leg Raise", "Elevación de Piernas Colgado", CORE, "Bodyweight", 3),
        ("Kettlebell Swing", "Swing con Kettlebell", FULL_BODY, "Kettlebell", 2),
    ];

    let mut exercises: Vec<CatalogExercise> = rows
        .iter()
        .map(|(name, localized, group, equipment, difficulty)| {
            CatalogExercise::new(*name, &[*group])
                .with_localized_name(*localized)
                .with_equipment(*equipment)
                .with_difficulty(*difficulty)
        })
        .collect();

    exercises.push(
        CatalogExercise::new("Burpee", &[FULL_BODY, CORE])
            .with_localized_name("Burpees")
            .with_equipment("Bodyweight")
            .with_difficulty(2)
            .with_type(ExerciseType::Cardio)
            .with_instructions("Keep a steady pace and land softly"),
    );
    exercises.push(
        CatalogExercise::new("Rowing Machine", &[FULL_BODY])
            .with_localized_name("Remo en Máquina")
            .with_equipment("Machine")
            .with_difficulty(1)
            .with_type(ExerciseType::Cardio),
    );

    InMemoryCatalog::new(exercises)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_catalog_validates() {
        let catalog = build_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_default_catalog_covers_every_planned_group() {
        let catalog = default_catalog();
        for days in 1..=7 {
            let plan = crate::split::plan(days, FitnessLevel::Beginner, 30);
            for group in crate::split::distinct_groups(&plan) {
                assert!(
                    !catalog.by_muscle_group(&group).is_empty(),
                    "no built-in exercise for {group}"
                );
            }
        }
    }

    #[test]
    fn test_by_muscle_group_accepts_spanish_label() {
        let catalog = build_default_catalog();
        let chest = catalog.by_muscle_group("Pecho");
        assert!(chest.iter().any(|e| e.name == "Bench Press"));
        assert!(chest.iter().all(|e| e.muscle_groups.contains(&"Chest".to_string())));
    }

    #[test]
    fn test_validate_reports_problems() {
        let catalog = InMemoryCatalog::new(vec![
            CatalogExercise::new("Curl", &["Biceps"]),
            CatalogExercise::new("curl", &["Biceps"]),
            CatalogExercise::new("Mystery", &[]),
            CatalogExercise::new("Hard", &["Back"]).with_difficulty(9),
            CatalogExercise::new("  ", &["Back"]),
        ]);
        let errors = catalog.validate();
        assert_eq!(errors.len(), 4, "{errors:?}");
    }

    #[test]
    fn test_from_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("exercises.csv");
        fs::write(
            &csv_path,
            "name,localized_name,muscle_groups,equipment,difficulty,exercise_type,image_path,description,instructions\n\
             Bench Press,Press de Banca,Pecho;Tríceps,Barbell,2,,img/bench.png,,Retract the shoulder blades\n\
             Treadmill,Cinta,Full Body,Machine,,cardio,,,\n",
        )
        .unwrap();

        let catalog = InMemoryCatalog::from_csv(&csv_path).unwrap();
        assert_eq!(catalog.len(), 2);

        let bench = &catalog.exercises()[0];
        assert_eq!(bench.localized_name.as_deref(), Some("Press de Banca"));
        assert_eq!(bench.muscle_groups, vec!["Pecho", "Tríceps"]);
        assert_eq!(bench.difficulty, Some(2));
        assert_eq!(bench.image_path, Some(temp_dir.path().join("img/bench.png")));
        assert_eq!(bench.instructions.as_deref(), Some("Retract the shoulder blades"));

        let treadmill = &catalog.exercises()[1];
        assert_eq!(treadmill.exercise_type, ExerciseType::Cardio);
        assert_eq!(treadmill.difficulty, None);
        assert!(treadmill.image_path.is_none());

        assert_eq!(catalog.by_muscle_group("Triceps").len(), 1);
    }

    #[test]
    fn test_from_csv_missing_file_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(InMemoryCatalog::from_csv(&temp_dir.path().join("nope.csv")).is_err());
    }

    #[test]
    fn test_from_folder_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Chest/Press de Banca")).unwrap();
        fs::write(root.join("Chest/Press de Banca/b.png"), b"png").unwrap();
        fs::write(root.join("Chest/Press de Banca/a.jpg"), b"jpg").unwrap();
        fs::create_dir_all(root.join("Chest/Sin Imagen")).unwrap();
        fs::write(root.join("Chest/Sin Imagen/notes.txt"), b"txt").unwrap();
        fs::create_dir_all(root.join("Espalda/Remo")).unwrap();
        fs::write(root.join("Espalda/Remo/remo.webp"), b"webp").unwrap();

        let catalog = InMemoryCatalog::from_folder_tree(root).unwrap();
        assert_eq!(catalog.len(), 2);

        let chest = catalog.by_muscle_group("Pecho");
        assert_eq!(chest.len(), 1);
        assert_eq!(chest[0].name, "Press de Banca");
        assert_eq!(chest[0].image_path, Some(root.join("Chest/Press de Banca/a.jpg")));

        assert_eq!(catalog.by_muscle_group("Back")[0].name, "Remo");
    }

    #[test]
    fn test_folder_tree_missing_root_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let catalog = InMemoryCatalog::from_folder_tree(&temp_dir.path().join("missing")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_layered_catalog_tops_up_from_secondary() {
        let primary = InMemoryCatalog::new(vec![
            CatalogExercise::new("Press de Banca", &["Chest"]),
            CatalogExercise::new("Remo", &["Back"]),
        ]);
        let secondary = InMemoryCatalog::new(vec![
            CatalogExercise::new("press de banca", &["Chest"]),
            CatalogExercise::new("Aperturas", &["Chest"]),
            CatalogExercise::new("Fondos", &["Chest"]),
        ]);
        let layered = LayeredCatalog::new(2)
            .with_layer(primary)
            .with_layer(secondary);

        let chest: Vec<_> = layered
            .by_muscle_group("Chest")
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(chest, vec!["Press de Banca", "Aperturas", "Fondos"]);
        assert_eq!(layered.all_active().len(), 4);
    }

    #[test]
    fn test_layered_catalog_stops_when_primary_suffices() {
        let primary = InMemoryCatalog::new(vec![
            CatalogExercise::new("A", &["Chest"]),
            CatalogExercise::new("B", &["Chest"]),
        ]);
        let secondary = InMemoryCatalog::new(vec![CatalogExercise::new("C", &["Chest"])]);
        let layered = LayeredCatalog::new(2)
            .with_layer(primary)
            .with_layer(secondary);
        assert_eq!(layered.by_muscle_group("Chest").len(), 2);
    }
}
