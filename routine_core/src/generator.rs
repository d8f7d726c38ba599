//! Routine generation orchestrator.
//!
//! Per day: prompt the model, parse, reorder, truncate. Any model failure
//! (unreachable, error status, timeout, nothing parseable) sends that day to
//! the classic generator instead. The model is an enhancement: the request
//! only fails for invalid input.

use crate::catalog::{
    candidates_for, collect_candidates, default_catalog, ExerciseCatalog, InMemoryCatalog,
    LayeredCatalog,
};
use crate::config::Config;
use crate::distribution::distribute;
use crate::fallback::{classic_day, prescription};
use crate::images::{CascadeImageResolver, FolderImageIndex, ImageResolver, NoImages};
use crate::matcher::find_best;
use crate::ollama::{ModelClient, OllamaClient};
use crate::parser::parse_response;
use crate::prompt::{build_prompt, SamplingOptions};
use crate::reorder::reorder;
use crate::split;
use crate::{
    CandidatesByGroup, CatalogExercise, DaySource, Error, GenerationResult, MuscleGroupDay,
    Result, UserProfile, WorkoutDay,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-request switches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Ask for a different routine: hotter sampling, shuffled candidates
    pub alternative: bool,
    /// Fixed seed for every random choice made by the core
    pub seed: Option<u64>,
    /// Allow the model path for this request
    pub use_ai: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            alternative: false,
            seed: None,
            use_ai: true,
        }
    }
}

/// Generates full weekly routines from a client profile
pub struct RoutineGenerator {
    catalog: Arc<dyn ExerciseCatalog>,
    model: Option<Arc<dyn ModelClient>>,
    images: Arc<dyn ImageResolver>,
    config: Config,
}

impl RoutineGenerator {
    /// Classic-only generator without images; add collaborators with the `with_*` methods
    pub fn new(catalog: Arc<dyn ExerciseCatalog>, config: Config) -> Self {
        Self {
            catalog,
            model: None,
            images: Arc::new(NoImages),
            config,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn ModelClient>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_images(mut self, images: Arc<dyn ImageResolver>) -> Self {
        self.images = images;
        self
    }

    /// Wire catalog layers, image cascade and model client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let mut layered = LayeredCatalog::new(config.catalog.min_candidates);
        if let Some(csv_path) = &config.catalog.csv_path {
            let primary = InMemoryCatalog::from_csv(csv_path)?;
            let problems = primary.validate();
            if config.catalog.strict && !problems.is_empty() {
                return Err(Error::CatalogValidation(format!(
                    "{}: {}",
                    csv_path.display(),
                    problems.join("; ")
                )));
            }
            for problem in problems {
                tracing::warn!("Catalog {:?}: {}", csv_path, problem);
            }
            layered = layered.with_layer(primary);
        }
        if let Some(dir) = &config.catalog.exercise_dir {
            layered = layered.with_layer(InMemoryCatalog::from_folder_tree(dir)?);
        }

        let catalog: Arc<dyn ExerciseCatalog> = if layered.is_empty() {
            tracing::info!("No catalog configured, using the built-in exercise set");
            Arc::new(default_catalog().clone())
        } else {
            Arc::new(layered)
        };

        let folder_index = config
            .catalog
            .exercise_dir
            .as_deref()
            .map(FolderImageIndex::build);
        let images = CascadeImageResolver::new(catalog.all_active(), folder_index);

        let mut generator = Self::new(catalog, config.clone()).with_images(Arc::new(images));
        if config.generation.use_ai {
            generator = generator.with_model(Arc::new(OllamaClient::from_config(&config.ollama)?));
        }
        Ok(generator)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate a routine for `profile`
    ///
    /// Returns `Err` only when the profile violates its contract.
    pub async fn generate(
        &self,
        profile: &UserProfile,
        options: &GenerateOptions,
    ) -> Result<GenerationResult> {
        profile.validate()?;
        let started = Instant::now();
        let mut rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let plan = split::plan(profile.days_per_week, profile.level, profile.age);
        let candidates = self.candidates_for_plan(&plan);
        let model = self.usable_model(options).await;
        let per_day = self.config.generation.exercises_per_day;

        tracing::info!(
            client = %profile.name,
            days = plan.len(),
            ai = model.is_some(),
            alternative = options.alternative,
            "Generating routine"
        );

        let mut days = Vec::with_capacity(plan.len());
        for day in &plan {
            let from_model = match model {
                Some(model) => self.model_day(model, profile, day, &candidates, options, &mut rng).await,
                None => None,
            };

            let mut workout = match from_model {
                Some(workout) => workout,
                None => classic_day(profile, day, &candidates, per_day, &mut rng),
            };
            if workout.exercises.is_empty() {
                tracing::warn!(day = %day.label, "No exercises available for day");
            }

            for exercise in &mut workout.exercises {
                exercise.image = self.images.find_image(&exercise.name);
            }
            days.push(workout);
        }

        let ai_days = days.iter().filter(|d| d.source == DaySource::Model).count();
        let message = if ai_days == days.len() {
            format!("Routine generated with AI ({})", self.model_label())
        } else if ai_days == 0 {
            "Routine generated with the classic method (AI unavailable)".to_string()
        } else {
            format!(
                "Routine generated with AI for {} of {} days, classic method for the rest",
                ai_days,
                days.len()
            )
        };
        let result = GenerationResult {
            generated_with_ai: ai_days > 0,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            message,
            days,
        };

        tracing::info!(
            exercises = result.total_exercises(),
            ai = result.generated_with_ai,
            elapsed_ms = result.elapsed_ms,
            "Routine generated"
        );
        Ok(result)
    }

    fn model_label(&self) -> &str {
        self.model.as_deref().map(|m| m.model_name()).unwrap_or("model")
    }

    fn candidates_for_plan(&self, plan: &[MuscleGroupDay]) -> CandidatesByGroup {
        let groups = split::distinct_groups(plan);
        if self.catalog.all_active().is_empty() {
            tracing::warn!("Exercise catalog is empty, falling back to the built-in set");
            return collect_candidates(default_catalog(), &groups);
        }
        collect_candidates(self.catalog.as_ref(), &groups)
    }

    async fn usable_model(&self, options: &GenerateOptions) -> Option<&dyn ModelClient> {
        if !options.use_ai || !self.config.generation.use_ai {
            return None;
        }
        let model = self.model.as_deref()?;
        if model.is_available().await {
            Some(model)
        } else {
            tracing::info!("Model server not available, using the classic method");
            None
        }
    }

    async fn model_day(
        &self,
        model: &dyn ModelClient,
        profile: &UserProfile,
        day: &MuscleGroupDay,
        candidates: &CandidatesByGroup,
        options: &GenerateOptions,
        rng: &mut StdRng,
    ) -> Option<WorkoutDay> {
        let per_day = self.config.generation.exercises_per_day;
        let distribution = distribute(day.muscle_groups.len(), per_day);

        let variation = if options.alternative { Some(&mut *rng) } else { None };
        let prompt = build_prompt(
            profile,
            day,
            candidates,
            &distribution,
            variation,
            self.config.generation.candidates_per_group,
        );
        tracing::debug!(day = %day.label, %prompt, "generator.prompt");

        let num_predict = self.config.ollama.num_predict;
        let sampling = if options.alternative {
            SamplingOptions::alternative(num_predict)
        } else {
            SamplingOptions::standard(num_predict)
        }
        .with_seed(rng.gen());

        let limit = Duration::from_secs(self.config.ollama.timeout_secs);
        let raw = match tokio::time::timeout(limit, model.generate(&prompt, &sampling)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(day = %day.label, "Model call failed, using classic method: {}", e);
                return None;
            }
            Err(_) => {
                tracing::warn!(day = %day.label, "Model call timed out after {:?}, using classic method", limit);
                return None;
            }
        };

        let parsed = parse_response(&raw, per_day, &day.muscle_groups, candidates);
        let mut exercises = reorder(parsed, &day.muscle_groups, candidates);
        if exercises.len() > per_day {
            tracing::debug!(day = %day.label, got = exercises.len(), "generator.truncated");
            exercises.truncate(per_day);
        }
        if exercises.is_empty() {
            tracing::warn!(day = %day.label, "Nothing usable in model output, using classic method");
            return None;
        }

        let day_pool: Vec<CatalogExercise> = day
            .muscle_groups
            .iter()
            .flat_map(|group| candidates_for(candidates, group))
            .cloned()
            .collect();
        for exercise in &mut exercises {
            if exercise.sets_reps.trim().is_empty() {
                let kind = find_best(&exercise.name, &day_pool)
                    .map(|c| c.exercise_type)
                    .unwrap_or_default();
                exercise.sets_reps = prescription(profile, kind);
            }
        }

        Some(WorkoutDay {
            name: day.label.clone(),
            exercises,
            muscle_groups: day.muscle_groups.clone(),
            source: DaySource::Model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FitnessLevel;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays canned responses in order; `None` entries fail the call
    struct ScriptedModel {
        available: bool,
        replies: Mutex<Vec<Option<String>>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Option<&str>>) -> Self {
            Self {
                available: true,
                replies: Mutex::new(replies.into_iter().rev().map(|r| r.map(String::from)).collect()),
                calls: AtomicUsize::new(0),
                delay: None,
            }
        }

        fn offline() -> Self {
            Self {
                available: false,
                ..Self::new(Vec::new())
            }
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedModel {
        fn model_name(&self) -> &str {
            "scripted"
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec!["scripted".into()])
        }

        async fn generate(&self, _prompt: &str, _options: &SamplingOptions) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.replies.lock().unwrap().pop().flatten();
            next.ok_or_else(|| Error::Model("scripted failure".into()))
        }
    }

    fn profile(days: u8) -> UserProfile {
        UserProfile {
            name: "Ana".into(),
            age: 30,
            gender: "F".into(),
            level: FitnessLevel::Intermediate,
            days_per_week: days,
            goals: vec!["Ganar fuerza".into()],
        }
    }

    fn generator(model: ScriptedModel) -> RoutineGenerator {
        RoutineGenerator::new(Arc::new(default_catalog().clone()), Config::default())
            .with_model(Arc::new(model))
    }

    const CHEST_DAY: &str = "\
[EXERCISE]Triceps Pushdown [SETS]3x12 [INSTRUCTIONS]Elbows tucked
[END]
[EXERCISE]Bench Press
4 x 8
[INSTRUCTIONS]Control the bar
[END]
[EXERCISE]Lateral Raise [SETS]3 x 15
[END]
[EXERCISE]Barbell Squat [SETS]4 x 6
[END]
[EXERCISE]Push-Up
[END]";

    #[tokio::test]
    async fn test_model_days_are_parsed_and_reordered() {
        crate::logging::init_test();
        let model = ScriptedModel::new(vec![Some(CHEST_DAY)]);
        let result = generator(model).generate(&profile(1), &GenerateOptions::default()).await;
        let result = result.unwrap();

        // Single day of Chest, Back, Legs, Core: unclassified names stay under Chest
        assert!(result.generated_with_ai);
        let day = &result.days[0];
        assert_eq!(day.source, DaySource::Model);
        assert_eq!(day.exercises.len(), 5);
        assert_eq!(day.exercises[1].name, "Bench Press");
        assert_eq!(day.exercises[4].name, "Barbell Squat");
    }

    #[tokio::test]
    async fn test_leaked_exercise_dropped_and_missing_sets_filled() {
        let model = ScriptedModel::new(vec![Some(CHEST_DAY), None, None]);
        let result = generator(model)
            .generate(&profile(3), &GenerateOptions { seed: Some(3), ..Default::default() })
            .await
            .unwrap();

        let day = &result.days[0];
        let names: Vec<_> = day.exercises.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bench Press", "Push-Up", "Lateral Raise", "Triceps Pushdown"]);
        // Parsed without sets: intermediate prescription
        assert_eq!(day.exercises[1].sets_reps, "4 x 10-12");
        assert_eq!(day.exercises[0].sets_reps, "4 x 8");

        assert_eq!(result.days[1].source, DaySource::Classic);
        assert_eq!(result.days[2].source, DaySource::Classic);
        assert!(result.generated_with_ai);
        assert!(result.message.contains("1 of 3"));
    }

    #[tokio::test]
    async fn test_offline_model_uses_classic_for_every_day() {
        let model = ScriptedModel::offline();
        let result = generator(model).generate(&profile(3), &GenerateOptions::default()).await.unwrap();

        assert!(!result.generated_with_ai);
        assert_eq!(result.days.len(), 3);
        assert!(result.days.iter().all(|d| d.source == DaySource::Classic));
        assert!(result.days.iter().all(|d| !d.exercises.is_empty() && d.exercises.len() <= 5));
        assert!(result.message.contains("classic"));
    }

    #[tokio::test]
    async fn test_unparseable_reply_falls_back_for_that_day() {
        let model = ScriptedModel::new(vec![Some("I cannot help with that.")]);
        let result = generator(model).generate(&profile(1), &GenerateOptions::default()).await.unwrap();
        assert_eq!(result.days[0].source, DaySource::Classic);
        assert!(!result.generated_with_ai);
    }

    #[tokio::test]
    async fn test_use_ai_off_never_calls_model() {
        let model = Arc::new(ScriptedModel::new(vec![Some(CHEST_DAY)]));
        let generator = RoutineGenerator::new(Arc::new(default_catalog().clone()), Config::default())
            .with_model(model.clone());
        let options = GenerateOptions { use_ai: false, ..Default::default() };
        let result = generator.generate(&profile(2), &options).await.unwrap();

        assert!(!result.generated_with_ai);
        assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_slow_model_times_out_to_classic() {
        let mut config = Config::default();
        config.ollama.timeout_secs = 1;
        let model = ScriptedModel {
            delay: Some(Duration::from_secs(5)),
            ..ScriptedModel::new(vec![Some(CHEST_DAY)])
        };
        let generator = RoutineGenerator::new(Arc::new(default_catalog().clone()), config)
            .with_model(Arc::new(model));
        let result = generator.generate(&profile(1), &GenerateOptions::default()).await.unwrap();
        assert_eq!(result.days[0].source, DaySource::Classic);
    }

    #[tokio::test]
    async fn test_seeded_classic_generation_is_reproducible() {
        let generator = RoutineGenerator::new(Arc::new(default_catalog().clone()), Config::default());
        let options = GenerateOptions { seed: Some(11), use_ai: false, ..Default::default() };
        let a = generator.generate(&profile(4), &options).await.unwrap();
        let b = generator.generate(&profile(4), &options).await.unwrap();
        assert_eq!(a.days, b.days);
    }

    #[tokio::test]
    async fn test_empty_catalog_uses_builtin_set() {
        let generator = RoutineGenerator::new(Arc::new(InMemoryCatalog::default()), Config::default());
        let options = GenerateOptions { use_ai: false, ..Default::default() };
        let result = generator.generate(&profile(3), &options).await.unwrap();
        assert!(result.total_exercises() > 0);
    }

    #[test]
    fn test_strict_catalog_rejects_invalid_csv() {
        let temp_dir = tempfile::tempdir().unwrap();
        let csv_path = temp_dir.path().join("exercises.csv");
        std::fs::write(
            &csv_path,
            "name,muscle_groups\nBench Press,Chest\nBench Press,Chest\nMystery,\n",
        )
        .unwrap();

        let mut config = Config::default();
        config.generation.use_ai = false;
        config.catalog.csv_path = Some(csv_path);
        assert!(RoutineGenerator::from_config(&config).is_ok());

        config.catalog.strict = true;
        match RoutineGenerator::from_config(&config) {
            Err(Error::CatalogValidation(msg)) => {
                assert!(msg.contains("Duplicate exercise name 'Bench Press'"), "{msg}");
                assert!(msg.contains("'Mystery' has no muscle group"), "{msg}");
            }
            other => panic!("expected catalog validation error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_invalid_profile_is_rejected() {
        let generator = RoutineGenerator::new(Arc::new(default_catalog().clone()), Config::default());
        let result = generator.generate(&profile(0), &GenerateOptions::default()).await;
        assert!(matches!(result, Err(Error::InvalidProfile(_))));
    }
}
