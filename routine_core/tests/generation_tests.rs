//! End-to-end generation tests against a mock model server.

use routine_core::distribution::distribute;
use routine_core::split::plan;
use routine_core::*;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PUSH_DAY_REPLY: &str = "\
```
[EXERCISE]Triceps Pushdown
[SETS]3x12
[INSTRUCTIONS]Elbows pinned to the sides
[END]
[EXERCISE]Press de Banca [SETS]4 x 8 [INSTRUCTIONS]Shoulder blades retracted
[END]
[EXERCISE]Overhead Press
3 x 10
[END]
[EXERCISE]Dumbbell Fly [SETS]3 x 12
[END]
[EXERCISE]Lat Pulldown [SETS]3 x 10
[END]
[EXERCISE]Lateral Raise [SETS]3 x 15
[END]
```";

fn profile() -> UserProfile {
    UserProfile {
        name: "Ana".into(),
        age: 30,
        gender: "F".into(),
        level: "Intermedio".parse().unwrap(),
        days_per_week: 3,
        goals: vec!["Ganar fuerza".into()],
    }
}

async fn server_with_tags() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{ "name": "mistral:7b" }]
        })))
        .mount(&server)
        .await;
    server
}

fn generator_for(server: &MockServer) -> RoutineGenerator {
    let mut config = Config::default();
    config.ollama.base_url = server.uri();
    let client = OllamaClient::from_config(&config.ollama).unwrap();
    RoutineGenerator::new(Arc::new(build_default_catalog()), config).with_model(Arc::new(client))
}

#[test]
fn test_plan_and_distribution_for_reference_profile() {
    let profile = profile();
    let days = plan(profile.days_per_week, profile.level, profile.age);
    let groups: Vec<Vec<&str>> = days
        .iter()
        .map(|d| d.muscle_groups.iter().map(String::as_str).collect())
        .collect();

    assert_eq!(
        groups,
        vec![
            vec!["Chest", "Shoulders", "Triceps"],
            vec!["Back", "Biceps"],
            vec!["Legs", "Glutes", "Core"],
        ]
    );
    assert_eq!(distribute(days[0].muscle_groups.len(), 5), vec![2, 2, 1]);
    assert_eq!(days, plan(3, FitnessLevel::Intermediate, 30));
}

#[tokio::test]
async fn test_model_error_status_falls_back_to_classic() {
    let server = server_with_tags().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let result = generator_for(&server)
        .generate(&profile(), &GenerateOptions::default())
        .await
        .unwrap();

    assert!(!result.generated_with_ai);
    assert_eq!(result.days.len(), 3);
    assert!(result.days.iter().all(|d| !d.exercises.is_empty()));
    assert!(result.days.iter().all(|d| d.source == DaySource::Classic));
}

#[tokio::test]
async fn test_unreachable_server_is_not_an_error() {
    let mut config = Config::default();
    config.ollama.base_url = "http://127.0.0.1:9".into();
    let client = OllamaClient::from_config(&config.ollama).unwrap();
    let generator = RoutineGenerator::new(Arc::new(build_default_catalog()), config)
        .with_model(Arc::new(client));

    let result = generator
        .generate(&profile(), &GenerateOptions::default())
        .await
        .unwrap();
    assert!(!result.generated_with_ai);
    assert!(result.total_exercises() > 0);
}

#[tokio::test]
async fn test_end_to_end_with_model_reply() {
    let server = server_with_tags().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains("=== CHEST ==="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mistral:7b",
            "response": PUSH_DAY_REPLY,
            "done": true
        })))
        .mount(&server)
        .await;

    let result = generator_for(&server)
        .generate(&profile(), &GenerateOptions { seed: Some(42), ..Default::default() })
        .await
        .unwrap();

    assert!(result.generated_with_ai);
    assert_eq!(result.days.len(), 3);
    assert!(result.total_exercises() <= 15);
    assert!(result.days.iter().all(|d| d.exercises.len() <= 5));

    // Lat Pulldown belongs to the back day and is dropped; the rest is
    // regrouped Chest -> Shoulders -> Triceps and cut to five.
    let push = &result.days[0];
    assert_eq!(push.source, DaySource::Model);
    let names: Vec<&str> = push.exercises.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Press de Banca", "Dumbbell Fly", "Overhead Press", "Lateral Raise", "Triceps Pushdown"]
    );
    assert_eq!(push.exercises[0].sets_reps, "4 x 8");
    assert_eq!(push.exercises[2].sets_reps, "3 x 10");

    // Other days never matched the mock and were built classically
    assert_eq!(result.days[1].source, DaySource::Classic);
    assert_eq!(result.days[2].source, DaySource::Classic);
}

#[tokio::test]
async fn test_alternative_request_uses_hotter_sampling() {
    let server = server_with_tags().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_string_contains("\"top_k\":80"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": PUSH_DAY_REPLY
        })))
        .expect(3)
        .mount(&server)
        .await;

    let options = GenerateOptions {
        alternative: true,
        seed: Some(1),
        use_ai: true,
    };
    let result = generator_for(&server).generate(&profile(), &options).await.unwrap();
    assert!(result.generated_with_ai);
}
