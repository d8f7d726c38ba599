#![forbid(unsafe_code)]

//! Core domain model and business logic for the gym routine generator.
//!
//! This crate provides:
//! - Domain types (profiles, split days, catalog and generated exercises)
//! - Split planning and per-group exercise distribution
//! - Prompt building and model-response parsing for a local Ollama server
//! - Fuzzy exercise matching, reordering and image resolution
//! - The generation orchestrator with its classic (non-AI) fallback
//! - Rendering and persistence of generated routines

pub mod types;
pub mod error;
pub mod muscle;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod split;
pub mod distribution;
pub mod matcher;
pub mod images;
pub mod prompt;
pub mod parser;
pub mod reorder;
pub mod ollama;
pub mod fallback;
pub mod generator;
pub mod render;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, default_catalog, ExerciseCatalog, InMemoryCatalog};
pub use config::Config;
pub use generator::{GenerateOptions, RoutineGenerator};
pub use matcher::find_best;
pub use ollama::{ModelClient, ModelStatus, OllamaClient};
pub use render::render_routine;
pub use store::{load_routine, save_routine, SavedRoutine};
