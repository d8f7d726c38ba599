use clap::{Parser, Subcommand};
use routine_core::matcher::{find_best_with_tier, MatchTier};
use routine_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "gymroutine")]
#[command(about = "AI-assisted gym routine generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Load configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a weekly routine for a client
    Generate {
        /// Client name
        #[arg(long, default_value = "Client")]
        name: String,

        /// Client age in years
        #[arg(long, default_value_t = 30)]
        age: u32,

        /// Client gender, free text
        #[arg(long, default_value = "")]
        gender: String,

        /// Fitness level (beginner/intermediate/advanced, Spanish labels accepted)
        #[arg(long, default_value = "beginner")]
        level: String,

        /// Training days per week (1-7)
        #[arg(long)]
        days: u8,

        /// Training goal, repeat for several
        #[arg(long = "goal")]
        goals: Vec<String>,

        /// Generate an alternative routine (more variation)
        #[arg(long)]
        alternative: bool,

        /// Seed for reproducible selection
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the model and use the classic generator
        #[arg(long)]
        no_ai: bool,

        /// Print the result as JSON instead of text
        #[arg(long)]
        json: bool,

        /// Save the routine (with its profile) to this JSON file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Save the routine under the data directory (`routines/<id>.json`)
        #[arg(long, conflicts_with = "output")]
        save: bool,

        /// Model server base URL
        #[arg(long)]
        ollama_url: Option<String>,

        /// Model name
        #[arg(long)]
        model: Option<String>,

        /// Exercise catalog CSV
        #[arg(long)]
        catalog_csv: Option<PathBuf>,

        /// Exercise folder tree (<group>/<exercise>/<image>)
        #[arg(long)]
        exercise_dir: Option<PathBuf>,
    },

    /// Show the weekly muscle-group split
    Split {
        /// Training days per week
        #[arg(long)]
        days: u8,

        /// Fitness level
        #[arg(long, default_value = "beginner")]
        level: String,

        /// Client age in years
        #[arg(long, default_value_t = 30)]
        age: u32,
    },

    /// Find the catalog exercise that best matches a name
    Match {
        /// Exercise name to look up
        query: String,

        /// Exercise catalog CSV (built-in set when omitted)
        #[arg(long)]
        catalog_csv: Option<PathBuf>,
    },

    /// Check the model server and installed models
    Status {
        /// Model server base URL
        #[arg(long)]
        ollama_url: Option<String>,

        /// Model name
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    routine_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Generate {
            name,
            age,
            gender,
            level,
            days,
            goals,
            alternative,
            seed,
            no_ai,
            json,
            output,
            save,
            ollama_url,
            model,
            catalog_csv,
            exercise_dir,
        } => {
            let mut config = config;
            if let Some(url) = ollama_url {
                config.ollama.base_url = url;
            }
            if let Some(model) = model {
                config.ollama.model = model;
            }
            if catalog_csv.is_some() {
                config.catalog.csv_path = catalog_csv;
            }
            if exercise_dir.is_some() {
                config.catalog.exercise_dir = exercise_dir;
            }
            if no_ai {
                config.generation.use_ai = false;
            }

            let profile = UserProfile {
                name,
                age,
                gender,
                level: level.parse()?,
                days_per_week: days,
                goals,
            };
            let options = GenerateOptions {
                alternative,
                seed,
                use_ai: !no_ai,
            };
            let destination = match output {
                Some(path) => Some(SaveTo::File(path)),
                None if save => Some(SaveTo::DataDir),
                None => None,
            };
            cmd_generate(&config, profile, options, json, destination).await
        }
        Commands::Split { days, level, age } => {
            cmd_split(&config, days, level.parse()?, age)
        }
        Commands::Match { query, catalog_csv } => cmd_match(&query, catalog_csv.as_deref()),
        Commands::Status { ollama_url, model } => {
            let mut config = config;
            if let Some(url) = ollama_url {
                config.ollama.base_url = url;
            }
            if let Some(model) = model {
                config.ollama.model = model;
            }
            cmd_status(&config).await
        }
    }
}

/// Where `generate` writes the saved routine
enum SaveTo {
    File(PathBuf),
    DataDir,
}

async fn cmd_generate(
    config: &Config,
    profile: UserProfile,
    options: GenerateOptions,
    json: bool,
    destination: Option<SaveTo>,
) -> Result<()> {
    let generator = RoutineGenerator::from_config(config)?;
    let result = generator.generate(&profile, &options).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_routine(&profile, &result));
    }

    if let Some(destination) = destination {
        let saved = SavedRoutine::new(profile, result);
        let path = match destination {
            SaveTo::File(path) => path,
            SaveTo::DataDir => saved.default_path(&config.data.data_dir),
        };
        save_routine(&path, &saved)?;
        if !json {
            println!("\n✓ Routine saved to {}", path.display());
        }
    }

    Ok(())
}

fn cmd_split(config: &Config, days: u8, level: FitnessLevel, age: u32) -> Result<()> {
    let per_day = config.generation.exercises_per_day;
    let plan = routine_core::split::plan(days, level, age);
    for day in &plan {
        let distribution = routine_core::distribution::distribute(day.muscle_groups.len(), per_day);
        println!(
            "{}: {}  {:?}",
            day.label,
            day.muscle_groups.join(", "),
            distribution
        );
    }
    Ok(())
}

fn cmd_match(query: &str, catalog_csv: Option<&Path>) -> Result<()> {
    let loaded;
    let catalog = match catalog_csv {
        Some(path) => {
            loaded = InMemoryCatalog::from_csv(path)?;
            &loaded
        }
        None => default_catalog(),
    };

    match find_best_with_tier(query, catalog.exercises()) {
        Some((exercise, tier)) => {
            let tier = match tier {
                MatchTier::Exact => "exact",
                MatchTier::Substring => "partial",
                MatchTier::Keyword => "keyword",
            };
            print!("{}", exercise.name);
            if let Some(localized) = &exercise.localized_name {
                print!(" ({})", localized);
            }
            println!(" [{}]", tier);
            println!("  Muscle groups: {}", exercise.muscle_groups.join(", "));
            if let Some(equipment) = &exercise.equipment {
                println!("  Equipment: {}", equipment);
            }
        }
        None => println!("No match for '{}'", query),
    }
    Ok(())
}

async fn cmd_status(config: &Config) -> Result<()> {
    let client = OllamaClient::from_config(&config.ollama)?;
    let status = client.status().await;
    println!("{}", status.report());
    Ok(())
}
