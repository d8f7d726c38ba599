//! Configuration file support for the routine generator.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/gymroutine/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub data: DataConfig,
}

/// Model server configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OllamaConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound for one generate call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            num_predict: default_num_predict(),
        }
    }
}

/// Routine generation parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    #[serde(default = "default_exercises_per_day")]
    pub exercises_per_day: usize,

    /// Candidates listed per muscle group in the prompt
    #[serde(default = "default_candidates_per_group")]
    pub candidates_per_group: usize,

    #[serde(default = "default_use_ai")]
    pub use_ai: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            exercises_per_day: default_exercises_per_day(),
            candidates_per_group: default_candidates_per_group(),
            use_ai: default_use_ai(),
        }
    }
}

/// Exercise catalog sources
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfig {
    /// CSV export of the primary exercise database
    #[serde(default)]
    pub csv_path: Option<PathBuf>,

    /// Folder tree `<group>/<exercise>/<image>` used as secondary store and image source
    #[serde(default)]
    pub exercise_dir: Option<PathBuf>,

    /// Layers are consulted until this many candidates are found for a group
    #[serde(default = "default_min_candidates")]
    pub min_candidates: usize,

    /// Refuse to start when the CSV catalog has validation problems
    #[serde(default)]
    pub strict: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            exercise_dir: None,
            min_candidates: default_min_candidates(),
            strict: false,
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:11434".into()
}

fn default_model() -> String {
    "mistral:7b".into()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_num_predict() -> u32 {
    3000
}

fn default_exercises_per_day() -> usize {
    5
}

fn default_candidates_per_group() -> usize {
    10
}

fn default_use_ai() -> bool {
    true
}

fn default_min_candidates() -> usize {
    5
}

fn home_dir_or_cwd() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir_or_cwd().join(".local/share"));
    base.join("gymroutine")
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir_or_cwd().join(".config"));
        base.join("gymroutine").join("config.toml")
    }

    /// Reject values the generator cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.generation.exercises_per_day == 0 {
            return Err(Error::Config("generation.exercises_per_day must be at least 1".into()));
        }
        if self.generation.candidates_per_group == 0 {
            return Err(Error::Config("generation.candidates_per_group must be at least 1".into()));
        }
        if self.ollama.timeout_secs == 0 {
            return Err(Error::Config("ollama.timeout_secs must be at least 1".into()));
        }
        Url::parse(&self.ollama.base_url).map_err(|e| {
            Error::Config(format!("ollama.base_url '{}' is invalid: {}", self.ollama.base_url, e))
        })?;
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
