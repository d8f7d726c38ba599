//! Client for a local Ollama model server.
//!
//! Only two endpoints are used: `GET /api/tags` to list installed models (and
//! as the availability probe) and `POST /api/generate` with `stream: false`.

use crate::config::OllamaConfig;
use crate::prompt::SamplingOptions;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const TAGS_ENDPOINT: &str = "api/tags";
const GENERATE_ENDPOINT: &str = "api/generate";

/// Availability probes should answer quickly even when generation is slow
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Text-generation backend used by the orchestrator
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Identifier of the model prompts are sent to
    fn model_name(&self) -> &str;

    /// Cheap reachability check made before any prompt is sent
    async fn is_available(&self) -> bool;

    /// Names of the models installed on the server
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Raw completion text for `prompt`
    async fn generate(&self, prompt: &str, options: &SamplingOptions) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: &'a SamplingOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// HTTP client for an Ollama server
#[derive(Clone, Debug)]
pub struct OllamaClient {
    http: Client,
    base: Url,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid model server URL '{}': {}", base_url, e)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base,
            model: model.into(),
        })
    }

    pub fn from_config(config: &OllamaConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::Config(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Reachability plus whether the configured model is installed
    pub async fn status(&self) -> ModelStatus {
        let (reachable, installed_models) = match self.list_models().await {
            Ok(models) => (true, models),
            Err(e) => {
                tracing::warn!("Model server at {} unreachable: {}", self.base, e);
                (false, Vec::new())
            }
        };
        let model_installed = installed_models.iter().any(|m| model_matches(m, &self.model));

        ModelStatus {
            base_url: self.base.to_string(),
            model: self.model.clone(),
            reachable,
            installed_models,
            model_installed,
        }
    }
}

/// "mistral:7b" matches itself; "llama3" also matches "llama3:latest"
fn model_matches(installed: &str, wanted: &str) -> bool {
    installed == wanted
        || installed.strip_suffix(":latest") == Some(wanted)
        || wanted.strip_suffix(":latest") == Some(installed)
}

#[async_trait]
impl ModelClient for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn is_available(&self) -> bool {
        let Ok(url) = self.endpoint(TAGS_ENDPOINT) else {
            return false;
        };
        match self.http.get(url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Model server probe failed: {}", e);
                false
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let url = self.endpoint(TAGS_ENDPOINT)?;
        let response = self.http.get(url).timeout(PROBE_TIMEOUT).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::Model(format!("list models failed with status {}", status)));
        }

        let body = response.text().await?;
        let tags: TagsResponse = serde_json::from_str(&body)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn generate(&self, prompt: &str, options: &SamplingOptions) -> Result<String> {
        let url = self.endpoint(GENERATE_ENDPOINT)?;
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options,
        };

        tracing::debug!(model = %self.model, ?options, "ollama.generate");
        let response = self.http.post(url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Model(format!(
                "generate failed with status {}: {}",
                status, body
            )));
        }

        let body = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&body)?;
        tracing::debug!(chars = parsed.response.len(), response = %parsed.response, "ollama.response");
        Ok(parsed.response)
    }
}

/// Snapshot of the model server as seen by `gymroutine status`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ModelStatus {
    pub base_url: String,
    pub model: String,
    pub reachable: bool,
    pub installed_models: Vec<String>,
    pub model_installed: bool,
}

impl ModelStatus {
    /// Human-readable report with a fix-it hint when something is missing
    pub fn report(&self) -> String {
        if !self.reachable {
            return format!(
                "Model server: NOT REACHABLE at {}\n\
                 Start it with `ollama serve`; routines will be generated with the classic method meanwhile.",
                self.base_url
            );
        }

        let mut out = format!("Model server: running at {}\n", self.base_url);
        if self.installed_models.is_empty() {
            out.push_str("Installed models: none\n");
        } else {
            out.push_str("Installed models:\n");
            for model in &self.installed_models {
                out.push_str(&format!("  - {}\n", model));
            }
        }

        if self.model_installed {
            out.push_str(&format!("Configured model '{}' is installed.", self.model));
        } else {
            out.push_str(&format!(
                "Configured model '{}' is NOT installed. Run: ollama pull {}",
                self.model, self.model
            ));
        }
        out
    }
}
