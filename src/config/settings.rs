//! Application settings management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::llm::DEFAULT_OPENAI_API_BASE;
use crate::APP_NAME;

/// Main application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// General settings
    #[serde(default)]
    pub general: GeneralSettings,

    /// Completion provider settings
    #[serde(default)]
    pub llm: LlmSettings,

    /// Summarization pipeline settings
    #[serde(default)]
    pub summary: SummarySettings,

    /// Output file settings
    #[serde(default)]
    pub output: OutputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Completion provider (openai, gemini)
    #[serde(default = "default_llm_provider")]
    pub provider: String,

    /// Model name (falls back to LLM_CHAT)
    #[serde(default)]
    pub model: String,

    /// Base URL of the API (OpenAI-compatible base, or Gemini endpoint)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// API key (for cloud providers)
    #[serde(default)]
    pub api_key: String,

    /// Sampling temperature, applied to every call
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Nucleus sampling, applied to the consolidation call only
    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Output token cap for the consolidation call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// HTTP timeout per request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySettings {
    /// Language of the generated minutes
    #[serde(default = "default_language")]
    pub language: String,

    /// Words per transcript chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Chunk summaries requested at once (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// TOML file with additional or overriding prompt sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    /// Directory for generated minutes (default: next to the transcript)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// Default value functions

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_provider() -> String {
    "openai".to_string()
}

fn default_api_base() -> String {
    DEFAULT_OPENAI_API_BASE.to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_top_p() -> f64 {
    1.0
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_language() -> String {
    "english".to_string()
}

fn default_chunk_size() -> usize {
    2000
}

fn default_concurrency() -> usize {
    1
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: String::new(),
            api_base: default_api_base(),
            api_key: String::new(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            language: default_language(),
            chunk_size: default_chunk_size(),
            concurrency: default_concurrency(),
            prompts_file: None,
        }
    }
}

impl Settings {
    /// Load settings from the configuration file
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("No config file found, using defaults");
            let mut settings = Self::default();
            settings.apply_env_overrides(|key| std::env::var(key).ok());
            return Ok(settings);
        }

        let mut settings = Self::load_from(&config_path)?;
        settings.apply_env_overrides(|key| std::env::var(key).ok());

        Ok(settings)
    }

    /// Parse a settings file without applying environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Fill unset values from the environment: `LLM_CHAT` for the model,
    /// `OPENAI_API_BASE` when the base is still the default, and
    /// `OPENAI_API_KEY` / `GEMINI_API_KEY` for an empty key.
    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        if self.llm.model.trim().is_empty() {
            if let Some(model) = var("LLM_CHAT") {
                self.llm.model = model;
            }
        }

        if self.llm.api_base.trim().is_empty() || self.llm.api_base == DEFAULT_OPENAI_API_BASE {
            if let Some(base) = var("OPENAI_API_BASE") {
                self.llm.api_base = base;
            }
        }

        if self.llm.api_key.trim().is_empty() {
            let key_var = if self.llm.provider.eq_ignore_ascii_case("gemini") {
                "GEMINI_API_KEY"
            } else {
                "OPENAI_API_KEY"
            };
            if let Some(key) = var(key_var) {
                self.llm.api_key = key;
            }
        }
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", APP_NAME, APP_NAME)
            .context("Could not determine config directory")?;

        let config_dir = dirs.config_dir();
        Ok(config_dir.join("config.toml"))
    }

    /// Write default configuration to a file
    pub fn write_default(path: &Path) -> Result<()> {
        let settings = Self::default();
        let content = toml::to_string_pretty(&settings)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
