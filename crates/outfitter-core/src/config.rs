use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{OutfitterError, Result};

/// Environment variable override for the embedding provider API key.
pub const ENV_EMBEDDING_API_KEY: &str = "OUTFITTER_EMBEDDING_API_KEY";
/// Environment variable override for the generation provider API key.
pub const ENV_GENERATION_API_KEY: &str = "OUTFITTER_GENERATION_API_KEY";

/// Top-level configuration for the Outfitter application.
///
/// Loaded from `outfitter.toml` by default. Each section corresponds to one
/// subsystem. Provider API keys may be supplied via environment variables
/// instead of the file; `apply_env_overrides` merges them in (env wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutfitterConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

impl Default for OutfitterConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            embedding: EmbeddingConfig::default(),
            generation: GenerationConfig::default(),
            templates: TemplatesConfig::default(),
        }
    }
}

impl OutfitterConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: OutfitterConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| OutfitterError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overlay provider API keys from the environment, if set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_EMBEDDING_API_KEY) {
            if !key.is_empty() {
                self.embedding.api_key = key;
            }
        }
        if let Ok(key) = std::env::var(ENV_GENERATION_API_KEY) {
            if !key.is_empty() {
                self.generation.api_key = key;
            }
        }
    }

    /// Check that every key required to reach the remote providers is
    /// present. Called once at startup, before any query is served; a
    /// missing key is fatal there rather than surfacing mid-search.
    pub fn validate(&self) -> Result<()> {
        fn required(section: &str, key: &str, value: &str) -> Result<()> {
            if value.trim().is_empty() {
                return Err(OutfitterError::Config(format!(
                    "Missing required key {}.{}",
                    section, key
                )));
            }
            Ok(())
        }

        required("embedding", "endpoint", &self.embedding.endpoint)?;
        required("embedding", "model", &self.embedding.model)?;
        required("embedding", "api_key", &self.embedding.api_key).map_err(|_| {
            OutfitterError::Config(format!(
                "Missing required key embedding.api_key (set it in the config file or {})",
                ENV_EMBEDDING_API_KEY
            ))
        })?;
        if self.embedding.dimensions == 0 {
            return Err(OutfitterError::Config(
                "embedding.dimensions must be greater than zero".to_string(),
            ));
        }

        required("generation", "endpoint", &self.generation.endpoint)?;
        required("generation", "model", &self.generation.model)?;
        required("generation", "api_key", &self.generation.api_key).map_err(|_| {
            OutfitterError::Config(format!(
                "Missing required key generation.api_key (set it in the config file or {})",
                ENV_GENERATION_API_KEY
            ))
        })?;

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address for the API server.
    pub host: String,
    /// Port for the API server.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// SQLite storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: String,
    /// Insert the built-in starter catalog when the products table is empty.
    pub seed_on_start: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/outfitter.db".to_string(),
            seed_on_start: true,
        }
    }
}

/// Remote embedding provider settings (OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Base URL of the embeddings API (e.g. https://api.openai.com/v1).
    pub endpoint: String,
    /// Bearer token for the embeddings API.
    pub api_key: String,
    /// Embedding model identifier.
    pub model: String,
    /// Dimensionality of the returned vectors.
    pub dimensions: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            timeout_secs: 30,
        }
    }
}

/// Remote text-generation provider settings (OpenAI-compatible API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base URL of the chat completions API.
    pub endpoint: String,
    /// Bearer token for the chat completions API.
    pub api_key: String,
    /// Generation model identifier.
    pub model: String,
    /// Maximum tokens to generate per answer.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 256,
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

/// Template bundle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory holding the template bundle. If it cannot be loaded, the
    /// built-in inline template is used for the rest of the process
    /// lifetime.
    pub directory: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            directory: "templates".to_string(),
        }
    }
}
