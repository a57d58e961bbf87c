use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const ENV_CONFIG_PATH: &str = "DGA_AGENT_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

const DEFAULT_VECTOR_INDEX_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_COLLECTION: &str = "dga_db";
const DEFAULT_TOP_K: usize = 3;

const DEFAULT_GENERATION_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_MODEL: &str = "gemma3";

const DEFAULT_DOCS_DIR: &str = "static/docs";

/// Vector index service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VectorIndexConfig {
    /// Base URL of the vector index service
    #[serde(default = "default_vector_index_url")]
    pub url: String,
    /// Collection holding the embedded reference documents
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Similarity search fan-out
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            url: default_vector_index_url(),
            collection: default_collection(),
            top_k: default_top_k(),
        }
    }
}

/// Text-generation service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the generation service (Ollama-compatible)
    #[serde(default = "default_generation_url")]
    pub url: String,
    /// Model name passed with every generation request
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            url: default_generation_url(),
            model: default_model(),
        }
    }
}

fn default_vector_index_url() -> String {
    DEFAULT_VECTOR_INDEX_URL.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_generation_url() -> String {
    DEFAULT_GENERATION_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DOCS_DIR)
}

/// YAML configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub vector_index: VectorIndexConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Public directory reference documents are copied into
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            vector_index: VectorIndexConfig::default(),
            generation: GenerationConfig::default(),
            docs_dir: default_docs_dir(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub vector_index: VectorIndexConfig,
    pub generation: GenerationConfig,
    pub docs_dir: PathBuf,
    pub port: u16,
    pub host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vector_index: VectorIndexConfig::default(),
            generation: GenerationConfig::default(),
            docs_dir: default_docs_dir(),
            port: 8080,
            host: "127.0.0.1".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let file = Self::load_config_file(&config_path).unwrap_or_default();

        Self {
            vector_index: file.vector_index,
            generation: file.generation,
            docs_dir: file.docs_dir,
            port,
            host,
        }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &str) -> Option<ConfigFile> {
        let path = Path::new(path);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "Config file not found, using defaults");
            return None;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                let contents = contents.trim();
                if contents.is_empty() {
                    tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
                    return Some(ConfigFile::default());
                }

                match serde_yaml::from_str(contents) {
                    Ok(config) => {
                        tracing::info!(path = %path.display(), "Loaded configuration from file");
                        Some(config)
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to parse config file, using defaults");
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read config file, using defaults");
                None
            }
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.vector_index.top_k, 3);
        assert_eq!(config.generation.model, "gemma3");
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let file: ConfigFile = serde_yaml::from_str(
            r#"
            generation:
              model: llama3
            "#,
        )
        .unwrap();

        assert_eq!(file.generation.model, "llama3");
        assert_eq!(file.generation.url, DEFAULT_GENERATION_URL);
        assert_eq!(file.vector_index.top_k, 3);
        assert_eq!(file.docs_dir, PathBuf::from(DEFAULT_DOCS_DIR));
    }
}
