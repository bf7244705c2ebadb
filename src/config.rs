//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.kbqa.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Knowledge base settings.
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum tool round-trips per question.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout() -> u64 {
    300
}

fn default_max_iterations() -> usize {
    10
}

/// Knowledge base settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Knowledge directory override.
    ///
    /// If unset, a `data` directory next to the executable is used.
    #[serde(default)]
    pub dir: Option<String>,

    /// Concatenate documents in lexicographic filename order.
    ///
    /// Off by default: enumeration order is whatever the directory
    /// listing yields, matching the tool's documented behavior.
    #[serde(default)]
    pub sorted: bool,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".kbqa.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Model settings - only override when the CLI (or env) provided a
        // value, so config-file keys apply when the CLI is silent
        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref ollama_url) = args.ollama_url {
            self.model.ollama_url = ollama_url.clone();
        }
        if let Some(temperature) = args.temperature {
            self.model.temperature = temperature;
        }

        // Timeout - only override if explicitly provided via CLI
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        // Knowledge settings - only override if provided
        if let Some(ref data_dir) = args.data_dir {
            self.knowledge.dir = Some(data_dir.to_string_lossy().into_owned());
        }
        if args.sorted {
            self.knowledge.sorted = true;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model.name, "llama3.2:latest");
        assert_eq!(config.model.timeout_seconds, 300);
        assert!(config.knowledge.dir.is_none());
        assert!(!config.knowledge.sorted);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[model]
name = "qwen2.5:14b"
temperature = 0.2

[knowledge]
dir = "./docs"
sorted = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.model.name, "qwen2.5:14b");
        assert_eq!(config.model.temperature, 0.2);
        assert_eq!(config.knowledge.dir.as_deref(), Some("./docs"));
        assert!(config.knowledge.sorted);
    }

    fn default_args() -> crate::cli::Args {
        crate::cli::Args {
            question: None,
            model: None,
            ollama_url: None,
            data_dir: None,
            config: None,
            temperature: None,
            timeout: None,
            sorted: false,
            show_kb: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_config_file_model_survives_default_args() {
        let toml_content = r#"
[model]
name = "qwen2.5:14b"
ollama_url = "http://ollama.lan:11434"
temperature = 0.2
"#;

        let mut config: Config = toml::from_str(toml_content).unwrap();
        config.merge_with_args(&default_args());

        assert_eq!(config.model.name, "qwen2.5:14b");
        assert_eq!(config.model.ollama_url, "http://ollama.lan:11434");
        assert_eq!(config.model.temperature, 0.2);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let toml_content = r#"
[model]
name = "qwen2.5:14b"
temperature = 0.2
"#;

        let mut config: Config = toml::from_str(toml_content).unwrap();
        let mut args = default_args();
        args.model = Some("codellama:7b".to_string());
        args.temperature = Some(0.5);
        config.merge_with_args(&args);

        assert_eq!(config.model.name, "codellama:7b");
        assert_eq!(config.model.temperature, 0.5);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[model]"));
        assert!(toml_str.contains("[knowledge]"));
    }
}
