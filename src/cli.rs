//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// KbQA - LLM-powered Q&A over a local plain-text knowledge base
///
/// Ask questions that are answered strictly from the .txt documents in
/// the knowledge directory, using a local Ollama model with tool-calling.
///
/// Examples:
///   kbqa --question "What does the onboarding doc say about VPN access?"
///   kbqa --question "Summarize the release notes" --model llama3.2:latest
///   kbqa --data-dir ./docs
///   kbqa --show-kb
///   kbqa --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Question to ask in one-shot mode
    ///
    /// If omitted, the tool starts an interactive session reading
    /// questions from stdin.
    #[arg(short = 'Q', long, value_name = "TEXT")]
    pub question: Option<String>,

    /// Ollama model to use for answering
    ///
    /// Recommended models: llama3.2:latest, qwen2.5:14b.
    /// Can also be set via KBQA_MODEL env var or .kbqa.toml config;
    /// when nothing is set, llama3.2:latest is used.
    #[arg(short, long, env = "KBQA_MODEL")]
    pub model: Option<String>,

    /// Ollama API endpoint URL
    ///
    /// Can also be set via OLLAMA_URL env var or .kbqa.toml config;
    /// when nothing is set, http://localhost:11434 is used.
    #[arg(long, env = "OLLAMA_URL")]
    pub ollama_url: Option<String>,

    /// Knowledge directory holding the .txt documents
    ///
    /// Defaults to a directory named `data` next to the kbqa executable,
    /// so results do not depend on the working directory.
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .kbqa.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Temperature for LLM responses (0.0 - 1.0)
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, value_name = "TEMP")]
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    ///
    /// How long to wait for the LLM to respond. Default: from config or 300s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Concatenate documents in lexicographic filename order
    ///
    /// By default documents are concatenated in directory enumeration
    /// order, which is platform dependent.
    #[arg(long)]
    pub sorted: bool,

    /// Print the aggregated knowledge base and exit (no LLM call)
    #[arg(long)]
    pub show_kb: bool,

    /// Generate a default .kbqa.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate Ollama URL format (not needed for --show-kb)
        if let Some(ref url) = self.ollama_url {
            if !self.show_kb && !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate temperature range if provided
        if let Some(temperature) = self.temperature {
            if !(0.0..=1.0).contains(&temperature) {
                return Err("Temperature must be between 0.0 and 1.0".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate data directory if provided
        if let Some(ref data_dir) = self.data_dir {
            if !data_dir.exists() {
                return Err(format!(
                    "Knowledge directory does not exist: {}",
                    data_dir.display()
                ));
            }
            if !data_dir.is_dir() {
                return Err(format!(
                    "Knowledge path is not a directory: {}",
                    data_dir.display()
                ));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            question: Some("What is in the notes?".to_string()),
            model: None,
            ollama_url: Some("http://localhost:11434".to_string()),
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
    fn test_validation_ok() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_ollama_url() {
        let mut args = make_args();
        args.ollama_url = Some("localhost:11434".to_string());
        assert!(args.validate().is_err());

        // --show-kb never touches the model, so the URL is not checked
        args.show_kb = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_unset_ollama_url_is_ok() {
        let mut args = make_args();
        args.ollama_url = None;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_temperature_range() {
        let mut args = make_args();
        args.temperature = Some(1.5);
        assert!(args.validate().is_err());

        args.temperature = Some(0.5);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_data_dir() {
        let mut args = make_args();
        args.data_dir = Some(PathBuf::from("/nonexistent/kbqa-data"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
