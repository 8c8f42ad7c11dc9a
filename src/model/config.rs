use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const ENV_CONFIG_PATH: &str = "INJURY_EVAL_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

fn default_true() -> bool {
    true
}

/// Rule toggles for the deterministic evaluator
///
/// A plain value passed into every evaluation call. All flags default to
/// enabled, including when omitted from JSON or YAML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatorConfig {
    /// Drop mentions flagged as negated
    #[serde(default = "default_true")]
    pub exclude_negated: bool,
    /// Let a global "no injuries" statement suppress earlier evidence
    #[serde(default = "default_true")]
    pub respect_no_injury_statements: bool,
    /// Explicit evidence replaces implied/unclear evidence
    #[serde(default = "default_true")]
    pub prefer_explicit: bool,
    /// Pain needs a body site or an explicit fall-related timing
    #[serde(default = "default_true")]
    pub strict_pain_evaluation: bool,
    /// Candidate labels must equal an allowed label exactly. When disabled the
    /// label is normalized before lookup; admissibility is checked either way.
    #[serde(default = "default_true")]
    pub require_exact_match: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            exclude_negated: true,
            respect_no_injury_statements: true,
            prefer_explicit: true,
            strict_pain_evaluation: true,
            require_exact_match: true,
        }
    }
}

/// YAML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub evaluator: EvaluatorConfig,
}

impl Config {
    /// Load configuration from the file named by `INJURY_EVAL_CONFIG_PATH`
    /// (or `config.yaml`), falling back to defaults
    pub fn from_env() -> Self {
        let config_path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific YAML file, falling back to defaults
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let evaluator = Self::load_config_file(path.as_ref())
            .map(|cf| cf.evaluator)
            .unwrap_or_default();

        tracing::debug!(evaluator = ?evaluator, "Evaluator configuration resolved");

        Self { evaluator }
    }

    /// Load configuration from YAML file
    fn load_config_file(path: &Path) -> Option<ConfigFile> {
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
}
