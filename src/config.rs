use crate::core::matcher::{MatchEngine, MatchOptions, DEFAULT_MIN_SCORE};
use crate::error::{MatchError, Result};
use crate::models::{LocationScoring, ScoringWeights};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Prefix for environment overrides, e.g. `ROOMIE__MATCHING__MIN_SCORE`
const ENV_PREFIX: &str = "ROOMIE";

/// Engine configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "default_max_radius_miles")]
    pub max_radius_miles: f64,
    #[serde(default = "default_exclude_vetoed")]
    pub exclude_vetoed: bool,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            min_score: default_min_score(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            max_radius_miles: default_max_radius_miles(),
            exclude_vetoed: default_exclude_vetoed(),
        }
    }
}

fn default_min_score() -> f64 { DEFAULT_MIN_SCORE }
fn default_limit() -> usize { 20 }
fn default_max_limit() -> usize { 100 }
fn default_max_radius_miles() -> f64 { 50.0 }
fn default_exclude_vetoed() -> bool { true }

impl MatchingSettings {
    /// Options for one request, clamping the caller's limit and radius
    pub fn options(&self, limit: Option<usize>, radius_miles: Option<f64>) -> MatchOptions {
        MatchOptions {
            min_score: self.min_score,
            proximity: radius_miles.map(|r| r.min(self.max_radius_miles)),
            exclude_vetoed: self.exclude_vetoed,
            limit: Some(limit.unwrap_or(self.default_limit).min(self.max_limit)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScoringSettings {
    #[serde(default)]
    pub weights: ScoringWeights,
    #[serde(default)]
    pub location: LocationScoring,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `json`, `pretty` or `compact`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with ROOMIE__)
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., ROOMIE__SCORING__WEIGHTS__BUDGET -> scoring.weights.budget
            .add_source(environment())
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse settings from an inline TOML document, without files or environment
    pub fn from_toml(document: &str) -> Result<Self> {
        toml::from_str(document).map_err(|e| MatchError::Configuration(format!("invalid settings: {e}")))
    }

    /// Build an engine from these settings, validating weights and options
    pub fn match_engine(&self) -> Result<MatchEngine> {
        MatchEngine::new(self.scoring.weights)?
            .with_location_scoring(self.scoring.location)?
            .with_options(self.matching.options(None, None))
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}
