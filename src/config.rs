//! Planner configuration
//!
//! A plain struct with defaults for every field. Any subset of the fields can
//! be loaded from JSON; the rest keep their defaults.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalogue::{NullFilter, VisibilityPolicy};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum number of nested constructing operations in a plan
    pub max_depth: usize,

    /// Global sample budget used by `PlanSpace::allocate_default`
    pub global_budget: u64,

    /// Per-type sample budget used by `PlanSpace::allocate_default`
    pub per_type_budget: u64,

    /// Which operations the catalogue may offer
    pub visibility: VisibilityPolicy,

    /// Null admissibility for the root types
    pub root_null_filter: NullFilter,

    /// Seed for `PlanSpace::sampler`
    pub seed: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            global_budget: 100,
            per_type_budget: 40,
            visibility: VisibilityPolicy::PublicOnly,
            root_null_filter: NullFilter::Forbid,
            seed: 0,
        }
    }
}

impl PlannerConfig {
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        log::debug!("Loading planner configuration from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.global_budget == 0 {
            return Err(ConfigError::Invalid("global_budget must be positive".to_string()));
        }
        if self.per_type_budget == 0 {
            return Err(ConfigError::Invalid("per_type_budget must be positive".to_string()));
        }
        Ok(())
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_budget(mut self, global_budget: u64, per_type_budget: u64) -> Self {
        self.global_budget = global_budget;
        self.per_type_budget = per_type_budget;
        self
    }

    pub fn with_visibility(mut self, visibility: VisibilityPolicy) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.global_budget, 100);
        assert_eq!(config.per_type_budget, 40);
        assert_eq!(config.root_null_filter, NullFilter::Forbid);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PlannerConfig::from_json(r#"{"max_depth": 5, "visibility": "all"}"#).unwrap();
        assert_eq!(config.max_depth, 5);
        assert_eq!(config.visibility, VisibilityPolicy::All);
        assert_eq!(config.global_budget, 100);
    }

    #[test]
    fn test_rejects_zero_budget() {
        let err = PlannerConfig::from_json(r#"{"per_type_budget": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = PlannerConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"seed": 42, "root_null_filter": "admit"}}"#).unwrap();

        let config = PlannerConfig::load(file.path()).unwrap();
        assert_eq!(config.seed, 42);
        assert_eq!(config.root_null_filter, NullFilter::Admit);

        let missing = PlannerConfig::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
