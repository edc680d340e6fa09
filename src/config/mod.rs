//! Job configuration for conflint.
//!
//! The configuration lists the linters to run and the files each one checks. It is
//! read from `conflint.yaml` by default; a `.toml` file is accepted too.
//!
//! # Example
//!
//! ```
//! use conflint::config::Config;
//!
//! let config = Config::from_yaml_str(
//!     "conftest:\n- files:\n  - app1/*.yaml\n  policy: policies\n",
//! )
//! .unwrap();
//! assert_eq!(config.conftest[0].policy, "policies");
//! assert!(config.kubeval.is_empty());
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "conflint.yaml";

/// Linters to run, in order: all conftest jobs first, then all kubeval jobs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub conftest: Vec<ConftestConfig>,

    #[serde(default)]
    pub kubeval: Vec<KubevalConfig>,
}

/// One conftest job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConftestConfig {
    /// Glob patterns; each pattern becomes one conftest invocation
    #[serde(default)]
    pub files: Vec<String>,

    /// Policy directory passed with `-p`
    #[serde(default)]
    pub policy: String,

    /// Input type passed with `-i`
    #[serde(default)]
    pub input: Option<String>,

    #[serde(default)]
    pub combine: bool,

    /// Report warnings as well as failures
    #[serde(default)]
    pub fail_on_warn: bool,

    #[serde(default)]
    pub data: Vec<String>,

    #[serde(default)]
    pub all_namespaces: bool,

    #[serde(default)]
    pub namespaces: Vec<String>,
}

/// One kubeval job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KubevalConfig {
    /// Glob patterns; kubeval runs once per matched file
    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default)]
    pub strict: bool,

    /// The first entry is the schema location, the rest are additional ones
    #[serde(default)]
    pub schema_locations: Vec<String>,

    #[serde(default)]
    pub ignore_missing_schemas: bool,

    #[serde(default)]
    pub ignored_filename_patterns: Vec<String>,

    #[serde(default)]
    pub skip_kinds: Vec<String>,
}

impl Config {
    /// Loads the configuration from `path`.
    ///
    /// Files ending in `.toml` are read as TOML, everything else as YAML. A missing or
    /// malformed file is an error naming the path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext == "toml")
            .unwrap_or(false);

        let config = if is_toml {
            Self::from_toml_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        };
        config.with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to an empty mapping.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
