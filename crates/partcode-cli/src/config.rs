//! CLI configuration file
//!
//! YAML (`.yaml`/`.yml`) or JSON, chosen by extension. Every key is
//! optional; command-line flags override file values.

use anyhow::{Context, Result};
use partcode_codec::{CodecOptions, DEFAULT_FILL_CHAR};
use partcode_schema::UnifierConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Artifact path used when neither the file nor a flag names one
pub const DEFAULT_UNION_SCHEMA: &str = "union_schema.csv";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub union_schema: Option<PathBuf>,
    pub fill_char: Option<char>,
    pub code_width: Option<usize>,
    pub cross_map: CrossMapAliases,
    pub lookup_dir: Option<PathBuf>,
    pub matched_parts: Option<PathBuf>,
}

/// Extra header aliases for cross-reference columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrossMapAliases {
    pub ik_aliases: Vec<String>,
    pub ok_aliases: Vec<String>,
}

impl CliConfig {
    /// Load the file at `path`, or defaults when there is none
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;

        let config = if path
            .extension()
            .is_some_and(|e| e == "yaml" || e == "yml")
        {
            Self::from_yaml(&content)
        } else {
            Self::from_json(&content)
        }
        .with_context(|| format!("invalid config file {}", path.display()))?;
        debug!(path = %path.display(), ?config, "Loaded CLI config");
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("YAML parse error")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("JSON parse error")
    }

    /// Artifact path: flag, then file, then [`DEFAULT_UNION_SCHEMA`]
    pub fn union_schema(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.union_schema.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UNION_SCHEMA))
    }

    pub fn lookup_dir(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.lookup_dir.clone())
    }

    pub fn matched_parts(&self, flag: Option<PathBuf>) -> Option<PathBuf> {
        flag.or_else(|| self.matched_parts.clone())
    }

    /// Codec options with the fill flag taking precedence
    pub fn codec_options(&self, fill_flag: Option<char>) -> CodecOptions {
        let options = CodecOptions::new().fill_char(
            fill_flag
                .or(self.fill_char)
                .unwrap_or(DEFAULT_FILL_CHAR),
        );
        match self.code_width {
            Some(width) => options.code_width(width),
            None => options,
        }
    }

    /// Built-in aliases with the configured ones tried first
    pub fn unifier_config(&self) -> UnifierConfig {
        let defaults = UnifierConfig::default();
        UnifierConfig::new()
            .ik_aliases(prepend(&self.cross_map.ik_aliases, defaults.ik_aliases))
            .ok_aliases(prepend(&self.cross_map.ok_aliases, defaults.ok_aliases))
    }
}

fn prepend(first: &[String], rest: Vec<String>) -> Vec<String> {
    first.iter().cloned().chain(rest).collect()
}
