//! Configuration file support
//!
//! Looked up at `--config PATH` or `<config dir>/revdigest/config.toml`.
//! A missing file means defaults; command line flags override file values.

use anyhow::{Context, Result};
use revdigest_core::{CollectOptions, GroupBy, Period};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub period: Period,

    /// Unrecognized values fall back to grouping by item
    #[serde(default = "default_group_by")]
    pub group_by: String,

    #[serde(default = "default_context")]
    pub leading_context: usize,

    #[serde(default = "default_context")]
    pub trailing_context: usize,

    /// Count the author of the revision that predates the window
    #[serde(default = "default_true")]
    pub include_boundary_author: bool,

    #[serde(default = "default_true")]
    pub inline_emphasis: bool,

    /// Default log filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            period: Period::default(),
            group_by: default_group_by(),
            leading_context: default_context(),
            trailing_context: default_context(),
            include_boundary_author: true,
            inline_emphasis: true,
            log_level: default_log_level(),
        }
    }
}

fn default_group_by() -> String {
    GroupBy::Item.as_str().to_string()
}

fn default_context() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("revdigest").join("config.toml"))
    }

    /// Load from an explicit path, or the default location when present
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn group_by(&self) -> GroupBy {
        resolve_group_by(&self.group_by)
    }

    pub fn collect_options(&self) -> CollectOptions {
        CollectOptions {
            leading_context: self.leading_context,
            trailing_context: self.trailing_context,
            include_boundary_author: self.include_boundary_author,
            inline_emphasis: self.inline_emphasis,
        }
    }
}

/// Parse a grouping dimension, logging when the item fallback kicks in
pub fn resolve_group_by(value: &str) -> GroupBy {
    let group_by = GroupBy::parse_or_default(value);
    if value.parse::<GroupBy>().is_err() {
        warn!(value, "unrecognized group_by, grouping by item");
    }
    group_by
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.period, Period::Week);
        assert_eq!(config.group_by(), GroupBy::Item);
        assert_eq!(config.collect_options(), CollectOptions::default());
    }

    #[test]
    fn test_parse_values() {
        let config = Config::from_toml(
            r#"
            period = "month"
            group_by = "taxonomy"
            leading_context = 2
            trailing_context = 0
            include_boundary_author = false
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.period, Period::Month);
        assert_eq!(config.group_by(), GroupBy::Taxonomy);
        let options = config.collect_options();
        assert_eq!(options.leading_context, 2);
        assert_eq!(options.trailing_context, 0);
        assert!(!options.include_boundary_author);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_unknown_group_by_falls_back() {
        let config = Config::from_toml("group_by = \"colour\"").unwrap();
        assert_eq!(config.group_by(), GroupBy::Item);
    }

    #[test]
    fn test_invalid_period_is_an_error() {
        assert!(Config::from_toml("period = \"year\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "period = \"day\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.period, Period::Day);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(missing.as_path())).is_err());
    }
}
