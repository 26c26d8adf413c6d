//! User configuration, read from `pkgident/config.toml` under the platform
//! config directory (`~/.config` on Linux, `~/Library/Application Support`
//! on macOS, `%APPDATA%` on Windows).
//!
//! ```toml
//! default_format = "json"
//! show_locations = false
//!
//! [ignore]
//! packages = ["@types/*", "stdlib"]
//! source_types = ["artifact"]
//! ```

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::resolver::{PackageInfo, SourceType};

/// Settings for the `pkgident` binary. Every key is optional.
///
/// ```no_run
/// let config = pkgident::Config::load()?;
/// assert!(["table", "json"].contains(&config.default_format.as_str()));
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Format used when `--format` is not given: `table` or `json`.
    pub default_format: String,
    /// Adds the location column to table output.
    pub show_locations: bool,
    pub ignore: IgnoreConfig,
}

/// Rules for leaving packages out of a scan result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Patterns on the resolved name, where `*` matches any run of
    /// characters. PyPI entries must be written in normalized form.
    pub packages: Vec<String>,
    pub source_types: Vec<SourceType>,
}

impl IgnoreConfig {
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty() && self.source_types.is_empty()
    }

    /// Compiles the name patterns for repeated matching.
    pub fn compile(&self) -> PackageFilter {
        let patterns = self
            .packages
            .iter()
            .filter_map(|pattern| match wildcard_regex(pattern) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    tracing::warn!(pattern = %pattern, "ignoring unusable pattern: {err}");
                    None
                }
            })
            .collect();

        PackageFilter {
            patterns,
            source_types: self.source_types.clone(),
        }
    }
}

/// Compiled form of an [`IgnoreConfig`].
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    patterns: Vec<Regex>,
    source_types: Vec<SourceType>,
}

impl PackageFilter {
    pub fn matches_name(&self, name: &str) -> bool {
        self.patterns.iter().any(|regex| regex.is_match(name))
    }

    pub fn should_ignore(&self, package: &PackageInfo) -> bool {
        self.source_types.contains(&package.source_type()) || self.matches_name(&package.name())
    }
}

/// Translates a `*` wildcard pattern into an anchored regex; everything
/// else matches literally.
fn wildcard_regex(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_format: "table".to_string(),
            show_locations: true,
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Reads the user's config file, falling back to defaults when there is
    /// none. A file that exists but does not parse is an error.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Writes the config to the user's config file, creating its directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write config file {}", path.display()))
    }

    /// Location of the user's config file.
    pub fn config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("pkgident").join("config.toml")
    }

    /// The default config rendered as TOML.
    pub fn generate_default_config() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }
}
