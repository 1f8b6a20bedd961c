//! `.sharpfix.toml` support
//!
//! The nearest `.sharpfix.toml` in the working directory or one of its
//! ancestors selects the rules to run, the documents to skip and the default
//! output format:
//!
//! ```toml
//! [rules]
//! enabled = ["NullEqualityAnalyzer", "TryReturnTypeAnalyzer"]
//! disabled = ["TryReturnTypeAnalyzer"]
//!
//! [paths]
//! exclude = ["generated/", "*.g.json"]
//!
//! [output]
//! format = "json"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use sharpfix_rules::RuleRegistry;

use crate::output::OutputFormat;

pub const CONFIG_FILE: &str = ".sharpfix.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub rules: RulesConfig,
    pub paths: PathsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Rule ids to run; every registered rule when absent
    pub enabled: Option<Vec<String>>,
    /// Rule ids taken out of the enabled set
    pub disabled: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Globs for documents to skip. A trailing `/` makes the glob match
    /// directory names instead.
    pub exclude: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Find and load the nearest config file, starting in the working directory
    pub fn discover() -> Result<Option<(Config, PathBuf)>> {
        let cwd = std::env::current_dir().context("Failed to read the working directory")?;
        Self::discover_from(&cwd)
    }

    /// Find and load the nearest config file at or above `start`
    pub fn discover_from(start: &Path) -> Result<Option<(Config, PathBuf)>> {
        for dir in start.ancestors() {
            let candidate = dir.join(CONFIG_FILE);
            if candidate.is_file() {
                let config = Self::load_path(&candidate)?;
                return Ok(Some((config, candidate)));
            }
        }
        Ok(None)
    }

    pub fn load_path(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }
}

impl RulesConfig {
    /// Ids of the rules to run.
    ///
    /// Rules named on the command line replace the configured selection.
    /// Every id, wherever it comes from, must name a rule in `registry`.
    pub fn resolve(&self, registry: &RuleRegistry, cli_rules: &[String]) -> Result<HashSet<String>> {
        let known = registry.all_ids();
        let check = |ids: &[String], origin: &str| -> Result<()> {
            if let Some(unknown) = ids.iter().find(|id| !known.contains(&id.as_str())) {
                bail!(
                    "Unknown rule '{}' in {} (available: {}). Use --list-rules to see available rules.",
                    unknown,
                    origin,
                    known.join(", ")
                );
            }
            Ok(())
        };

        check(cli_rules, "--rule")?;
        if !cli_rules.is_empty() {
            return Ok(cli_rules.iter().cloned().collect());
        }

        if let Some(enabled) = &self.enabled {
            check(enabled, "[rules] enabled")?;
        }
        check(&self.disabled, "[rules] disabled")?;

        let mut ids: HashSet<String> = match &self.enabled {
            Some(enabled) => enabled.iter().cloned().collect(),
            None => known.iter().map(|id| id.to_string()).collect(),
        };
        for id in &self.disabled {
            ids.remove(id);
        }

        if ids.is_empty() {
            bail!("No rules enabled: [rules] disables every selected rule");
        }
        Ok(ids)
    }
}

impl PathsConfig {
    /// Compile the exclude globs, rejecting malformed ones
    pub fn excludes(&self) -> Result<Excludes> {
        let mut excludes = Excludes::default();
        for raw in &self.exclude {
            let (glob, is_dir) = match raw.strip_suffix('/') {
                Some(dir) => (dir, true),
                None => (raw.as_str(), false),
            };
            let pattern = glob::Pattern::new(glob)
                .with_context(|| format!("Invalid exclude pattern '{}'", raw))?;
            if is_dir {
                excludes.dirs.push(pattern);
            } else {
                excludes.files.push(pattern);
            }
        }
        Ok(excludes)
    }
}

/// Compiled `[paths] exclude` globs
#[derive(Debug, Default)]
pub struct Excludes {
    files: Vec<glob::Pattern>,
    dirs: Vec<glob::Pattern>,
}

impl Excludes {
    /// Whether `path` matches a file glob (on the whole path or the file
    /// name) or lies below a directory whose name matches a directory glob
    pub fn matches(&self, path: &Path) -> bool {
        let file_name = path.file_name().map(OsStr::to_string_lossy);
        let file_hit = self.files.iter().any(|pattern| {
            pattern.matches_path(path) || file_name.as_deref().is_some_and(|name| pattern.matches(name))
        });
        if file_hit {
            return true;
        }

        path.parent().is_some_and(|parent| {
            parent.components().any(|component| match component {
                Component::Normal(name) => {
                    let name = name.to_string_lossy();
                    self.dirs.iter().any(|pattern| pattern.matches(&name))
                }
                _ => false,
            })
        })
    }
}
