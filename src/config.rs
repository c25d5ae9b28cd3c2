//! Sorter configuration.
//!
//! Configuration is read from TOML and covers three things: which entries a directory
//! pass should leave alone, engine settings, and extra extensions for the category table.
//!
//! # Configuration File Format
//!
//! ```toml
//! [filters]
//! include_hidden = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db", "desktop.ini"]
//! patterns = ["*.part", "**/node_modules/**"]
//! extensions = ["tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//!
//! [engine]
//! marker_name = ".dirsort-ignore"
//! max_rename_attempts = 1000
//!
//! [categories]
//! IMAGE = ["cr2", "nef"]
//! ```

use crate::context::{DEFAULT_MARKER_NAME, SortContext};
use crate::file_category::{Classifier, TypeGroups};
use crate::naming::{DEFAULT_MAX_ATTEMPTS, NameResolver};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Invalid TOML syntax or structure, or an invalid setting.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}': expected *.ext or dir/**")]
    InvalidGlobPattern(String),

    /// Invalid regex pattern provided.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Complete sorter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SorterConfig {
    #[serde(default)]
    pub filters: FilterRules,

    #[serde(default)]
    pub engine: EngineSettings,

    /// Extra extensions per category, merged into the standard table.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

/// Rules deciding which entries a directory pass touches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether hidden entries are sorted too.
    #[serde(default)]
    pub include_hidden: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including entries (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact names to exclude (e.g., "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "tmp").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the entry name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Glob patterns that override exclude rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Name of the marker file written into custom group folders.
    #[serde(default = "default_marker_name")]
    pub marker_name: String,

    /// Numbered duplicate names tried before falling back to a hashed name.
    #[serde(default = "default_max_rename_attempts")]
    pub max_rename_attempts: usize,
}

fn default_marker_name() -> String {
    DEFAULT_MARKER_NAME.to_string()
}

fn default_max_rename_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            marker_name: default_marker_name(),
            max_rename_attempts: default_max_rename_attempts(),
        }
    }
}

impl SorterConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if provided
    /// 2. `.dirsortrc.toml` in the current directory
    /// 3. `~/.config/dirsort/config.toml`
    /// 4. built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a found or explicitly given file cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".dirsortrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// The standard category table extended with `[categories]`.
    pub fn type_groups(&self) -> TypeGroups {
        let mut groups = TypeGroups::standard();
        for (category, extensions) in &self.categories {
            for extension in extensions {
                groups.add_extension(category, extension);
            }
        }
        groups
    }

    /// Builds the engine context described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigInvalid` for an empty marker name or zero rename attempts.
    pub fn sort_context(&self) -> Result<SortContext, ConfigError> {
        if self.engine.marker_name.trim().is_empty() {
            return Err(ConfigError::ConfigInvalid(
                "engine.marker_name must not be empty".to_string(),
            ));
        }
        if self.engine.max_rename_attempts == 0 {
            return Err(ConfigError::ConfigInvalid(
                "engine.max_rename_attempts must be at least 1".to_string(),
            ));
        }

        Ok(SortContext::new(Classifier::new(self.type_groups()))
            .with_resolver(NameResolver::new(self.engine.max_rename_attempts))
            .with_marker_name(self.engine.marker_name.clone()))
    }

    /// Compile the filter rules into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Pre-compiled filter rules.
#[derive(Debug)]
pub struct CompiledFilters {
    include_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    Pattern::new(pattern)
                        .map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden: rules.include_hidden,
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(rules.exclude.patterns.as_slice())?,
            exclude_regexes,
            include_patterns: compile_globs(rules.include.patterns.as_slice())?,
        })
    }

    /// Whether hidden entries should be sorted.
    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    /// Check if an entry should be sorted (not excluded).
    ///
    /// Include patterns win; otherwise the entry is excluded by an exact name, extension,
    /// glob or regex match. Hidden entries are handled by the caller.
    pub fn should_include(&self, path: &Path) -> bool {
        if self
            .include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
        {
            return true;
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.exclude_filenames.contains(name.as_ref()) {
            return false;
        }

        if let Some(ext) = path.extension()
            && self
                .exclude_extensions
                .contains(&ext.to_string_lossy().to_lowercase())
        {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
        {
            return false;
        }

        !self.exclude_regexes.iter().any(|regex| regex.is_match(&name))
    }
}
