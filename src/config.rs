//! Configuration module for the semantic path tool.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `SPATH_` and use double underscores
//! to separate nested levels:
//! - `SPATH_LOADER__INCLUDE_TESTS=true` sets `loader.include_tests`
//! - `SPATH_QUERY__DEFAULT_LIMIT=50` sets `query.default_limit`
//! - `SPATH_DEAD_CODE__EXPORTED_ARE_ROOTS=false` sets `dead_code.exported_are_roots`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory holding the workspace settings file.
pub const CONFIG_DIR: &str = ".spath";
/// Custom ignore file honoured by the loader, in gitignore syntax.
pub const IGNORE_FILE: &str = ".spathignore";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Program loading
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Query defaults
    #[serde(default)]
    pub query: QueryConfig,

    /// Dead-code analysis
    #[serde(default)]
    pub dead_code: DeadCodeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoaderConfig {
    /// Load `_test.go` files
    #[serde(default = "default_false")]
    pub include_tests: bool,

    /// Load `vendor/` trees as non-project packages
    #[serde(default = "default_false")]
    pub include_vendor: bool,

    /// Directory names skipped anywhere in the tree
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: Vec<String>,

    /// Module path used when there is no go.mod
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct QueryConfig {
    /// Result limit for `list` when `--limit` is not given
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Scope expression used when `--scope` is not given
    #[serde(default = "default_scope")]
    pub default_scope: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeadCodeConfig {
    /// Treat exported declarations of library packages as entry points
    #[serde(default = "default_true")]
    pub exported_are_roots: bool,
}

fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_exclude_dirs() -> Vec<String> {
    vec!["testdata".to_string(), "node_modules".to_string()]
}
fn default_limit() -> usize {
    100
}
fn default_scope() -> String {
    "project".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            debug: false,
            loader: LoaderConfig::default(),
            query: QueryConfig::default(),
            dead_code: DeadCodeConfig::default(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            include_tests: false,
            include_vendor: false,
            exclude_dirs: default_exclude_dirs(),
            module_path: None,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_scope: default_scope(),
        }
    }
}

impl Default for DeadCodeConfig {
    fn default() -> Self {
        Self {
            exported_are_roots: true,
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        // Try to find the workspace root by looking for .spath directory
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join("settings.toml"));
        Self::load_from(config_path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(path.as_ref()))
            // Double underscore separates nested levels; single underscores stay
            .merge(Env::prefixed("SPATH_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Find the workspace settings by looking for a .spath directory
    /// Searches from current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        Self::workspace_root().map(|root| root.join(CONFIG_DIR).join("settings.toml"))
    }

    /// Get the workspace root directory (where .spath is located)
    pub fn workspace_root() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        current
            .ancestors()
            .find(|ancestor| ancestor.join(CONFIG_DIR).is_dir())
            .map(Path::to_path_buf)
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Render the active settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Create a default settings file with helpful comments under `root`
    pub fn init_config_file(root: &Path, force: bool) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = root.join(CONFIG_DIR).join("settings.toml");

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let defaults = Settings::default();
        let template = format!(
            r#"# spath configuration file

# Version of the configuration schema
version = {version}

# Global debug mode (same as --verbose)
debug = false

[loader]
# Load _test.go files
include_tests = false

# Load vendor/ trees; vendored packages are never project packages
include_vendor = false

# Directory names skipped anywhere in the tree
exclude_dirs = {exclude_dirs}

# Module path used when the root has no go.mod
# module_path = "example.com/project"

[query]
# Result limit for 'spath list'
default_limit = {limit}

# Scope expression used when --scope is omitted
default_scope = "{scope}"

[dead_code]
# Treat exported declarations of library packages as entry points
exported_are_roots = true
"#,
            version = defaults.version,
            exclude_dirs = toml::Value::Array(
                defaults
                    .loader
                    .exclude_dirs
                    .iter()
                    .map(|d| toml::Value::String(d.clone()))
                    .collect()
            ),
            limit = defaults.query.default_limit,
            scope = defaults.query.default_scope,
        );

        std::fs::write(&config_path, template)?;
        tracing::info!("wrote {}", config_path.display());

        Self::create_default_ignore_file(root, force)?;

        Ok(config_path)
    }

    /// Create a default .spathignore file
    fn create_default_ignore_file(root: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
        let ignore_path = root.join(IGNORE_FILE);

        if !force && ignore_path.exists() {
            tracing::debug!("keeping existing {}", ignore_path.display());
            return Ok(());
        }

        let default_content = r#"# spath ignore patterns (gitignore syntax)
#
# Files and directories listed here are not loaded.

# Generated code
*.pb.go
*_gen.go
zz_generated*.go

# Tool state
.spath/
"#;

        std::fs::write(&ignore_path, default_content)?;
        tracing::info!("wrote {}", ignore_path.display());

        Ok(())
    }
}
