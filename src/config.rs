//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/rstableau/rstableau.toml`
//! 3. Local config: `<dir>/.rstableau.toml`
//! 4. Environment variables: `RSTABLEAU_*` prefix
//!
//! Command-line flags override the loaded settings afterwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// How a tableau is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TreeStyle {
    /// One line per depth level, nodes tab separated
    #[default]
    Levels,
    /// Indented tree, one node per line
    Tree,
}

impl fmt::Display for TreeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Levels => write!(f, "levels"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

impl FromStr for TreeStyle {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "levels" => Ok(Self::Levels),
            "tree" => Ok(Self::Tree),
            other => Err(ApplicationError::Config {
                message: format!("unknown tree_style '{other}' (expected levels or tree)"),
            }),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub sign: Option<bool>,
    pub show_tree: Option<bool>,
    pub tree_style: Option<TreeStyle>,
    pub show_stats: Option<bool>,
}

/// Unified configuration for rstableau.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Sign asserted at the root when none is given
    pub sign: bool,
    /// Print the tableau after the verdict
    pub show_tree: bool,
    pub tree_style: TreeStyle,
    /// Print node and branch counts
    pub show_stats: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sign: true,
            show_tree: false,
            tree_style: TreeStyle::Levels,
            show_stats: false,
        }
    }
}

/// Get the XDG config directory for rstableau.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rstableau").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("rstableau.toml"))
}

/// Get the path to the local config file in `dir`.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".rstableau.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            sign: overlay.sign.unwrap_or(self.sign),
            show_tree: overlay.show_tree.unwrap_or(self.show_tree),
            tree_style: overlay.tree_style.unwrap_or(self.tree_style),
            show_stats: overlay.show_stats.unwrap_or(self.show_stats),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.rstableau.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        Self::load_layers(
            global_config_path().as_deref(),
            local_dir,
            Environment::with_prefix("RSTABLEAU"),
        )
    }

    /// Load from explicit layer sources; missing files are skipped.
    pub fn load_layers(
        global_path: Option<&Path>,
        local_dir: Option<&Path>,
        env: Environment,
    ) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_path {
            if global_path.exists() {
                let raw = load_raw_settings(global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        Self::apply_env_overrides(current, env)
    }

    /// Apply `RSTABLEAU_*` environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Some(val) = optional(config.get_bool("sign"))? {
            settings.sign = val;
        }
        if let Some(val) = optional(config.get_bool("show_tree"))? {
            settings.show_tree = val;
        }
        if let Some(val) = optional(config.get_string("tree_style"))? {
            settings.tree_style = val.parse()?;
        }
        if let Some(val) = optional(config.get_bool("show_stats"))? {
            settings.show_stats = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# rstableau configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/rstableau/rstableau.toml
#   Local:  <dir>/.rstableau.toml
#   Env:    RSTABLEAU_* environment variables
# Command-line flags override all of these.

# Sign asserted at the root: true tests satisfiability, false tests falsifiability
# sign = true

# Print the tableau after the verdict
# show_tree = false

# Tableau layout: "levels" (one line per depth) or "tree" (indented)
# tree_style = "levels"

# Print node and branch counts
# show_stats = false
"#
        .to_string()
    }
}

/// Absent keys are not an error; badly typed ones are.
fn optional<T>(result: Result<T, ConfigError>) -> Result<Option<T>, ApplicationError> {
    match result {
        Ok(val) => Ok(Some(val)),
        Err(ConfigError::NotFound(_)) => Ok(None),
        Err(e) => Err(config_err(e)),
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    fn env_from(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("RSTABLEAU").source(Some(source))
    }

    #[test]
    fn given_no_config_when_loading_then_uses_defaults() {
        let settings = Settings::load_layers(None, None, env_from(&[])).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(settings.sign);
        assert_eq!(settings.tree_style, TreeStyle::Levels);
    }

    #[test]
    fn given_global_and_local_files_when_loading_then_local_wins() {
        let temp = TempDir::new().unwrap();
        let global = temp.path().join("global.toml");
        std::fs::write(&global, "sign = false\nshow_stats = true\n").unwrap();
        std::fs::write(
            local_config_path(temp.path()),
            "sign = true\ntree_style = \"tree\"\n",
        )
        .unwrap();

        let settings =
            Settings::load_layers(Some(&global), Some(temp.path()), env_from(&[])).unwrap();

        assert!(settings.sign);
        assert!(settings.show_stats);
        assert_eq!(settings.tree_style, TreeStyle::Tree);
        assert!(!settings.show_tree);
    }

    #[test]
    fn given_env_vars_when_loading_then_override_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(local_config_path(temp.path()), "show_tree = false\n").unwrap();

        let settings = Settings::load_layers(
            None,
            Some(temp.path()),
            env_from(&[("RSTABLEAU_SHOW_TREE", "true"), ("RSTABLEAU_SIGN", "false")]),
        )
        .unwrap();

        assert!(settings.show_tree);
        assert!(!settings.sign);
    }

    #[test]
    fn given_bad_tree_style_in_env_when_loading_then_config_error() {
        let err = Settings::load_layers(None, None, env_from(&[("RSTABLEAU_TREE_STYLE", "spiral")]))
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Config { .. }));
        assert!(err.to_string().contains("spiral"));
    }

    #[test]
    fn given_unknown_key_in_file_when_loading_then_config_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(local_config_path(temp.path()), "colour = true\n").unwrap();

        let err = Settings::load_layers(None, Some(temp.path()), env_from(&[])).unwrap_err();

        assert!(matches!(err, ApplicationError::Config { .. }));
    }

    #[test]
    fn given_settings_when_serialized_then_reloads_identically() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            sign: false,
            show_tree: true,
            tree_style: TreeStyle::Tree,
            show_stats: true,
        };
        std::fs::write(local_config_path(temp.path()), settings.to_toml().unwrap()).unwrap();

        let loaded = Settings::load_layers(None, Some(temp.path()), env_from(&[])).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_and_empty() {
        let raw: RawSettings = toml::from_str(&Settings::template()).unwrap();

        assert!(raw.sign.is_none());
        assert!(raw.tree_style.is_none());
    }
}
