//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treeorder/treeorder.toml`
//! 3. Local config: a file passed explicitly by the caller
//! 4. Environment variables: `TREEORDER_*` prefix

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// What a move relative to the node itself does.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelfTargetPolicy {
    /// Succeed without writing
    #[default]
    Ignore,
    /// Fail with `InvalidTarget`
    Reject,
}

impl FromStr for SelfTargetPolicy {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(ApplicationError::Config {
                message: format!("self_target must be 'ignore' or 'reject', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for SelfTargetPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelfTargetPolicy::Ignore => write!(f, "ignore"),
            SelfTargetPolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Raw settings for intermediate parsing (Option detects "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub self_target: Option<SelfTargetPolicy>,
    pub verify_after_move: Option<bool>,
}

/// Engine settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Settings {
    /// Behavior of `move_above`/`move_below` when target == node
    pub self_target: SelfTargetPolicy,
    /// Check affected groups for density after every relocation and log violations
    pub verify_after_move: bool,
}

/// Get the XDG config directory for treeorder.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treeorder").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treeorder.toml"))
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
            self_target: overlay.self_target.unwrap_or(self.self_target),
            verify_after_move: overlay.verify_after_move.unwrap_or(self.verify_after_move),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file; a missing file is an error
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(path) = local {
            let raw = load_raw_settings(path)?;
            current = current.merge_with(&raw);
        }

        Self::apply_env_overrides(current)
    }

    /// Load only defaults and one explicit file, ignoring global config and env.
    pub fn from_file(path: &Path) -> Result<Self, ApplicationError> {
        let raw = load_raw_settings(path)?;
        Ok(Self::default().merge_with(&raw))
    }

    /// Apply TREEORDER_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        // Use config crate just for env var parsing
        let builder = Config::builder().add_source(
            Environment::with_prefix("TREEORDER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("self_target") {
            settings.self_target = val.parse()?;
        }
        if let Ok(val) = config.get_bool("verify_after_move") {
            settings.verify_after_move = val;
        }

        Ok(settings)
    }

    /// Serialize settings as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }

    /// Commented template for a new config file.
    pub fn template() -> String {
        r#"# treeorder configuration
#
# Behavior when a node is moved above or below itself:
#   "ignore" succeeds without writing, "reject" fails with InvalidTarget
self_target = "ignore"

# Verify sibling groups touched by every move and log a warning when a
# group is no longer dense
verify_after_move = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
