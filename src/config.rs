//! Repair configuration, persisted as TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conflict::BuilderConfig;
use crate::pipeline::{FilterMode, Strategy};
use crate::repair::RemovalAction;

/// Errors from loading or saving a config file.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read repair config: {path}")]
    #[diagnostic(
        code(onto::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse repair config: {path}: {message}")]
    #[diagnostic(
        code(onto::config::parse),
        help(
            "Check the TOML syntax. Valid modes are \"remove\" and \"flag\"; valid \
             strategies are \"obsolete\", \"coherence\" and \"cardinality\"."
        )
    )]
    Parse { path: String, message: String },

    #[error("failed to write repair config: {path}")]
    #[diagnostic(
        code(onto::config::write),
        help("Ensure you have write permissions to the target directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Settings for a repair run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Traverse CheckList classes on the rayon pool.
    #[serde(default)]
    pub parallel: bool,
    /// Traversal deadline in milliseconds; unset means no deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Override for the ancestor-expansion level cap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<usize>,
    /// Remove or flag defective mappings.
    #[serde(default)]
    pub mode: FilterMode,
    /// Strategies to run, in order.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<Strategy>,
    /// Where `check` writes the conflict-set dump, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dump_path: Option<PathBuf>,
}

fn default_strategies() -> Vec<Strategy> {
    vec![Strategy::Obsolete, Strategy::Coherence]
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            parallel: false,
            timeout_ms: None,
            max_rounds: None,
            mode: FilterMode::default(),
            strategies: default_strategies(),
            dump_path: None,
        }
    }
}

impl RepairConfig {
    /// Settings for the conflict-set builder.
    pub fn to_builder_config(&self) -> BuilderConfig {
        BuilderConfig {
            parallel: self.parallel,
            timeout: self.timeout_ms.map(Duration::from_millis),
            max_rounds: self.max_rounds,
        }
    }

    /// What removing a mapping means under this config.
    pub fn removal_action(&self) -> RemovalAction {
        self.mode.removal_action()
    }

    /// Parse from TOML text; `origin` names the source in errors.
    pub fn from_toml(content: &str, origin: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml(&content, &path.display().to_string())
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}
