//! Configuration loading for project-memory.
//!
//! Layered config: defaults -> config file -> env vars -> CLI flags.
//! The default config file lives at ~/.config/project-memory/config.toml.

use config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::MemoryError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory, relative to a project root, that holds the snapshot file
    #[serde(default = "default_index_dir")]
    pub index_dir: String,

    /// Snapshot file name inside `index_dir`
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Page size used when a search does not ask for one
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Write the snapshot as indented JSON
    #[serde(default = "default_pretty_snapshot")]
    pub pretty_snapshot: bool,
}

fn default_index_dir() -> String {
    ".memory".to_string()
}

fn default_index_file() -> String {
    "search-index.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_limit() -> usize {
    20
}

fn default_pretty_snapshot() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            index_file: default_index_file(),
            log_level: default_log_level(),
            default_limit: default_limit(),
            pretty_snapshot: default_pretty_snapshot(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/project-memory/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (MEMORY_*)
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, MemoryError> {
        let config_dir = ProjectDirs::from("", "", "project-memory")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("index_dir", default_index_dir())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("index_file", default_index_file())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("log_level", default_log_level())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("default_limit", default_limit() as i64)
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .set_default("pretty_snapshot", default_pretty_snapshot())
            .map_err(|e| MemoryError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // MEMORY_INDEX_DIR, MEMORY_LOG_LEVEL, MEMORY_DEFAULT_LIMIT, ...
        // The double-underscore separator keeps single-underscore field names intact.
        builder = builder.add_source(
            Environment::with_prefix("MEMORY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| MemoryError::Config(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| MemoryError::Config(e.to_string()))?;
        settings.validate().map_err(MemoryError::Config)?;
        Ok(settings)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.index_file.trim().is_empty() {
            return Err("index_file must not be empty".to_string());
        }
        if Path::new(&self.index_dir).is_absolute() {
            return Err(format!(
                "index_dir must be relative to the project root, got {}",
                self.index_dir
            ));
        }
        if self.default_limit == 0 {
            return Err("default_limit must be > 0".to_string());
        }
        Ok(())
    }

    /// Snapshot path for a project: `<project_root>/<index_dir>/<index_file>`
    pub fn index_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.index_dir).join(&self.index_file)
    }
}
