//! Editor Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variable: `SCENE_EDITOR_SCHEMA=/path/to/schema.toml`
//! 2. Config file named by `SCENE_EDITOR_CONFIG`
//! 3. Config file: `<config_dir>/scene_editor/config.toml`
//! 4. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! schema_path = "schemas/level.toml"   # omit for the built-in schema
//! max_undo = 100
//! max_recent_files = 10
//! xml_indent = 2
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use scene_schema::TypeHierarchy;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "SCENE_EDITOR_CONFIG";
/// Environment variable overriding the schema path
pub const SCHEMA_ENV: &str = "SCENE_EDITOR_SCHEMA";

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Schema source; the built-in schema when unset
    pub schema_path: Option<PathBuf>,
    /// Undo history depth per document
    pub max_undo: usize,
    /// Length of the recent files list
    pub max_recent_files: usize,
    /// Spaces per nesting level in saved scene files
    pub xml_indent: usize,

    /// File this config was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            schema_path: None,
            max_undo: 100,
            max_recent_files: 10,
            xml_indent: 2,
            config_path: None,
        }
    }
}

impl EditorConfig {
    /// Load configuration from all sources.
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                let config = Self::load_from_file(&path)?;
                log::info!("Loaded editor config from {:?}", path);
                config
            }
            _ => Self::default(),
        };

        if let Some(schema) = std::env::var_os(SCHEMA_ENV) {
            if !schema.is_empty() {
                config.schema_path = Some(PathBuf::from(schema));
                log::info!("Schema from env: {:?}", config.schema_path);
            }
        }

        Ok(config)
    }

    /// `<config_dir>/scene_editor/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scene_editor").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The configured schema, or the built-in one
    pub fn schema(&self) -> Result<Arc<TypeHierarchy>, scene_schema::SchemaLoadError> {
        match &self.schema_path {
            Some(path) => scene_schema::load_schema_file(path),
            None => Ok(scene_schema::builtin()),
        }
    }
}
