use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::LexitagError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub annotation: AnnotationConfig,
    #[serde(default)]
    pub dictionaries: DictionariesConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub text_column: String,
    /// Column used to label records in the detailed report.
    pub id_column: Option<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            text_column: "Statement".into(),
            id_column: Some("ID".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    pub detail: bool,
    pub parallel: bool,
    pub chunk_size: usize,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            detail: false,
            parallel: false,
            chunk_size: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictionariesConfig {
    pub seed_defaults: bool,
    pub sources: Vec<DictionarySource>,
}

impl Default for DictionariesConfig {
    fn default() -> Self {
        Self {
            seed_defaults: true,
            sources: Vec::new(),
        }
    }
}

/// A user dictionary loaded from a newline-separated term file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionarySource {
    pub name: String,
    pub path: PathBuf,
}

impl AppConfig {
    /// Load config: user file (if exists) over built-in defaults.
    pub fn load() -> Result<Self, LexitagError> {
        let user_path = Self::config_path();
        if user_path.exists() {
            Self::load_from(&user_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from an explicit file. Missing sections fall back to defaults.
    pub fn load_from(path: &Path) -> Result<Self, LexitagError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LexitagError::Config(e.to_string()))?;
        let config: AppConfig =
            toml::from_str(&content).map_err(|e| LexitagError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save current config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), LexitagError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| LexitagError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), LexitagError> {
        if self.dataset.text_column.trim().is_empty() {
            return Err(LexitagError::Config("dataset.text_column is empty".into()));
        }
        if self.annotation.chunk_size == 0 {
            return Err(LexitagError::Config(
                "annotation.chunk_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        Self::project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "lexitag")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}
