//! Configuration file support for SwiSekai.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/sekai/config.toml`.

use crate::progress::{DEFAULT_ACTIVITY_WINDOW_DAYS, DEFAULT_STARTING_LEVEL};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub progress: ProgressConfig,

    #[serde(default)]
    pub activity: ActivityConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Curriculum location
///
/// When unset, content is read from `<data_dir>/content`.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ContentConfig {
    #[serde(default)]
    pub content_dir: Option<PathBuf>,
}

/// Learner progression parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_starting_level")]
    pub starting_level: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            starting_level: default_starting_level(),
        }
    }
}

/// Activity strip parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sekai")
}

fn default_starting_level() -> u32 {
    DEFAULT_STARTING_LEVEL
}

fn default_window_days() -> u32 {
    DEFAULT_ACTIVITY_WINDOW_DAYS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.check()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sekai")
            .join("config.toml")
    }

    /// Directory holding the chapter and project files
    pub fn content_dir(&self) -> PathBuf {
        self.content
            .content_dir
            .clone()
            .unwrap_or_else(|| self.data.data_dir.join("content"))
    }

    /// Path of the persisted learner record inside `data_dir`
    pub fn progress_path(data_dir: &Path) -> PathBuf {
        data_dir.join("progress.json")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.activity.window_days == 0 {
            return Err(Error::Config("activity.window_days must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.progress.starting_level, 1);
        assert_eq!(config.activity.window_days, 7);
        assert!(config.content_dir().ends_with("content"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config::default();
        config.progress.starting_level = 0;
        config.content.content_dir = Some(PathBuf::from("/srv/curriculum"));
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.progress.starting_level, 0);
        assert_eq!(parsed.content_dir(), PathBuf::from("/srv/curriculum"));
        assert_eq!(parsed.activity.window_days, config.activity.window_days);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[activity]
window_days = 14
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.activity.window_days, 14);
        assert_eq!(config.progress.starting_level, 1); // default
    }

    #[test]
    fn test_zero_window_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[activity]\nwindow_days = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
