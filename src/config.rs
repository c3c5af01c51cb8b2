use crate::error::Result;
use crate::models::SchedulerParams;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_NAME: &str = "flashcards";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub database: DatabaseConfig,
    pub scheduler: SchedulerParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(PROJECT_NAME)
                .join(format!("{PROJECT_NAME}.sqlite3")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            database: DatabaseConfig::default(),
            scheduler: SchedulerParams::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// An explicit path must load. Otherwise `<config_dir>/flashcards/flashcards.yml`
    /// and then `./flashcards.yml` are tried, falling back to defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let mut candidates = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(
                config_dir
                    .join(PROJECT_NAME)
                    .join(format!("{PROJECT_NAME}.yml")),
            );
        }
        candidates.push(PathBuf::from(format!("{PROJECT_NAME}.yml")));

        for candidate in candidates {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    warn!("Failed to load config from {}: {}", candidate.display(), e);
                }
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.scheduler.validate()?;

        info!("Loaded config from: {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlashcardsError;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert_eq!(config.scheduler, SchedulerParams::default());
        assert!(config.database.path.ends_with("flashcards.sqlite3"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flashcards.yml");
        fs::write(
            &path,
            "database:\n  path: /tmp/cards.sqlite3\nscheduler:\n  first_easy_interval: 3\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/cards.sqlite3"));
        assert_eq!(config.scheduler.first_easy_interval, 3);
        assert_eq!(config.scheduler.ease_floor, 1.3);
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_invalid_scheduler_params_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flashcards.yml");
        fs::write(&path, "scheduler:\n  ease_floor: -1.0\n").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(FlashcardsError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(Some(&dir.path().join("nope.yml")));
        assert!(matches!(result, Err(FlashcardsError::Io(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flashcards.yml");
        fs::write(&path, "scheduler: [unclosed").unwrap();

        assert!(matches!(
            Config::load(Some(&path)),
            Err(FlashcardsError::Yaml(_))
        ));
    }
}
