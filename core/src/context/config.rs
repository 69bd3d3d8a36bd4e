//! Application configuration
//!
//! This module re-exports the shared AppConfig from stormclock-types and
//! provides its platform defaults and persistence.

pub use stormclock_types::AppConfig;

use std::path::{Path, PathBuf};

use super::ConfigError;

const APP_NAME: &str = "stormclock";
const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// `<data dir>/stormclock/content`, or empty if the platform has no data dir
fn default_content_directory() -> String {
    dirs::data_local_dir()
        .map(|p| p.join(APP_NAME).join("content"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// AppConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for AppConfig persistence
pub trait AppConfigExt: Sized {
    /// Platform location of the config file
    fn default_path() -> Result<PathBuf, ConfigError>;
    fn try_load_from(path: &Path) -> Result<Self, ConfigError>;
    fn load_from(path: &Path) -> Self;
    fn load_with_defaults() -> Self;
    fn save_to(&self, path: &Path) -> Result<(), ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)?)
    }

    fn try_load_from(path: &Path) -> Result<Self, ConfigError> {
        Ok(confy::load_path(path)?)
    }

    /// Stored config, falling back to defaults if it cannot be read
    fn load_from(path: &Path) -> Self {
        match Self::try_load_from(path) {
            Ok(mut config) => {
                if config.content_directory.is_empty() {
                    config.content_directory = default_content_directory();
                }
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                Self::load_with_defaults()
            }
        }
    }

    /// Load with platform-specific defaults (used when no config file exists)
    fn load_with_defaults() -> Self {
        AppConfig::with_content_directory(default_content_directory())
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self).map_err(ConfigError::Save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_content_at_data_dir() {
        let config = AppConfig::load_with_defaults();
        assert_eq!(config.autosave_debounce_ms, 350);
        assert!(config.start_with_sample);
        if let Some(dir) = dirs::data_local_dir() {
            assert!(config.content_directory.starts_with(dir.to_str().unwrap()));
        }
    }

    #[test]
    fn config_seeds_encounter_settings() {
        let config = AppConfig {
            skip_empty_phases: true,
            storage_key: "table-two".into(),
            ..AppConfig::load_with_defaults()
        };
        let settings = config.encounter_settings();
        assert!(settings.skip_empty_phases);
        assert_eq!(settings.storage_key, "table-two");
    }

    #[test]
    fn saved_config_is_loaded_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig {
            persistence_mode: stormclock_types::PersistenceMode::Volatile,
            storage_key: "table-two".into(),
            ..AppConfig::load_with_defaults()
        };
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path), config);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml"));
        assert_eq!(config, AppConfig::load_with_defaults());
    }
}
