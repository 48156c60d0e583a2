use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::disaster::DEFAULT_BATCH_SIZE;
use crate::domain::error::Result;

pub const CONFIG_FILE: &str = "disaster_import.toml";
pub const ENV_PREFIX: &str = "DISASTER_IMPORT_";

/// Runtime settings for the importer.
///
/// Layered as defaults, then `disaster_import.toml`, then
/// `DISASTER_IMPORT_*` environment variables. Command line flags are
/// applied on top by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(length(min = 1))]
    pub database_url: String,

    /// CSV file imported when none is given
    pub default_file: PathBuf,

    #[validate(range(min = 1, max = 10000))]
    pub batch_size: usize,

    /// Rows between progress log lines
    #[validate(range(min = 1))]
    pub progress_every: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://data/disasters.db".to_string(),
            default_file: PathBuf::from("data/global_disasters.csv"),
            batch_size: DEFAULT_BATCH_SIZE,
            progress_every: 1000,
        }
    }
}

impl Settings {
    /// Load `.env`, the config file and the environment
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_figment(Self::figment())
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment.extract()?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::AppError;

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::from_figment(defaults()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.batch_size, 100);
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let figment = defaults().merge(Toml::string(
            r#"
            database_url = "sqlite::memory:"
            batch_size = 250
            "#,
        ));
        let settings = Settings::from_figment(figment).unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.batch_size, 250);
        assert_eq!(settings.default_file, PathBuf::from("data/global_disasters.csv"));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let figment = defaults().merge(Serialized::default("batch_size", 0));
        let err = Settings::from_figment(figment).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(ref msg) if msg.contains("batch_size")));
    }

    #[test]
    fn test_empty_database_url_rejected() {
        let figment = defaults().merge(Serialized::default("database_url", ""));
        assert!(Settings::from_figment(figment).is_err());
    }

    #[test]
    fn test_wrong_type_is_config_error() {
        let figment = defaults().merge(Toml::string("batch_size = \"lots\""));
        assert!(matches!(
            Settings::from_figment(figment),
            Err(AppError::ConfigError(_))
        ));
    }
}
