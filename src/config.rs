// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the MAF tracker

pub mod athlete;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub use athlete::{AthleteConfig, MafZone};

use crate::models::parse_timestamp;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub athlete: AthleteConfig,
    #[serde(default)]
    pub strava: Option<ProviderConfig>,
    /// Where the excluded-activity set is persisted
    #[serde(default)]
    pub exclusions_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub access_token: Option<String>,
    pub api_base: Option<String>,
    pub per_page: Option<usize>,
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("maf-tracker/config.toml"))
            .unwrap_or_else(|| "config.toml".into())
    }

    /// Load configuration from an explicit path, the default path, or the environment
    pub fn load(path: Option<String>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from_file(&config_path);
        }

        let default_path = Self::default_path();
        if default_path.exists() {
            return Self::load_from_file(&default_path);
        }

        Self::from_env()
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.athlete.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Build configuration from environment variables (after loading `.env`)
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenv::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let defaults = AthleteConfig::default();
        let athlete = AthleteConfig {
            age: env_parse("MAF_AGE")?.unwrap_or(defaults.age),
            modifier: env_parse("MAF_MODIFIER")?.unwrap_or(defaults.modifier),
            units: env_parse("MAF_UNITS")?.unwrap_or(defaults.units),
            qualifying_tolerance: env_parse("MAF_QUALIFYING_TOLERANCE")?
                .unwrap_or(defaults.qualifying_tolerance),
            start_date: env::var("MAF_START_DATE")
                .ok()
                .map(|v| parse_timestamp(&v))
                .transpose()
                .context("Invalid MAF_START_DATE value")?,
        };
        athlete.validate()?;

        let strava = env::var("STRAVA_ACCESS_TOKEN").ok().map(|token| ProviderConfig {
            access_token: Some(token),
            api_base: env::var("STRAVA_API_BASE").ok(),
            per_page: None,
        });

        Ok(Config {
            athlete,
            strava,
            exclusions_path: env::var("MAF_EXCLUSIONS_PATH").ok().map(PathBuf::from),
        })
    }

    /// Exclusion file location, defaulting next to the config file
    pub fn exclusions_path(&self) -> PathBuf {
        self.exclusions_path.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .map(|p| p.join("maf-tracker/excluded.json"))
                .unwrap_or_else(|| "excluded.json".into())
        })
    }

    /// Short human-readable summary for logging
    pub fn summary(&self) -> String {
        let zone = self.athlete.zone();
        format!(
            "MAF HR {} (zone {}-{}, qualifying up to {}), units {}, Strava: {}",
            zone.maf_hr,
            zone.zone_low,
            zone.zone_high,
            zone.qualifying_high(),
            self.athlete.units,
            if self.strava.as_ref().and_then(|s| s.access_token.as_ref()).is_some() {
                "Enabled"
            } else {
                "Disabled"
            }
        )
    }
}

/// Parse an optional environment variable
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("Invalid {} value '{}': {}", key, raw, e)),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::UnitSystem;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_file_loading() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(
            temp_file,
            r#"
exclusions_path = "/tmp/maf-excluded.json"

[athlete]
age = 38
modifier = 0
units = "km"
qualifying_tolerance = 8

[strava]
access_token = "token-123"
per_page = 50
"#
        )?;

        let config = Config::load(Some(temp_file.path().to_string_lossy().to_string()))?;
        assert_eq!(config.athlete.age, 38);
        assert_eq!(config.athlete.units, UnitSystem::Metric);
        assert_eq!(config.athlete.zone().qualifying_high(), 155.0);
        let strava = config.strava.as_ref().unwrap();
        assert_eq!(strava.access_token.as_deref(), Some("token-123"));
        assert_eq!(strava.per_page, Some(50));
        assert_eq!(config.exclusions_path(), PathBuf::from("/tmp/maf-excluded.json"));
        assert!(config.summary().contains("MAF HR 142"));
        Ok(())
    }

    #[test]
    fn test_missing_sections_use_defaults() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "[athlete]\nage = 50")?;
        let config = Config::load_from_file(temp_file.path())?;
        assert_eq!(config.athlete.maf_hr(), 130);
        assert!(config.strava.is_none());
        assert!(config.summary().contains("Strava: Disabled"));
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Config::load(Some("/nonexistent/maf/config.toml".to_string())).is_err());
    }
}
