// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Athlete zone settings and the MAF heart-rate zone derived from them

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::constants::maf;
use crate::models::InputError;
use crate::units::UnitSystem;

/// Athlete-controlled settings the MAF zone is derived from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteConfig {
    pub age: u32,
    /// Training-status modifier, one of -10, -5, 0, 5
    #[serde(default)]
    pub modifier: i32,
    #[serde(default)]
    pub units: UnitSystem,
    #[serde(default = "default_qualifying_tolerance")]
    pub qualifying_tolerance: u32,
    /// Activities before this instant are ignored
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
}

fn default_qualifying_tolerance() -> u32 {
    maf::DEFAULT_QUALIFYING_TOLERANCE
}

/// Heart-rate thresholds the analysis runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MafZone {
    pub maf_hr: i32,
    pub zone_low: i32,
    pub zone_high: i32,
    pub qualifying_tolerance: u32,
}

impl MafZone {
    /// Zone around an explicit MAF heart rate
    pub fn from_maf_hr(maf_hr: i32, qualifying_tolerance: u32) -> Self {
        Self {
            maf_hr,
            zone_low: maf_hr - maf::ZONE_HALF_WIDTH,
            zone_high: maf_hr + maf::ZONE_HALF_WIDTH,
            qualifying_tolerance,
        }
    }

    /// Upper bound of the qualifying zone
    pub fn qualifying_high(&self) -> f64 {
        f64::from(self.zone_high) + f64::from(self.qualifying_tolerance)
    }

    /// Closed-interval membership in the MAF zone
    pub fn contains(&self, hr: f64) -> bool {
        hr >= f64::from(self.zone_low) && hr <= f64::from(self.zone_high)
    }

    /// Closed-interval membership in the qualifying zone
    pub fn qualifies(&self, hr: f64) -> bool {
        hr >= f64::from(self.zone_low) && hr <= self.qualifying_high()
    }
}

impl AthleteConfig {
    /// Load athlete settings from a TOML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read athlete config file: {}", path))?;

        let config: AthleteConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse athlete config file: {}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Check the settings are within the ranges the 180-formula is defined for
    pub fn validate(&self) -> Result<(), InputError> {
        if !maf::ALLOWED_MODIFIERS.contains(&self.modifier) {
            return Err(InputError::InvalidModifier(self.modifier));
        }
        if self.age == 0 || self.age > 120 {
            return Err(InputError::InvalidAge(self.age));
        }
        Ok(())
    }

    /// MAF heart rate: 180 - age + modifier
    pub fn maf_hr(&self) -> i32 {
        maf::BASE_HEART_RATE - self.age as i32 + self.modifier
    }

    /// Zone derived from these settings
    pub fn zone(&self) -> MafZone {
        MafZone::from_maf_hr(self.maf_hr(), self.qualifying_tolerance)
    }
}

impl Default for AthleteConfig {
    fn default() -> Self {
        Self {
            age: 40,
            modifier: 0,
            units: UnitSystem::Metric,
            qualifying_tolerance: maf::DEFAULT_QUALIFYING_TOLERANCE,
            start_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_zone() {
        let zone = AthleteConfig::default().zone();
        assert_eq!(zone.maf_hr, 140);
        assert_eq!(zone.zone_low, 135);
        assert_eq!(zone.zone_high, 145);
        assert_eq!(zone.qualifying_tolerance, 10);
        assert_eq!(zone.qualifying_high(), 155.0);
    }

    #[test]
    fn test_modifier_applies() {
        let config = AthleteConfig {
            age: 35,
            modifier: -5,
            ..AthleteConfig::default()
        };
        assert_eq!(config.maf_hr(), 140);

        let config = AthleteConfig {
            age: 30,
            modifier: 5,
            ..AthleteConfig::default()
        };
        assert_eq!(config.zone().zone_high, 160);
    }

    #[test]
    fn test_zone_membership_is_closed() {
        let zone = MafZone::from_maf_hr(145, 10);
        assert!(zone.contains(140.0));
        assert!(zone.contains(150.0));
        assert!(!zone.contains(139.9));
        assert!(!zone.contains(150.1));
        assert!(zone.qualifies(160.0));
        assert!(!zone.qualifies(160.5));
    }

    #[test]
    fn test_validation() {
        let mut config = AthleteConfig::default();
        assert!(config.validate().is_ok());

        config.modifier = 3;
        assert_eq!(config.validate(), Err(InputError::InvalidModifier(3)));

        config.modifier = -10;
        config.age = 0;
        assert_eq!(config.validate(), Err(InputError::InvalidAge(0)));
    }

    #[test]
    fn test_config_file_loading() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(
            temp_file,
            r#"
age = 45
modifier = -5
units = "mi"
start_date = "2024-01-01T00:00:00Z"
"#
        )?;

        let config = AthleteConfig::load_from_file(temp_file.path().to_str().unwrap())?;
        assert_eq!(config.age, 45);
        assert_eq!(config.units, UnitSystem::Imperial);
        assert_eq!(config.qualifying_tolerance, 10);
        assert_eq!(config.maf_hr(), 130);
        assert!(config.start_date.is_some());
        Ok(())
    }

    #[test]
    fn test_invalid_modifier_in_file_is_rejected() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "age = 45\nmodifier = 7")?;
        assert!(AthleteConfig::load_from_file(temp_file.path().to_str().unwrap()).is_err());
        Ok(())
    }
}
