// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Unit-aware pace conversion and display formatting

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::InputError;

/// Meters in one statute mile
pub const METERS_PER_MILE: f64 = 1609.344;

/// Meters in one kilometer
pub const METERS_PER_KILOMETER: f64 = 1000.0;

/// Distance unit used for pace display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitSystem {
    /// Minutes per kilometer
    #[default]
    #[serde(rename = "km")]
    Metric,
    /// Minutes per mile
    #[serde(rename = "mi")]
    Imperial,
}

impl UnitSystem {
    /// Length of one pace unit in meters
    pub fn unit_distance_meters(self) -> f64 {
        match self {
            UnitSystem::Metric => METERS_PER_KILOMETER,
            UnitSystem::Imperial => METERS_PER_MILE,
        }
    }

    /// Short label used in formatted paces ("km" / "mi")
    pub fn label(self) -> &'static str {
        match self {
            UnitSystem::Metric => "km",
            UnitSystem::Imperial => "mi",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UnitSystem {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "km" | "metric" => Ok(UnitSystem::Metric),
            "mi" | "imperial" => Ok(UnitSystem::Imperial),
            other => Err(InputError::InvalidUnits(other.to_string())),
        }
    }
}

/// Convert a velocity in m/s to minutes per unit distance.
///
/// Non-positive velocities yield `0.0` rather than an infinite pace.
pub fn velocity_to_pace(meters_per_second: f64, unit: UnitSystem) -> f64 {
    if meters_per_second <= 0.0 {
        return 0.0;
    }
    (unit.unit_distance_meters() / meters_per_second) / 60.0
}

/// Render a pace (minutes per unit) as `"M:SS /unit"`.
///
/// Seconds are rounded independently of the minute, so a pace such as
/// `5.999` renders as `"5:60 /km"`. Use [`format_pace_carried`] for the
/// normalized rendering.
pub fn format_pace(pace_minutes: f64, unit: UnitSystem) -> String {
    let minutes = pace_minutes.floor();
    let seconds = ((pace_minutes - minutes) * 60.0).round();
    format!("{}:{:02} /{}", minutes as i64, seconds as i64, unit.label())
}

/// Render a pace with the seconds carried into the minute ("6:00" instead of "5:60")
pub fn format_pace_carried(pace_minutes: f64, unit: UnitSystem) -> String {
    let total_seconds = (pace_minutes * 60.0).round() as i64;
    format!("{}:{:02} /{}", total_seconds / 60, total_seconds % 60, unit.label())
}

/// Render an efficiency factor with two decimals
pub fn format_ef(value: f64) -> String {
    format!("{:.2}", value)
}
