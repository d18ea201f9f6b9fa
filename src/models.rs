// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! Core data structures shared by the analysis engine, the provider layer and
//! the report front end.
//!
//! ## Design Principles
//!
//! - **Validated once**: platform payloads arrive as [`ActivityRecord`] /
//!   [`StreamRecord`] and are converted into strict internal types at a single
//!   boundary. Nothing downstream re-validates.
//! - **Serializable**: every derived record serializes with stable snake_case
//!   field names that the rendering and persistence layers depend on.
//! - **Immutable**: derived records are recomputed wholesale, never patched.
//!
//! ## Core Models
//!
//! - [`RawActivity`]: one validated run from the platform
//! - [`SensorStreamSet`]: optional 1 Hz sensor series for one activity
//! - [`AnalyzedActivity`]: per-run MAF metric set
//! - [`MafTrend`]: per-run rolling 28-day averages
//! - [`MafSummary`]: point-in-time progress snapshot
//! - [`Advice`]: one piece of coaching guidance

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Errors raised while converting untrusted input into internal types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Field {field} must not be negative (got {value})")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("Field {0} must be a finite number")]
    NonFiniteValue(&'static str),

    #[error("Invalid training modifier {0}: expected one of -10, -5, 0, 5")]
    InvalidModifier(i32),

    #[error("Invalid age {0}: expected 1..=120")]
    InvalidAge(u32),

    #[error("Invalid units '{0}': expected 'km' or 'mi'")]
    InvalidUnits(String),
}

/// A single validated activity from the fitness platform
///
/// # Examples
///
/// ```rust
/// use maf_tracker::models::{ActivityRecord, RawActivity};
///
/// let record: ActivityRecord = serde_json::from_str(r#"{
///     "id": 1001,
///     "name": "Easy Run",
///     "type": "Run",
///     "start_date": "2024-03-01T07:00:00Z",
///     "elapsed_time": 2400,
///     "distance": 7200.0,
///     "average_heartrate": 141.0,
///     "average_cadence": 84.0,
///     "average_speed": 3.0
/// }"#).unwrap();
///
/// let activity = RawActivity::try_from(record).unwrap();
/// assert_eq!(activity.id, "1001");
/// assert!(activity.is_run());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawActivity {
    /// Platform identifier, always carried as a string
    pub id: String,
    /// Activity title
    pub name: String,
    /// Platform sport type ("Run", "TrailRun", "Ride", ...)
    pub sport_type: String,
    /// Start time (UTC)
    pub start_date: DateTime<Utc>,
    /// Wall-clock duration in seconds
    pub elapsed_time: u64,
    /// Moving duration in seconds
    pub moving_time: u64,
    /// Distance in meters
    pub distance: f64,
    /// Average heart rate (BPM)
    pub average_heartrate: Option<f64>,
    /// Average cadence as reported by the platform (single-leg steps per minute)
    pub average_cadence: Option<f64>,
    /// Total elevation gain in meters
    pub total_elevation_gain: f64,
    /// Average speed in meters per second
    pub average_speed: f64,
}

impl RawActivity {
    /// Whether the activity is a running activity the MAF analysis applies to
    pub fn is_run(&self) -> bool {
        matches!(self.sport_type.as_str(), "Run" | "TrailRun" | "VirtualRun")
    }
}

/// Activity identifier as the platform sends it (number or string)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActivityId {
    Number(u64),
    Text(String),
}

impl ActivityId {
    fn into_string(self) -> String {
        match self {
            ActivityId::Number(n) => n.to_string(),
            ActivityId::Text(s) => s.trim().to_string(),
        }
    }
}

/// Activity as it appears in the platform's JSON (list endpoint or export)
///
/// Every field is optional here; [`RawActivity::try_from`] decides what is
/// required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Option<ActivityId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub sport_type: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub elapsed_time: Option<f64>,
    #[serde(default)]
    pub moving_time: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub average_cadence: Option<f64>,
    #[serde(default)]
    pub total_elevation_gain: Option<f64>,
    #[serde(default)]
    pub average_speed: Option<f64>,
}

fn checked_non_negative(field: &'static str, value: f64) -> Result<f64, InputError> {
    if !value.is_finite() {
        return Err(InputError::NonFiniteValue(field));
    }
    if value < 0.0 {
        return Err(InputError::NegativeValue { field, value });
    }
    Ok(value)
}

fn checked_optional(field: &'static str, value: Option<f64>) -> Result<Option<f64>, InputError> {
    value.map(|v| checked_non_negative(field, v)).transpose()
}

/// Parse an ISO-8601 / RFC 3339 timestamp into UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, InputError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| InputError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

impl TryFrom<ActivityRecord> for RawActivity {
    type Error = InputError;

    fn try_from(record: ActivityRecord) -> Result<Self, Self::Error> {
        let id = record
            .id
            .map(ActivityId::into_string)
            .filter(|id| !id.is_empty())
            .ok_or(InputError::MissingField("id"))?;

        let sport_type = record
            .sport_type
            .or(record.activity_type)
            .ok_or(InputError::MissingField("sport_type"))?;

        let start_date = record
            .start_date
            .as_deref()
            .ok_or(InputError::MissingField("start_date"))
            .and_then(parse_timestamp)?;

        let elapsed = record
            .elapsed_time
            .ok_or(InputError::MissingField("elapsed_time"))
            .and_then(|v| checked_non_negative("elapsed_time", v))?;
        let moving = checked_optional("moving_time", record.moving_time)?.unwrap_or(elapsed);

        Ok(RawActivity {
            id,
            name: record.name.unwrap_or_default(),
            sport_type,
            start_date,
            // Truncate to whole seconds
            elapsed_time: elapsed.floor() as u64,
            moving_time: moving.floor() as u64,
            distance: checked_optional("distance", record.distance)?.unwrap_or(0.0),
            average_heartrate: checked_optional("average_heartrate", record.average_heartrate)?,
            average_cadence: checked_optional("average_cadence", record.average_cadence)?,
            total_elevation_gain: record
                .total_elevation_gain
                .filter(|v| v.is_finite())
                .unwrap_or(0.0),
            average_speed: checked_optional("average_speed", record.average_speed)?.unwrap_or(0.0),
        })
    }
}

/// High-resolution sensor series for a single activity
///
/// Series are sampled at the platform's fixed interval (typically 1 Hz) and
/// are equal or near-equal in length. A missing series is an empty vector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorStreamSet {
    #[serde(default)]
    pub heartrate: Vec<f64>,
    /// Single-leg cadence, as reported
    #[serde(default)]
    pub cadence: Vec<f64>,
    /// Smoothed velocity in m/s
    #[serde(default)]
    pub velocity_smooth: Vec<f64>,
    /// Elapsed seconds since start
    #[serde(default)]
    pub time: Vec<f64>,
    /// Cumulative distance in meters
    #[serde(default)]
    pub distance: Vec<f64>,
    /// Altitude in meters
    #[serde(default)]
    pub altitude: Vec<f64>,
}

impl SensorStreamSet {
    /// Number of samples usable for zone analysis (HR and velocity aligned)
    pub fn aligned_len(&self) -> usize {
        self.heartrate.len().min(self.velocity_smooth.len())
    }

    /// True when the set carries no heart-rate/velocity samples at all
    pub fn is_empty(&self) -> bool {
        self.aligned_len() == 0
    }
}

/// One series in the platform's key-by-type stream payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamSeries {
    #[serde(default)]
    pub data: Vec<Option<f64>>,
    #[serde(default)]
    pub series_type: Option<String>,
    #[serde(default)]
    pub original_size: Option<usize>,
}

impl StreamSeries {
    fn into_values(self) -> Vec<f64> {
        // Dropout samples become 0 so indices stay aligned across series
        self.data
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()).unwrap_or(0.0))
            .collect()
    }
}

/// Stream payload as returned with `key_by_type=true`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(default)]
    pub heartrate: Option<StreamSeries>,
    #[serde(default)]
    pub cadence: Option<StreamSeries>,
    #[serde(default)]
    pub velocity_smooth: Option<StreamSeries>,
    #[serde(default)]
    pub time: Option<StreamSeries>,
    #[serde(default)]
    pub distance: Option<StreamSeries>,
    #[serde(default)]
    pub altitude: Option<StreamSeries>,
}

impl From<StreamRecord> for SensorStreamSet {
    fn from(record: StreamRecord) -> Self {
        let values = |series: Option<StreamSeries>| series.map(StreamSeries::into_values).unwrap_or_default();
        SensorStreamSet {
            heartrate: values(record.heartrate),
            cadence: values(record.cadence),
            velocity_smooth: values(record.velocity_smooth),
            time: values(record.time),
            distance: values(record.distance),
            altitude: values(record.altitude),
        }
    }
}

/// Streams keyed by activity id
pub type StreamsById = HashMap<String, SensorStreamSet>;

/// Per-run MAF metric set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedActivity {
    pub id: String,
    pub name: String,
    pub date: DateTime<Utc>,
    /// Elapsed duration in seconds
    pub duration: u64,
    /// Distance in meters
    pub distance: f64,
    pub elevation_gain: f64,
    pub avg_hr: Option<f64>,
    /// Steps per minute (both legs)
    pub avg_cadence: Option<f64>,
    /// Minutes per unit distance
    pub avg_pace: f64,
    pub time_in_maf_zone_pct: f64,
    pub time_in_qualifying_zone_pct: f64,
    /// Average pace while inside the MAF zone, minutes per unit distance
    pub maf_pace: f64,
    pub cardiac_drift: Option<f64>,
    pub aerobic_decoupling: Option<f64>,
    pub cadence_in_zone: Option<f64>,
    /// Meters per minute per heartbeat
    pub efficiency_factor: f64,
    pub qualifying: bool,
    pub excluded: bool,
    /// Whether the metrics were derived from sensor streams
    pub has_streams: bool,
}

/// Rolling 28-day trend point for one activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MafTrend {
    pub activity_id: String,
    pub date: DateTime<Utc>,
    pub hr: Option<f64>,
    pub maf_pace: f64,
    pub efficiency_factor: f64,
    pub cadence: Option<f64>,
    pub decoupling: Option<f64>,
    pub rolling_hr: Option<f64>,
    pub rolling_pace: Option<f64>,
    pub rolling_ef: Option<f64>,
    pub rolling_cadence: Option<f64>,
    pub rolling_decoupling: Option<f64>,
}

/// Direction of a metric's 8-week trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Plateau,
    Regressing,
    /// Fewer than three points in the trend window
    Insufficient,
}

impl TrendDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Plateau => "plateau",
            TrendDirection::Regressing => "regressing",
            TrendDirection::Insufficient => "insufficient",
        }
    }
}

/// Point-in-time snapshot of MAF progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MafSummary {
    pub current_hr: Option<f64>,
    pub current_pace: Option<f64>,
    pub current_ef: Option<f64>,
    /// HR slope in BPM per week
    pub hr_trend: Option<f64>,
    /// Pace slope in seconds per unit distance per week
    pub pace_trend: Option<f64>,
    /// EF slope per week
    pub ef_trend: Option<f64>,
    pub hr_trend_direction: TrendDirection,
    pub pace_trend_direction: TrendDirection,
    pub ef_trend_direction: TrendDirection,
    pub zone_discipline: Option<f64>,
    pub avg_decoupling: Option<f64>,
    pub avg_cadence: Option<f64>,
    pub total_runs: usize,
    pub recent_runs: usize,
    pub qualifying_runs: usize,
    pub qualifying_pct: f64,
}

impl MafSummary {
    /// Summary of an empty activity set
    pub fn empty() -> Self {
        Self {
            current_hr: None,
            current_pace: None,
            current_ef: None,
            hr_trend: None,
            pace_trend: None,
            ef_trend: None,
            hr_trend_direction: TrendDirection::Insufficient,
            pace_trend_direction: TrendDirection::Insufficient,
            ef_trend_direction: TrendDirection::Insufficient,
            zone_discipline: None,
            avg_decoupling: None,
            avg_cadence: None,
            total_runs: 0,
            recent_runs: 0,
            qualifying_runs: 0,
            qualifying_pct: 0.0,
        }
    }
}

/// Area a piece of advice targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceFocus {
    Consistency,
    HrControl,
    ZoneDiscipline,
    Recovery,
    Cadence,
    Volume,
    LongRun,
    Encouragement,
}

impl AdviceFocus {
    pub fn as_str(self) -> &'static str {
        match self {
            AdviceFocus::Consistency => "consistency",
            AdviceFocus::HrControl => "hr_control",
            AdviceFocus::ZoneDiscipline => "zone_discipline",
            AdviceFocus::Recovery => "recovery",
            AdviceFocus::Cadence => "cadence",
            AdviceFocus::Volume => "volume",
            AdviceFocus::LongRun => "long_run",
            AdviceFocus::Encouragement => "encouragement",
        }
    }
}

/// Coaching guidance selected from the current summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub headline: String,
    pub body: String,
    pub focus: AdviceFocus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> ActivityRecord {
        serde_json::from_value(json!({
            "id": 98765,
            "name": "Morning Run",
            "type": "Run",
            "start_date": "2024-01-15T08:00:00Z",
            "elapsed_time": 1800,
            "moving_time": 1750,
            "distance": 5000.0,
            "total_elevation_gain": 42.0,
            "average_heartrate": 148.2,
            "average_cadence": 86.0,
            "average_speed": 2.86
        }))
        .unwrap()
    }

    #[test]
    fn test_activity_record_conversion() {
        let activity = RawActivity::try_from(sample_record()).unwrap();
        assert_eq!(activity.id, "98765");
        assert_eq!(activity.sport_type, "Run");
        assert_eq!(activity.elapsed_time, 1800);
        assert_eq!(activity.moving_time, 1750);
        assert_eq!(activity.average_heartrate, Some(148.2));
        assert_eq!(activity.start_date.to_rfc3339(), "2024-01-15T08:00:00+00:00");
        assert!(activity.is_run());
    }

    #[test]
    fn test_sport_type_takes_precedence_over_type() {
        let mut record = sample_record();
        record.sport_type = Some("TrailRun".to_string());
        let activity = RawActivity::try_from(record).unwrap();
        assert_eq!(activity.sport_type, "TrailRun");
        assert!(activity.is_run());
    }

    #[test]
    fn test_string_ids_and_defaults() {
        let record: ActivityRecord = serde_json::from_value(json!({
            "id": "abc-1",
            "type": "Ride",
            "start_date": "2024-01-15T08:00:00+02:00",
            "elapsed_time": 600
        }))
        .unwrap();
        let activity = RawActivity::try_from(record).unwrap();
        assert_eq!(activity.id, "abc-1");
        assert_eq!(activity.moving_time, 600);
        assert_eq!(activity.distance, 0.0);
        assert_eq!(activity.average_heartrate, None);
        assert_eq!(activity.start_date.to_rfc3339(), "2024-01-15T06:00:00+00:00");
        assert!(!activity.is_run());
    }

    #[test]
    fn test_fractional_durations_truncate() {
        let mut record = sample_record();
        record.elapsed_time = Some(1199.6);
        record.moving_time = Some(1150.9);
        let activity = RawActivity::try_from(record).unwrap();
        assert_eq!(activity.elapsed_time, 1199);
        assert_eq!(activity.moving_time, 1150);
    }

    #[test]
    fn test_invalid_records_are_rejected() {
        let mut missing_id = sample_record();
        missing_id.id = None;
        assert_eq!(RawActivity::try_from(missing_id), Err(InputError::MissingField("id")));

        let mut bad_date = sample_record();
        bad_date.start_date = Some("yesterday".to_string());
        assert!(matches!(
            RawActivity::try_from(bad_date),
            Err(InputError::InvalidTimestamp { .. })
        ));

        let mut negative = sample_record();
        negative.distance = Some(-5.0);
        assert!(matches!(
            RawActivity::try_from(negative),
            Err(InputError::NegativeValue { field: "distance", .. })
        ));

        let mut no_type = sample_record();
        no_type.activity_type = None;
        assert_eq!(
            RawActivity::try_from(no_type),
            Err(InputError::MissingField("sport_type"))
        );
    }

    #[test]
    fn test_stream_record_conversion() {
        let record: StreamRecord = serde_json::from_value(json!({
            "heartrate": { "data": [140.0, 142.0, null, 145.0], "series_type": "time" },
            "velocity_smooth": { "data": [3.0, 3.1, 3.1] },
            "latlng": { "data": [[45.0, -73.0]] }
        }))
        .unwrap();
        let streams = SensorStreamSet::from(record);
        assert_eq!(streams.heartrate, vec![140.0, 142.0, 0.0, 145.0]);
        assert!(streams.cadence.is_empty());
        assert_eq!(streams.aligned_len(), 3);
        assert!(!streams.is_empty());
    }

    #[test]
    fn test_summary_serialization_shape() {
        let json = serde_json::to_value(MafSummary::empty()).unwrap();
        assert_eq!(json["hr_trend_direction"], "insufficient");
        assert!(json["current_hr"].is_null());
        assert_eq!(json["qualifying_runs"], 0);
    }
}
