// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Per-activity MAF analysis
//!
//! Turns one [`RawActivity`] and its optional sensor streams into an
//! [`AnalyzedActivity`]. The analysis never fails: missing heart-rate, speed or
//! stream data degrade to `0` / `None` instead of errors.

use tracing::debug;

use super::mean;
use crate::config::MafZone;
use crate::constants::analysis;
use crate::models::{AnalyzedActivity, RawActivity, SensorStreamSet};
use crate::units::{velocity_to_pace, UnitSystem};

/// Zone-related metrics, from streams or estimated from the activity average
#[derive(Debug, Clone, PartialEq)]
struct ZoneMetrics {
    time_in_maf_zone_pct: f64,
    time_in_qualifying_zone_pct: f64,
    maf_pace: f64,
    cardiac_drift: Option<f64>,
    aerobic_decoupling: Option<f64>,
    cadence_in_zone: Option<f64>,
}

/// Analyzer bound to one athlete's zone and unit settings
#[derive(Debug, Clone, Copy)]
pub struct MafAnalyzer {
    zone: MafZone,
    unit: UnitSystem,
}

impl MafAnalyzer {
    /// Create an analyzer for the given zone and pace unit
    pub fn new(zone: MafZone, unit: UnitSystem) -> Self {
        Self { zone, unit }
    }

    /// Zone the analyzer scores runs against
    pub fn zone(&self) -> &MafZone {
        &self.zone
    }

    /// Distance unit paces are reported in
    pub fn unit(&self) -> UnitSystem {
        self.unit
    }

    /// Analyze one activity.
    ///
    /// Output depends only on the arguments and the analyzer settings, so
    /// re-analysis with the same inputs yields an identical record.
    pub fn analyze(
        &self,
        raw: &RawActivity,
        streams: Option<&SensorStreamSet>,
        excluded: bool,
    ) -> AnalyzedActivity {
        let avg_pace = velocity_to_pace(raw.average_speed, self.unit);

        let (zone_metrics, has_streams) = match streams.filter(|s| !s.is_empty()) {
            Some(streams) => (self.stream_metrics(streams, avg_pace), true),
            None => {
                debug!(
                    activity.id = %raw.id,
                    "No usable streams, estimating zone time from average heart rate"
                );
                (self.estimated_metrics(raw.average_heartrate, avg_pace), false)
            }
        };

        let qualifying = !excluded
            && raw.elapsed_time >= analysis::MIN_QUALIFYING_DURATION_SECONDS
            && zone_metrics.time_in_qualifying_zone_pct >= analysis::MIN_QUALIFYING_ZONE_PCT;

        AnalyzedActivity {
            id: raw.id.clone(),
            name: raw.name.clone(),
            date: raw.start_date,
            duration: raw.elapsed_time,
            distance: raw.distance,
            elevation_gain: raw.total_elevation_gain,
            avg_hr: raw.average_heartrate,
            avg_cadence: raw
                .average_cadence
                .map(|c| c * analysis::CADENCE_MULTIPLIER),
            avg_pace,
            time_in_maf_zone_pct: zone_metrics.time_in_maf_zone_pct,
            time_in_qualifying_zone_pct: zone_metrics.time_in_qualifying_zone_pct,
            maf_pace: zone_metrics.maf_pace,
            cardiac_drift: zone_metrics.cardiac_drift,
            aerobic_decoupling: zone_metrics.aerobic_decoupling,
            cadence_in_zone: zone_metrics.cadence_in_zone,
            efficiency_factor: efficiency_factor(raw.average_speed, raw.average_heartrate),
            qualifying,
            excluded,
            has_streams,
        }
    }

    /// Single pass over the aligned HR/velocity samples
    fn stream_metrics(&self, streams: &SensorStreamSet, avg_pace: f64) -> ZoneMetrics {
        let len = streams.aligned_len();
        let heartrate = &streams.heartrate[..len];
        let velocity = &streams.velocity_smooth[..len];

        let mut in_zone = 0usize;
        let mut in_qualifying = 0usize;
        let mut pace_sum = 0.0;
        let mut cadence_sum = 0.0;
        let mut cadence_count = 0usize;

        for (i, (&hr, &v)) in heartrate.iter().zip(velocity).enumerate() {
            if self.zone.contains(hr) {
                in_zone += 1;
                if v > 0.0 {
                    pace_sum += velocity_to_pace(v, self.unit);
                }
                if let Some(&cadence) = streams.cadence.get(i) {
                    cadence_sum += cadence * analysis::CADENCE_MULTIPLIER;
                    cadence_count += 1;
                }
            }
            if self.zone.qualifies(hr) {
                in_qualifying += 1;
            }
        }

        let samples = len as f64;
        ZoneMetrics {
            time_in_maf_zone_pct: 100.0 * in_zone as f64 / samples,
            time_in_qualifying_zone_pct: 100.0 * in_qualifying as f64 / samples,
            // Zero-velocity samples count in the denominator but add no pace
            maf_pace: if in_zone > 0 {
                pace_sum / in_zone as f64
            } else {
                avg_pace
            },
            cardiac_drift: cardiac_drift(heartrate),
            aerobic_decoupling: aerobic_decoupling(heartrate, velocity),
            cadence_in_zone: (cadence_count > 0).then(|| cadence_sum / cadence_count as f64),
        }
    }

    /// Coarse estimate from the activity-level average heart rate
    fn estimated_metrics(&self, average_heartrate: Option<f64>, avg_pace: f64) -> ZoneMetrics {
        let estimate = |inside: bool| {
            if inside {
                analysis::ESTIMATED_IN_ZONE_PCT
            } else {
                analysis::ESTIMATED_OUT_OF_ZONE_PCT
            }
        };

        ZoneMetrics {
            time_in_maf_zone_pct: estimate(average_heartrate.is_some_and(|hr| self.zone.contains(hr))),
            time_in_qualifying_zone_pct: estimate(
                average_heartrate.is_some_and(|hr| self.zone.qualifies(hr)),
            ),
            maf_pace: avg_pace,
            cardiac_drift: None,
            aerobic_decoupling: None,
            cadence_in_zone: None,
        }
    }
}

/// Meters per minute divided by average heart rate; `0.0` if either is non-positive
pub fn efficiency_factor(average_speed: f64, average_heartrate: Option<f64>) -> f64 {
    match average_heartrate {
        Some(hr) if hr > 0.0 && average_speed > 0.0 => average_speed * 60.0 / hr,
        _ => 0.0,
    }
}

/// Percent change in mean HR from the first half to the second half
pub fn cardiac_drift(heartrate: &[f64]) -> Option<f64> {
    let mid = heartrate.len() / 2;
    let first = mean(&heartrate[..mid]);
    let second = mean(&heartrate[mid..]);

    if first == 0.0 {
        return None;
    }
    Some(100.0 * (second - first) / first)
}

/// Percent change of the pace-ratio / HR-ratio between halves
///
/// Both slices must already be truncated to the same length.
pub fn aerobic_decoupling(heartrate: &[f64], velocity: &[f64]) -> Option<f64> {
    let mid = heartrate.len().min(velocity.len()) / 2;
    let first_velocity = mean(&velocity[..mid]);
    let second_velocity = mean(&velocity[mid..]);
    let first_hr = mean(&heartrate[..mid]);
    let second_hr = mean(&heartrate[mid..]);

    if first_velocity <= 0.0 || first_hr <= 0.0 {
        return None;
    }

    let pace_ratio = second_velocity / first_velocity;
    let hr_ratio = second_hr / first_hr;
    if hr_ratio <= 0.0 {
        return None;
    }

    Some(100.0 * ((pace_ratio / hr_ratio) - 1.0))
}
