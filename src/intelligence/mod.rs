// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Intelligence Module
//!
//! MAF heart-rate analysis over a runner's activity history.
//!
//! This module includes:
//! - Per-activity zone, pace, drift and decoupling analysis
//! - Rolling 28-day trends
//! - An 8-week progress summary with regression slopes
//! - Coaching advice selection
//!
//! Every function here is pure: reference time and exclusions are explicit
//! arguments, so identical inputs always give identical reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod advice;
pub mod analyzer;
pub mod summary;
pub mod trends;

pub use advice::{select_advice, select_advice_at};
pub use analyzer::{aerobic_decoupling, cardiac_drift, efficiency_factor, MafAnalyzer};
pub use summary::{compute_summary, compute_summary_at, linear_regression_slope};
pub use trends::compute_trends;

use crate::config::MafZone;
use crate::exclusions::ExclusionSet;
use crate::logging::AppLogger;
use crate::models::{Advice, AnalyzedActivity, MafSummary, MafTrend, RawActivity, StreamsById};
use crate::units::UnitSystem;

/// Complete MAF report for one activity history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MafReport {
    /// Every analyzed run, excluded ones included and flagged, ordered by date
    pub activities: Vec<AnalyzedActivity>,

    /// One point per non-excluded run
    pub trends: Vec<MafTrend>,

    pub summary: MafSummary,

    pub advice: Advice,

    /// Reference time the report was computed against
    pub generated_at: DateTime<Utc>,
}

/// Analyze every run in `raws`.
///
/// Non-running activities and activities starting before `start_date` are
/// dropped. Output is sorted by start date.
pub fn analyze_all(
    analyzer: &MafAnalyzer,
    raws: &[RawActivity],
    streams: &StreamsById,
    exclusions: &ExclusionSet,
    start_date: Option<DateTime<Utc>>,
) -> Vec<AnalyzedActivity> {
    let mut analyzed: Vec<AnalyzedActivity> = raws
        .iter()
        .filter(|raw| raw.is_run())
        .filter(|raw| start_date.map_or(true, |start| raw.start_date >= start))
        .map(|raw| {
            let result = analyzer.analyze(raw, streams.get(&raw.id), exclusions.contains(&raw.id));
            AppLogger::log_analysis(&result.id, result.qualifying, result.has_streams);
            result
        })
        .collect();
    analyzed.sort_by(|a, b| a.date.cmp(&b.date));
    analyzed
}

/// Build the report as of now
pub fn build_report(activities: Vec<AnalyzedActivity>, zone: &MafZone, unit: UnitSystem) -> MafReport {
    build_report_at(activities, zone, unit, Utc::now())
}

/// Build the report as of `now`
pub fn build_report_at(
    activities: Vec<AnalyzedActivity>,
    zone: &MafZone,
    unit: UnitSystem,
    now: DateTime<Utc>,
) -> MafReport {
    let trends = compute_trends(&activities);
    let summary = compute_summary_at(&activities, now);
    let advice = select_advice_at(&summary, &activities, zone, unit, now);

    AppLogger::log_report(summary.total_runs, summary.qualifying_runs, advice.focus.as_str());

    MafReport {
        activities,
        trends,
        summary,
        advice,
        generated_at: now,
    }
}

/// Arithmetic mean, 0 for an empty slice
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Non-excluded activities in date order; ties keep input order
pub(crate) fn included_by_date(activities: &[AnalyzedActivity]) -> Vec<&AnalyzedActivity> {
    let mut included: Vec<&AnalyzedActivity> = activities.iter().filter(|a| !a.excluded).collect();
    included.sort_by(|a, b| a.date.cmp(&b.date));
    included
}
