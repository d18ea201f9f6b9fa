// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Point-in-time MAF progress summary with 8-week regression trends

use chrono::{DateTime, Duration, Utc};

use super::{included_by_date, mean};
use crate::constants::summary::{
    CURRENT_WINDOW_WEEKS, EF_SLOPE_THRESHOLD, HR_SLOPE_THRESHOLD, MIN_TREND_POINTS,
    PACE_SLOPE_THRESHOLD_SECONDS, TREND_WINDOW_WEEKS,
};
use crate::models::{AnalyzedActivity, MafSummary, TrendDirection};

const SECONDS_PER_WEEK: f64 = 7.0 * 24.0 * 3600.0;

/// Summarize the activity set as of now
pub fn compute_summary(activities: &[AnalyzedActivity]) -> MafSummary {
    compute_summary_at(activities, Utc::now())
}

/// Summarize the activity set as of `now`
pub fn compute_summary_at(activities: &[AnalyzedActivity], now: DateTime<Utc>) -> MafSummary {
    let included = included_by_date(activities);
    let Some(latest) = included.last() else {
        return MafSummary::empty();
    };

    let qualifying: Vec<&AnalyzedActivity> =
        included.iter().copied().filter(|a| a.qualifying).collect();

    let recent_start = now - Duration::weeks(CURRENT_WINDOW_WEEKS);
    let trend_start = now - Duration::weeks(TREND_WINDOW_WEEKS);
    let recent: Vec<&AnalyzedActivity> = included
        .iter()
        .copied()
        .filter(|a| a.date >= recent_start)
        .collect();
    let trend_window: Vec<&AnalyzedActivity> = included
        .iter()
        .copied()
        .filter(|a| a.date >= trend_start)
        .collect();

    let (current_hr, current_pace, current_ef) = if recent.is_empty() {
        (latest.avg_hr, Some(latest.maf_pace), Some(latest.efficiency_factor))
    } else {
        let hrs: Vec<f64> = recent.iter().filter_map(|a| a.avg_hr).collect();
        let paces: Vec<f64> = recent.iter().map(|a| a.maf_pace).collect();
        let efs: Vec<f64> = recent.iter().map(|a| a.efficiency_factor).collect();
        (
            (!hrs.is_empty()).then(|| mean(&hrs)),
            Some(mean(&paces)),
            Some(mean(&efs)),
        )
    };

    let hr_trend = window_slope(&trend_window, |a| a.avg_hr);
    let pace_trend = window_slope(&trend_window, |a| Some(a.maf_pace)).map(|s| s * 60.0);
    let ef_trend = window_slope(&trend_window, |a| Some(a.efficiency_factor));

    let zone_values: Vec<f64> = included.iter().map(|a| a.time_in_maf_zone_pct).collect();
    let decoupling: Vec<f64> = qualifying.iter().filter_map(|a| a.aerobic_decoupling).collect();
    let cadence: Vec<f64> = qualifying.iter().filter_map(|a| a.cadence_in_zone).collect();

    let total_runs = included.len();
    let qualifying_runs = qualifying.len();

    MafSummary {
        current_hr,
        current_pace,
        current_ef,
        hr_trend,
        pace_trend,
        ef_trend,
        hr_trend_direction: classify_hr(hr_trend),
        pace_trend_direction: classify_pace(pace_trend),
        ef_trend_direction: classify_ef(ef_trend),
        zone_discipline: Some(mean(&zone_values)),
        avg_decoupling: (!decoupling.is_empty()).then(|| mean(&decoupling)),
        avg_cadence: (!cadence.is_empty()).then(|| mean(&cadence)),
        total_runs,
        recent_runs: recent.len(),
        qualifying_runs,
        qualifying_pct: 100.0 * qualifying_runs as f64 / total_runs as f64,
    }
}

/// Per-week slope of a metric across the trend window.
///
/// `None` when the window, or the metric's present values, hold fewer than
/// three points. The x axis is weeks since the earliest run in the window.
fn window_slope<F>(window: &[&AnalyzedActivity], metric: F) -> Option<f64>
where
    F: Fn(&AnalyzedActivity) -> Option<f64>,
{
    if window.len() < MIN_TREND_POINTS {
        return None;
    }
    let origin = window.first()?.date;
    let points: Vec<(f64, f64)> = window
        .iter()
        .filter_map(|a| {
            let weeks = (a.date - origin).num_seconds() as f64 / SECONDS_PER_WEEK;
            metric(a).map(|value| (weeks, value))
        })
        .collect();

    (points.len() >= MIN_TREND_POINTS).then(|| linear_regression_slope(&points))
}

/// Ordinary least-squares slope; `0.0` when x has no variance
pub fn linear_regression_slope(points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return 0.0;
    }
    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Falling heart rate at the same effort is progress
pub fn classify_hr(slope: Option<f64>) -> TrendDirection {
    match slope {
        None => TrendDirection::Insufficient,
        Some(s) if s < -HR_SLOPE_THRESHOLD => TrendDirection::Improving,
        Some(s) if s > HR_SLOPE_THRESHOLD => TrendDirection::Regressing,
        Some(_) => TrendDirection::Plateau,
    }
}

/// Pace slope in seconds per unit per week; lower pace is faster
pub fn classify_pace(slope_seconds: Option<f64>) -> TrendDirection {
    match slope_seconds {
        None => TrendDirection::Insufficient,
        Some(s) if s < -PACE_SLOPE_THRESHOLD_SECONDS => TrendDirection::Improving,
        Some(s) if s > PACE_SLOPE_THRESHOLD_SECONDS => TrendDirection::Regressing,
        Some(_) => TrendDirection::Plateau,
    }
}

pub fn classify_ef(slope: Option<f64>) -> TrendDirection {
    match slope {
        None => TrendDirection::Insufficient,
        Some(s) if s > EF_SLOPE_THRESHOLD => TrendDirection::Improving,
        Some(s) if s < -EF_SLOPE_THRESHOLD => TrendDirection::Regressing,
        Some(_) => TrendDirection::Plateau,
    }
}
