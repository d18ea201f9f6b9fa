// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! End-to-end report generation over a synthetic ten-week training block

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use maf_tracker::config::{AthleteConfig, MafZone};
use maf_tracker::exclusions::ExclusionSet;
use maf_tracker::intelligence::{analyze_all, build_report_at, MafAnalyzer, MafReport};
use maf_tracker::models::{
    ActivityRecord, AdviceFocus, RawActivity, StreamRecord, StreamsById, TrendDirection,
};
use maf_tracker::units::UnitSystem;
use serde_json::json;
use std::collections::HashMap;

const RUNS: usize = 35;

fn block_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap()
}

/// Heart rate falls 0.2 bpm every other day at a constant 3.0 m/s
fn run_hr(i: usize) -> f64 {
    144.0 - 0.2 * i as f64
}

fn records() -> Vec<serde_json::Value> {
    (0..RUNS)
        .map(|i| {
            let start = block_start() + Duration::days(2 * i as i64);
            json!({
                "id": 5000 + i,
                "name": format!("Easy run {}", i + 1),
                "type": "Run",
                "start_date": start.to_rfc3339(),
                "elapsed_time": 3000,
                "moving_time": 2980,
                "distance": 9000.0,
                "average_heartrate": run_hr(i),
                "average_cadence": 88.0,
                "total_elevation_gain": 25.0,
                "average_speed": 3.0
            })
        })
        .collect()
}

fn raw_activities(values: Vec<serde_json::Value>) -> Result<Vec<RawActivity>> {
    values
        .into_iter()
        .map(|value| {
            let record: ActivityRecord = serde_json::from_value(value)?;
            Ok(RawActivity::try_from(record)?)
        })
        .collect()
}

fn streams() -> Result<StreamsById> {
    let mut payloads = serde_json::Map::new();
    for i in 0..RUNS {
        let hr = run_hr(i);
        payloads.insert(
            (5000 + i).to_string(),
            json!({
                "heartrate": { "data": vec![hr; 120] },
                "velocity_smooth": { "data": vec![3.0; 120] },
                "cadence": { "data": vec![88.0; 120] }
            }),
        );
    }
    let records: HashMap<String, StreamRecord> =
        serde_json::from_value(serde_json::Value::Object(payloads))?;
    Ok(records.into_iter().map(|(id, r)| (id, r.into())).collect())
}

fn athlete() -> AthleteConfig {
    AthleteConfig {
        age: 40,
        ..Default::default()
    }
}

fn report_at(
    raws: &[RawActivity],
    exclusions: &ExclusionSet,
    now: DateTime<Utc>,
    start_date: Option<DateTime<Utc>>,
) -> Result<MafReport> {
    let athlete = athlete();
    let zone: MafZone = athlete.zone();
    let analyzer = MafAnalyzer::new(zone, UnitSystem::Metric);
    let analyzed = analyze_all(&analyzer, raws, &streams()?, exclusions, start_date);
    Ok(build_report_at(analyzed, &zone, UnitSystem::Metric, now))
}

/// One day after the final run
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

#[test]
fn test_improving_block_suggests_longer_long_run() -> Result<()> {
    let raws = raw_activities(records())?;
    let report = report_at(&raws, &ExclusionSet::default(), now(), None)?;

    assert_eq!(report.activities.len(), RUNS);
    assert_eq!(report.trends.len(), RUNS);
    assert!(report.activities.iter().all(|a| a.has_streams && a.qualifying));

    let first = &report.activities[0];
    assert_eq!(first.time_in_maf_zone_pct, 100.0);
    assert_eq!(first.aerobic_decoupling, Some(0.0));
    assert_eq!(first.cadence_in_zone, Some(176.0));

    let summary = &report.summary;
    assert_eq!(summary.total_runs, RUNS);
    assert_eq!(summary.qualifying_pct, 100.0);
    assert_eq!(summary.hr_trend_direction, TrendDirection::Improving);
    assert_eq!(summary.pace_trend_direction, TrendDirection::Plateau);
    assert!((summary.hr_trend.unwrap() + 0.7).abs() < 1e-6);
    assert_eq!(summary.avg_cadence, Some(176.0));

    assert_eq!(report.advice.focus, AdviceFocus::LongRun);
    // Longest run this week is 50 minutes
    assert!(report.advice.body.contains("60 minutes"));
    assert_eq!(report.generated_at, now());
    Ok(())
}

#[test]
fn test_rolling_trend_window_spans_28_days() -> Result<()> {
    let raws = raw_activities(records())?;
    let report = report_at(&raws, &ExclusionSet::default(), now(), None)?;

    assert_eq!(report.trends[0].rolling_hr, None);
    // Run 20 (day 40) sees runs from day 12 onwards: indices 6..=20
    let expected: f64 = (6..=20).map(run_hr).sum::<f64>() / 15.0;
    let rolling = report.trends[20].rolling_hr.unwrap();
    assert!((rolling - expected).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_excluded_outlier_leaves_summary_unchanged() -> Result<()> {
    let mut values = records();
    values.push(json!({
        "id": 9999,
        "name": "Race",
        "sport_type": "Run",
        "start_date": "2024-03-10T08:00:00Z",
        "elapsed_time": 1500,
        "distance": 5000.0,
        "average_heartrate": 172.0,
        "average_speed": 4.2
    }));
    let raws = raw_activities(values)?;
    let baseline = report_at(&raw_activities(records())?, &ExclusionSet::default(), now(), None)?;

    let exclusions: ExclusionSet = ["9999"].into_iter().collect();
    let report = report_at(&raws, &exclusions, now(), None)?;

    assert_eq!(report.activities.len(), RUNS + 1);
    let race = report.activities.last().unwrap();
    assert!(race.excluded);
    assert!(!race.qualifying);
    assert_eq!(report.trends.len(), RUNS);
    assert_eq!(report.summary, baseline.summary);
    assert_eq!(report.advice, baseline.advice);
    Ok(())
}

#[test]
fn test_long_gap_overrides_other_advice() -> Result<()> {
    let raws = raw_activities(records())?;
    let later = Utc.with_ymd_and_hms(2024, 3, 14, 12, 0, 0).unwrap();
    let report = report_at(&raws, &ExclusionSet::default(), later, None)?;
    assert_eq!(report.advice.focus, AdviceFocus::Consistency);
    assert!(report.advice.body.contains("5 days"));
    Ok(())
}

#[test]
fn test_start_date_drops_earlier_runs() -> Result<()> {
    let raws = raw_activities(records())?;
    let start = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let report = report_at(&raws, &ExclusionSet::default(), now(), Some(start))?;
    assert!(report.activities.iter().all(|a| a.date >= start));
    assert_eq!(report.summary.total_runs, 19);
    Ok(())
}

#[test]
fn test_report_serializes_with_lowercase_enums() -> Result<()> {
    let raws = raw_activities(records())?;
    let report = report_at(&raws, &ExclusionSet::default(), now(), None)?;
    let value = serde_json::to_value(&report)?;
    assert_eq!(value["summary"]["hr_trend_direction"], "improving");
    assert_eq!(value["advice"]["focus"], "long_run");
    assert_eq!(value["activities"].as_array().map(Vec::len), Some(RUNS));
    Ok(())
}
