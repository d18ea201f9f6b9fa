// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Coaching advice selection
//!
//! A fixed priority cascade over the summary and the activity list: the
//! first matching rule produces the advice. Rules, in order:
//!
//! 1. no run for 3+ days → consistency
//! 2. current HR more than 5 above MAF HR → HR control
//! 3. zone discipline under 60% → zone discipline
//! 4. HR trend regressing → recovery week
//! 5. in-zone cadence under 170 spm → cadence drills
//! 6. fewer than 3 runs this week on an HR plateau → volume
//! 7. HR improving with decoupling under 5% → extend the long run
//! 8. HR improving → encouragement
//! 9. otherwise → steady consistency

use chrono::{DateTime, Duration, Utc};

use super::included_by_date;
use crate::config::MafZone;
use crate::constants::advice::{
    DEFAULT_LONG_RUN_MINUTES, LONG_RUN_EXTENSION_MINUTES, MAX_DAYS_SINCE_LAST_RUN,
    MAX_DECOUPLING_PCT, MAX_HR_EXCESS, MIN_CADENCE_SPM, MIN_WEEKLY_RUNS, MIN_ZONE_DISCIPLINE_PCT,
    WEEK_DAYS,
};
use crate::models::{Advice, AdviceFocus, AnalyzedActivity, MafSummary, TrendDirection};
use crate::units::{format_pace, UnitSystem};

/// Select advice as of now
pub fn select_advice(
    summary: &MafSummary,
    activities: &[AnalyzedActivity],
    zone: &MafZone,
    unit: UnitSystem,
) -> Advice {
    select_advice_at(summary, activities, zone, unit, Utc::now())
}

/// Select advice as of `now`
pub fn select_advice_at(
    summary: &MafSummary,
    activities: &[AnalyzedActivity],
    zone: &MafZone,
    unit: UnitSystem,
    now: DateTime<Utc>,
) -> Advice {
    let included = included_by_date(activities);
    let week_start = now - Duration::days(WEEK_DAYS);
    let this_week: Vec<&AnalyzedActivity> = included
        .iter()
        .copied()
        .filter(|a| a.date >= week_start)
        .collect();

    if let Some(last) = included.last() {
        let days_since = (now - last.date).num_days();
        if days_since >= MAX_DAYS_SINCE_LAST_RUN {
            return consistency_gap(days_since, zone);
        }
    }

    if let Some(current_hr) = summary.current_hr {
        let excess = current_hr - f64::from(zone.maf_hr);
        if excess > MAX_HR_EXCESS {
            return hr_control(current_hr, excess, zone);
        }
    }

    if let Some(discipline) = summary.zone_discipline {
        if discipline < MIN_ZONE_DISCIPLINE_PCT {
            return zone_discipline(discipline, zone);
        }
    }

    if summary.hr_trend_direction == TrendDirection::Regressing {
        return recovery_week(summary.hr_trend, zone);
    }

    if let Some(cadence) = summary.avg_cadence {
        if cadence < MIN_CADENCE_SPM {
            return cadence_drills(cadence);
        }
    }

    if this_week.len() < MIN_WEEKLY_RUNS && summary.hr_trend_direction == TrendDirection::Plateau {
        return add_volume(this_week.len(), zone);
    }

    if summary.hr_trend_direction == TrendDirection::Improving {
        if let Some(decoupling) = summary.avg_decoupling.filter(|d| *d < MAX_DECOUPLING_PCT) {
            let longest_minutes = this_week
                .iter()
                .map(|a| (a.duration as f64 / 60.0).round() as i64)
                .max();
            let suggested = longest_minutes
                .map(|m| m + LONG_RUN_EXTENSION_MINUTES)
                .unwrap_or(DEFAULT_LONG_RUN_MINUTES);
            return extend_long_run(decoupling, suggested, zone);
        }
        return encouragement(summary, zone, unit);
    }

    steady(zone)
}

fn consistency_gap(days_since: i64, zone: &MafZone) -> Advice {
    Advice {
        headline: "Get back to regular running".to_string(),
        body: format!(
            "It has been {} days since your last run. Aerobic base is built by frequent, easy \
             running: head out today for an easy run between {} and {} bpm, even if it is short.",
            days_since, zone.zone_low, zone.zone_high
        ),
        focus: AdviceFocus::Consistency,
    }
}

fn hr_control(current_hr: f64, excess: f64, zone: &MafZone) -> Advice {
    Advice {
        headline: "Slow down to bring heart rate back into the zone".to_string(),
        body: format!(
            "Your recent average heart rate is {:.0} bpm, {:.0} bpm above your MAF heart rate of \
             {}. Slow to a walk on hills if you must and keep every run between {} and {} bpm.",
            current_hr, excess, zone.maf_hr, zone.zone_low, zone.zone_high
        ),
        focus: AdviceFocus::HrControl,
    }
}

fn zone_discipline(discipline: f64, zone: &MafZone) -> Advice {
    Advice {
        headline: "Spend more of each run inside your MAF zone".to_string(),
        body: format!(
            "Only {:.0}% of your running time is inside {}-{} bpm. Set a heart-rate alarm at {} \
             bpm and ease off as soon as it sounds.",
            discipline, zone.zone_low, zone.zone_high, zone.zone_high
        ),
        focus: AdviceFocus::ZoneDiscipline,
    }
}

fn recovery_week(hr_slope: Option<f64>, zone: &MafZone) -> Advice {
    Advice {
        headline: "Take a recovery week".to_string(),
        body: format!(
            "Your heart rate at the same effort has been rising by {:.1} bpm per week. That often \
             points to accumulated fatigue, poor sleep or illness. Cut volume by a third this \
             week and keep every run at or below {} bpm.",
            hr_slope.unwrap_or(0.0),
            zone.zone_low
        ),
        focus: AdviceFocus::Recovery,
    }
}

fn cadence_drills(cadence: f64) -> Advice {
    Advice {
        headline: "Work on a quicker, lighter stride".to_string(),
        body: format!(
            "Your in-zone cadence averages {:.0} steps per minute. Aim for {:.0} or more: add \
             4-6 relaxed 20-second strides after two easy runs this week and focus on short, \
             quick steps.",
            cadence, MIN_CADENCE_SPM
        ),
        focus: AdviceFocus::Cadence,
    }
}

fn add_volume(runs_this_week: usize, zone: &MafZone) -> Advice {
    Advice {
        headline: "Add another easy run".to_string(),
        body: format!(
            "You ran {} time(s) in the last 7 days and your heart rate has plateaued. A third or \
             fourth weekly run at {}-{} bpm is the simplest way to keep the aerobic base growing.",
            runs_this_week, zone.zone_low, zone.zone_high
        ),
        focus: AdviceFocus::Volume,
    }
}

fn extend_long_run(decoupling: f64, suggested_minutes: i64, zone: &MafZone) -> Advice {
    Advice {
        headline: "Extend your long run".to_string(),
        body: format!(
            "Heart rate is trending down and aerobic decoupling is only {:.1}%, so your base is \
             handling the current load. Make this week's long run {} minutes, staying between {} \
             and {} bpm.",
            decoupling, suggested_minutes, zone.zone_low, zone.zone_high
        ),
        focus: AdviceFocus::LongRun,
    }
}

fn encouragement(summary: &MafSummary, zone: &MafZone, unit: UnitSystem) -> Advice {
    let pace = summary
        .current_pace
        .map(|p| format!(" Current MAF pace: {}.", format_pace(p, unit)))
        .unwrap_or_default();
    Advice {
        headline: "Your aerobic base is improving".to_string(),
        body: format!(
            "Heart rate at the same effort is falling by {:.1} bpm per week. Keep the runs easy \
             and consistent between {} and {} bpm.{}",
            summary.hr_trend.unwrap_or(0.0).abs(),
            zone.zone_low,
            zone.zone_high,
            pace
        ),
        focus: AdviceFocus::Encouragement,
    }
}

fn steady(zone: &MafZone) -> Advice {
    Advice {
        headline: "Stay consistent".to_string(),
        body: format!(
            "Keep stacking easy runs between {} and {} bpm. MAF progress shows up over weeks, not \
             single runs.",
            zone.zone_low, zone.zone_high
        ),
        focus: AdviceFocus::Consistency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn zone() -> MafZone {
        MafZone::from_maf_hr(140, 10)
    }

    fn run(days_ago: i64, duration: u64) -> AnalyzedActivity {
        AnalyzedActivity {
            id: format!("run-{}", days_ago),
            name: "Easy Run".to_string(),
            date: now() - Duration::days(days_ago),
            duration,
            distance: 8000.0,
            elevation_gain: 0.0,
            avg_hr: Some(140.0),
            avg_cadence: Some(176.0),
            avg_pace: 6.5,
            time_in_maf_zone_pct: 80.0,
            time_in_qualifying_zone_pct: 95.0,
            maf_pace: 6.5,
            cardiac_drift: Some(2.0),
            aerobic_decoupling: Some(3.0),
            cadence_in_zone: Some(176.0),
            efficiency_factor: 1.2,
            qualifying: true,
            excluded: false,
            has_streams: true,
        }
    }

    fn healthy_summary() -> MafSummary {
        MafSummary {
            current_hr: Some(140.0),
            current_pace: Some(6.5),
            current_ef: Some(1.2),
            hr_trend: Some(0.0),
            pace_trend: Some(0.0),
            ef_trend: Some(0.0),
            hr_trend_direction: TrendDirection::Plateau,
            pace_trend_direction: TrendDirection::Plateau,
            ef_trend_direction: TrendDirection::Plateau,
            zone_discipline: Some(80.0),
            avg_decoupling: Some(3.0),
            avg_cadence: Some(176.0),
            total_runs: 10,
            recent_runs: 10,
            qualifying_runs: 10,
            qualifying_pct: 100.0,
        }
    }

    fn three_runs_this_week() -> Vec<AnalyzedActivity> {
        vec![run(5, 2400), run(3, 3600), run(1, 3000)]
    }

    #[test]
    fn test_consistency_gap_wins_over_hr_excess() {
        let mut summary = healthy_summary();
        summary.current_hr = Some(152.0);
        let advice = select_advice_at(&summary, &[run(5, 3000)], &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::Consistency);
        assert!(advice.body.contains("5 days"));
        assert!(advice.body.contains("135 and 145"));
    }

    #[test]
    fn test_hr_control() {
        let mut summary = healthy_summary();
        summary.current_hr = Some(146.0);
        let advice = select_advice_at(&summary, &three_runs_this_week(), &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::HrControl);
        assert!(advice.body.contains("146 bpm, 6 bpm above"));

        // Exactly 5 over is tolerated
        summary.current_hr = Some(145.0);
        let advice = select_advice_at(&summary, &three_runs_this_week(), &zone(), UnitSystem::Metric, now());
        assert_ne!(advice.focus, AdviceFocus::HrControl);
    }

    #[test]
    fn test_zone_discipline() {
        let mut summary = healthy_summary();
        summary.zone_discipline = Some(55.0);
        let advice = select_advice_at(&summary, &three_runs_this_week(), &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::ZoneDiscipline);
        assert!(advice.body.contains("55%"));
    }

    #[test]
    fn test_recovery_week() {
        let mut summary = healthy_summary();
        summary.hr_trend = Some(0.8);
        summary.hr_trend_direction = TrendDirection::Regressing;
        summary.avg_cadence = Some(160.0);
        let advice = select_advice_at(&summary, &three_runs_this_week(), &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::Recovery);
        assert!(advice.body.contains("0.8 bpm per week"));
    }

    #[test]
    fn test_cadence_drills() {
        let mut summary = healthy_summary();
        summary.avg_cadence = Some(162.0);
        let advice = select_advice_at(&summary, &three_runs_this_week(), &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::Cadence);
        assert!(advice.body.contains("162 steps"));
    }

    #[test]
    fn test_add_volume_on_plateau() {
        let summary = healthy_summary();
        let runs = vec![run(2, 3000), run(1, 3000)];
        let advice = select_advice_at(&summary, &runs, &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::Volume);
        assert!(advice.body.contains("2 time(s)"));
    }

    #[test]
    fn test_extend_long_run_uses_longest_recent_run() {
        let mut summary = healthy_summary();
        summary.hr_trend = Some(-0.6);
        summary.hr_trend_direction = TrendDirection::Improving;
        let advice = select_advice_at(&summary, &three_runs_this_week(), &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::LongRun);
        assert!(advice.body.contains("70 minutes"));
    }

    #[test]
    fn test_extend_long_run_default_without_recent_runs() {
        let mut summary = healthy_summary();
        summary.hr_trend_direction = TrendDirection::Improving;
        let advice = select_advice_at(&summary, &[], &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::LongRun);
        assert!(advice.body.contains("50 minutes"));
    }

    #[test]
    fn test_encouragement_when_decoupling_is_high() {
        let mut summary = healthy_summary();
        summary.hr_trend = Some(-0.6);
        summary.hr_trend_direction = TrendDirection::Improving;
        summary.avg_decoupling = Some(7.5);
        let advice = select_advice_at(&summary, &three_runs_this_week(), &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::Encouragement);
        assert!(advice.body.contains("0.6 bpm per week"));
        assert!(advice.body.contains("6:30 /km"));
    }

    #[test]
    fn test_fallback() {
        let summary = healthy_summary();
        let advice = select_advice_at(&summary, &three_runs_this_week(), &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::Consistency);
        assert_eq!(advice.headline, "Stay consistent");
    }

    #[test]
    fn test_excluded_runs_do_not_count() {
        let mut stale = run(0, 3000);
        stale.excluded = true;
        let activities = vec![run(6, 3000), stale];
        let advice = select_advice_at(&healthy_summary(), &activities, &zone(), UnitSystem::Metric, now());
        assert_eq!(advice.focus, AdviceFocus::Consistency);
        assert!(advice.body.contains("6 days"));
    }
}
