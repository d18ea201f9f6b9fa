// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Rolling 28-day trend builder

use chrono::Duration;

use super::{included_by_date, mean};
use crate::constants::trends::{MIN_WINDOW_SAMPLES, ROLLING_WINDOW_DAYS};
use crate::models::{AnalyzedActivity, MafTrend};

/// Build one trend point per non-excluded activity, ordered by date.
///
/// The window of activity `i` holds every earlier-or-same-index activity whose
/// date is no more than 28 days before activity `i` (inclusive, full timestamp
/// precision). Rolling values need at least two window members; cadence,
/// decoupling and HR only count members where that metric is present.
pub fn compute_trends(activities: &[AnalyzedActivity]) -> Vec<MafTrend> {
    let included = included_by_date(activities);
    let span = Duration::days(ROLLING_WINDOW_DAYS);

    let mut trends = Vec::with_capacity(included.len());
    // Dates are sorted, so the window start only ever moves forward
    let mut start = 0;

    for (i, activity) in included.iter().enumerate() {
        let window_start = activity.date - span;
        while included[start].date < window_start {
            start += 1;
        }
        let window = &included[start..=i];
        let enough = window.len() >= MIN_WINDOW_SAMPLES;

        trends.push(MafTrend {
            activity_id: activity.id.clone(),
            date: activity.date,
            hr: activity.avg_hr,
            maf_pace: activity.maf_pace,
            efficiency_factor: activity.efficiency_factor,
            cadence: activity.cadence_in_zone,
            decoupling: activity.aerobic_decoupling,
            rolling_hr: if enough {
                rolling_optional(window, |a| a.avg_hr, 1)
            } else {
                None
            },
            rolling_pace: enough.then(|| rolling(window, |a| a.maf_pace)),
            rolling_ef: enough.then(|| rolling(window, |a| a.efficiency_factor)),
            rolling_cadence: rolling_optional(window, |a| a.cadence_in_zone, MIN_WINDOW_SAMPLES),
            rolling_decoupling: rolling_optional(
                window,
                |a| a.aerobic_decoupling,
                MIN_WINDOW_SAMPLES,
            ),
        });
    }

    trends
}

fn rolling<F>(window: &[&AnalyzedActivity], metric: F) -> f64
where
    F: Fn(&AnalyzedActivity) -> f64,
{
    let values: Vec<f64> = window.iter().map(|a| metric(a)).collect();
    mean(&values)
}

fn rolling_optional<F>(window: &[&AnalyzedActivity], metric: F, min_samples: usize) -> Option<f64>
where
    F: Fn(&AnalyzedActivity) -> Option<f64>,
{
    let values: Vec<f64> = window.iter().filter_map(|a| metric(a)).collect();
    (!values.is_empty() && values.len() >= min_samples).then(|| mean(&values))
}
