// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Algorithm thresholds of the MAF analysis and environment-based
//! configuration values.

use std::env;

/// MAF heart-rate formula
pub mod maf {
    /// Base of the 180-formula
    pub const BASE_HEART_RATE: i32 = 180;

    /// Half-width of the MAF zone around the MAF heart rate
    pub const ZONE_HALF_WIDTH: i32 = 5;

    /// Default upward tolerance of the qualifying zone
    pub const DEFAULT_QUALIFYING_TOLERANCE: u32 = 10;

    /// Allowed training-status modifiers
    pub const ALLOWED_MODIFIERS: [i32; 4] = [-10, -5, 0, 5];
}

/// Per-activity analysis
pub mod analysis {
    /// Minimum elapsed duration for a run to qualify (20 minutes)
    pub const MIN_QUALIFYING_DURATION_SECONDS: u64 = 1200;

    /// Minimum share of samples in the qualifying zone
    pub const MIN_QUALIFYING_ZONE_PCT: f64 = 60.0;

    /// Zone time assumed when the activity average is inside the zone and no stream exists
    pub const ESTIMATED_IN_ZONE_PCT: f64 = 75.0;

    /// Zone time assumed when the activity average is outside the zone and no stream exists
    pub const ESTIMATED_OUT_OF_ZONE_PCT: f64 = 25.0;

    /// Platform cadence is single-leg; steps per minute is twice that
    pub const CADENCE_MULTIPLIER: f64 = 2.0;
}

/// Rolling trend builder
pub mod trends {
    /// Trailing window in days, inclusive on both ends
    pub const ROLLING_WINDOW_DAYS: i64 = 28;

    /// Minimum window members before a rolling value is emitted
    pub const MIN_WINDOW_SAMPLES: usize = 2;
}

/// Summary aggregator
pub mod summary {
    /// Window for "current" values
    pub const CURRENT_WINDOW_WEEKS: i64 = 4;

    /// Window for regression slopes
    pub const TREND_WINDOW_WEEKS: i64 = 8;

    /// Minimum points for a slope classification
    pub const MIN_TREND_POINTS: usize = 3;

    /// HR slope (BPM/week) beyond which the trend is not a plateau
    pub const HR_SLOPE_THRESHOLD: f64 = 0.3;

    /// Pace slope (seconds/unit/week) beyond which the trend is not a plateau
    pub const PACE_SLOPE_THRESHOLD_SECONDS: f64 = 1.0;

    /// EF slope (per week) beyond which the trend is not a plateau
    pub const EF_SLOPE_THRESHOLD: f64 = 0.01;
}

/// Advisory selector
pub mod advice {
    /// Days without a run before consistency advice wins
    pub const MAX_DAYS_SINCE_LAST_RUN: i64 = 3;

    /// Allowed excess of current HR over the MAF heart rate
    pub const MAX_HR_EXCESS: f64 = 5.0;

    /// Zone discipline below this percentage triggers zone advice
    pub const MIN_ZONE_DISCIPLINE_PCT: f64 = 60.0;

    /// Steps per minute below which cadence drills are suggested
    pub const MIN_CADENCE_SPM: f64 = 170.0;

    /// Runs per trailing week below which more volume is suggested
    pub const MIN_WEEKLY_RUNS: usize = 3;

    /// Decoupling (%) below which the long run can be extended
    pub const MAX_DECOUPLING_PCT: f64 = 5.0;

    /// Minutes added to the longest recent run
    pub const LONG_RUN_EXTENSION_MINUTES: i64 = 10;

    /// Suggested long run when there is no run in the trailing week
    pub const DEFAULT_LONG_RUN_MINUTES: i64 = 50;

    /// Trailing window for weekly volume checks
    pub const WEEK_DAYS: i64 = 7;
}

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Get Strava API base URL from environment or default
    pub fn strava_api_base() -> String {
        env::var("STRAVA_API_BASE")
            .unwrap_or_else(|_| "https://www.strava.com/api/v3".to_string())
    }

    /// Get Strava access token from environment
    pub fn strava_access_token() -> Option<String> {
        env::var("STRAVA_ACCESS_TOKEN").ok()
    }

    /// Get page size for activity listing from environment or default
    pub fn activities_per_page() -> usize {
        env::var("MAF_ACTIVITIES_PER_PAGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(100)
    }

    /// Get max concurrent stream fetches from environment or default
    pub fn max_concurrent_stream_fetches() -> usize {
        env::var("MAF_STREAM_CONCURRENCY")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(4)
    }

    /// Get log level from environment or default
    pub fn log_level() -> String {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    }
}

/// Stream keys requested from the platform
pub const STREAM_KEYS: &str = "heartrate,cadence,velocity_smooth,time,distance,altitude";
