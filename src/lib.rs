// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # MAF Tracker
//!
//! Heart-rate training analysis for runners following the Maximum Aerobic
//! Function (MAF) method. The MAF heart rate is `180 - age + modifier`; easy
//! runs are meant to stay within 5 bpm of it, and a growing aerobic base shows
//! up as faster pace and higher efficiency at that heart rate.
//!
//! ## Features
//!
//! - **Per-run analysis**: time in zone, MAF pace, cardiac drift, aerobic
//!   decoupling, in-zone cadence and efficiency factor
//! - **Trends**: 28-day rolling averages and 8-week regression slopes
//! - **Advice**: one prioritized coaching recommendation
//! - **Strava sync**: paginated activity fetch and concurrent stream retrieval
//!
//! ## Architecture
//!
//! - **Models**: platform records, validated activities and derived metrics
//! - **Intelligence**: the pure analysis pipeline
//! - **Providers / Sync**: fitness platform access
//! - **Config / Exclusions**: athlete settings and persisted user choices
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use maf_tracker::config::AthleteConfig;
//! use maf_tracker::exclusions::ExclusionSet;
//! use maf_tracker::intelligence::{analyze_all, build_report_at, MafAnalyzer};
//! use maf_tracker::models::{RawActivity, StreamsById};
//!
//! let athlete = AthleteConfig { age: 40, ..Default::default() };
//! let zone = athlete.zone();
//! let analyzer = MafAnalyzer::new(zone, athlete.units);
//!
//! let run = RawActivity {
//!     id: "1".into(),
//!     name: "Morning Run".into(),
//!     sport_type: "Run".into(),
//!     start_date: Utc.with_ymd_and_hms(2024, 4, 2, 6, 30, 0).unwrap(),
//!     elapsed_time: 2700,
//!     moving_time: 2650,
//!     distance: 7600.0,
//!     average_heartrate: Some(139.0),
//!     average_cadence: Some(85.0),
//!     total_elevation_gain: 35.0,
//!     average_speed: 2.87,
//! };
//!
//! let analyzed = analyze_all(&analyzer, &[run], &StreamsById::new(), &ExclusionSet::default(), None);
//! let now = Utc.with_ymd_and_hms(2024, 4, 3, 12, 0, 0).unwrap();
//! let report = build_report_at(analyzed, &zone, athlete.units, now);
//!
//! assert_eq!(report.summary.total_runs, 1);
//! assert!(report.activities[0].qualifying);
//! ```

/// Fitness provider implementations
pub mod providers;

/// Platform records, validated activities and derived metrics
pub mod models;

/// Configuration management and persistence
pub mod config;

/// Algorithm thresholds and environment lookups
pub mod constants;

/// MAF analysis pipeline
pub mod intelligence;

/// Persisted excluded-activity set
pub mod exclusions;

/// Paginated activity fetch and concurrent stream retrieval
pub mod sync;

/// Unit systems and pace formatting
pub mod units;

/// Production-ready logging configuration
pub mod logging;
