// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{RawActivity, SensorStreamSet};

pub mod strava;

pub use strava::StravaProvider;

/// One page of the platform's activity list
#[derive(Debug, Clone, Default)]
pub struct ActivityPage {
    /// Records that passed validation, in platform order
    pub activities: Vec<RawActivity>,
    /// Records the platform returned, valid or not; drives pagination
    pub raw_count: usize,
}

/// Source of activity summaries and sensor streams
#[async_trait]
pub trait FitnessProvider: Send + Sync {
    /// One page (1-based) of activities started after `after`. Records that
    /// fail validation are left out of `activities` but still counted.
    async fn get_activities(
        &self,
        after: Option<DateTime<Utc>>,
        page: usize,
        per_page: usize,
    ) -> Result<ActivityPage>;

    /// Sensor streams for one activity; `None` when the platform has none
    async fn get_activity_streams(&self, activity_id: &str) -> Result<Option<SensorStreamSet>>;

    fn provider_name(&self) -> &'static str;
}
