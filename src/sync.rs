// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Activity and stream retrieval from a fitness provider
//!
//! Stream fetches are independent per activity and run concurrently on a
//! [`JoinSet`], bounded by a semaphore. Dropping the future returned by
//! [`ActivitySync::fetch_streams`] drops the set, which aborts every
//! outstanding fetch.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::logging::AppLogger;
use crate::models::{RawActivity, StreamsById};
use crate::providers::FitnessProvider;

pub struct ActivitySync {
    provider: Arc<dyn FitnessProvider>,
}

impl ActivitySync {
    pub fn new(provider: Arc<dyn FitnessProvider>) -> Self {
        Self { provider }
    }

    /// Walk activity pages until the platform returns an empty or short page.
    ///
    /// Page length is judged on the raw record count, so invalid records on a
    /// full page do not end the walk early.
    pub async fn fetch_activities(
        &self,
        after: Option<DateTime<Utc>>,
        per_page: usize,
    ) -> Result<Vec<RawActivity>> {
        let per_page = per_page.max(1);
        let mut activities = Vec::new();
        let mut page = 1;

        loop {
            let batch = self.provider.get_activities(after, page, per_page).await?;
            activities.extend(batch.activities);
            if batch.raw_count < per_page {
                break;
            }
            page += 1;
        }

        info!(
            provider = self.provider.provider_name(),
            pages = page,
            activities = activities.len(),
            "Fetched activity list"
        );
        Ok(activities)
    }

    /// Fetch streams for `ids` with at most `concurrency` requests in flight.
    ///
    /// A failed or empty fetch leaves that id out of the result.
    pub async fn fetch_streams(&self, ids: &[String], concurrency: usize) -> StreamsById {
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for id in ids {
            let provider = Arc::clone(&self.provider);
            let semaphore = Arc::clone(&semaphore);
            let id = id.clone();
            tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                let started = Instant::now();
                let result = provider.get_activity_streams(&id).await;
                let elapsed_ms = started.elapsed().as_millis() as u64;
                (id, result, elapsed_ms)
            });
        }

        let mut streams = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            let (id, result, elapsed_ms) = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Stream fetch task failed: {}", e);
                    continue;
                }
            };
            match result {
                Ok(Some(set)) => {
                    AppLogger::log_stream_fetch(&id, true, elapsed_ms);
                    streams.insert(id, set);
                }
                Ok(None) => AppLogger::log_stream_fetch(&id, true, elapsed_ms),
                Err(e) => {
                    AppLogger::log_stream_fetch(&id, false, elapsed_ms);
                    warn!(activity.id = %id, "Stream fetch failed, treating as absent: {:#}", e);
                }
            }
        }
        streams
    }
}

/// Merge `incoming` into `existing` by id; incoming copies replace cached ones.
///
/// The result is sorted by start date.
pub fn merge_activities(existing: Vec<RawActivity>, incoming: Vec<RawActivity>) -> Vec<RawActivity> {
    let mut by_id: HashMap<String, RawActivity> = existing
        .into_iter()
        .map(|a| (a.id.clone(), a))
        .collect();
    for activity in incoming {
        by_id.insert(activity.id.clone(), activity);
    }

    let mut merged: Vec<RawActivity> = by_id.into_values().collect();
    merged.sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id)));
    merged
}
