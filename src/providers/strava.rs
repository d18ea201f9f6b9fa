// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::{ActivityPage, FitnessProvider};
use crate::config::ProviderConfig;
use crate::constants::{env_config, STREAM_KEYS};
use crate::models::{ActivityRecord, RawActivity, SensorStreamSet, StreamRecord};

pub struct StravaProvider {
    client: Client,
    access_token: String,
    base_url: String,
}

impl StravaProvider {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            access_token: access_token.into(),
            base_url: env_config::strava_api_base(),
        }
    }

    /// Point the provider at another API root (a proxy or a test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build a provider from the `[strava]` config section
    pub fn from_config(config: &ProviderConfig) -> Result<Self> {
        let token = config
            .access_token
            .clone()
            .or_else(env_config::strava_access_token)
            .context("No Strava access token configured")?;
        let provider = Self::new(token);
        Ok(match &config.api_base {
            Some(base) => {
                url::Url::parse(base).with_context(|| format!("Invalid Strava API base: {}", base))?;
                provider.with_base_url(base.as_str())
            }
            None => provider,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl FitnessProvider for StravaProvider {
    async fn get_activities(
        &self,
        after: Option<DateTime<Utc>>,
        page: usize,
        per_page: usize,
    ) -> Result<ActivityPage> {
        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.timestamp().to_string()));
        }

        let records: Vec<ActivityRecord> = self
            .client
            .get(format!("{}/athlete/activities", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .await
            .context("Failed to reach Strava")?
            .error_for_status()
            .context("Strava rejected the activity list request")?
            .json()
            .await
            .context("Failed to decode Strava activity list")?;

        let raw_count = records.len();
        debug!(page, count = raw_count, "Fetched Strava activity page");

        let activities = records
            .into_iter()
            .filter_map(|record| match RawActivity::try_from(record) {
                Ok(activity) => Some(activity),
                Err(e) => {
                    warn!("Skipping invalid Strava activity: {}", e);
                    None
                }
            })
            .collect();
        Ok(ActivityPage { activities, raw_count })
    }

    async fn get_activity_streams(&self, activity_id: &str) -> Result<Option<SensorStreamSet>> {
        let response = self
            .client
            .get(format!("{}/activities/{}/streams", self.base_url, activity_id))
            .bearer_auth(&self.access_token)
            .query(&[("keys", STREAM_KEYS), ("key_by_type", "true")])
            .send()
            .await
            .with_context(|| format!("Failed to reach Strava for streams of {}", activity_id))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let record: StreamRecord = response
            .error_for_status()
            .with_context(|| format!("Strava rejected the stream request for {}", activity_id))?
            .json()
            .await
            .with_context(|| format!("Failed to decode streams for {}", activity_id))?;

        let streams = SensorStreamSet::from(record);
        Ok((!streams.is_empty()).then_some(streams))
    }

    fn provider_name(&self) -> &'static str {
        "Strava"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_base_url_trims_trailing_slash() {
        let provider = StravaProvider::new("token").with_base_url("http://localhost:1234/");
        assert_eq!(provider.base_url(), "http://localhost:1234");
        assert_eq!(provider.provider_name(), "Strava");
    }

    #[test]
    fn test_from_config() {
        let config = ProviderConfig {
            access_token: Some("abc".to_string()),
            api_base: Some("http://127.0.0.1:9000/api".to_string()),
            per_page: None,
        };
        let provider = StravaProvider::from_config(&config).unwrap();
        assert_eq!(provider.base_url(), "http://127.0.0.1:9000/api");
    }

    #[test]
    fn test_from_config_rejects_bad_base() {
        let config = ProviderConfig {
            access_token: Some("abc".to_string()),
            api_base: Some("not a url".to_string()),
            per_page: None,
        };
        assert!(StravaProvider::from_config(&config).is_err());
    }
}
