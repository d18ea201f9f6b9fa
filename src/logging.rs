// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Logging configuration with structured output
//!
//! Logs go to stderr so that reports written to stdout stay machine-readable.

use anyhow::Result;
use serde_json::json;
use std::env;
use std::io;

use crate::constants::env_config;
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Subscriber settings, normally read from the environment
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not a valid filter
    pub level: String,
    pub format: LogFormat,
    /// Source file and line on every event
    pub include_location: bool,
    pub include_thread: bool,
    /// Emit span open/close events
    pub include_spans: bool,
    pub service_name: String,
    pub service_version: String,
    pub environment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    Pretty,
    /// Single-line events without targets
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            include_spans: false,
            service_name: "maf-tracker".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        let level = env_config::log_level();

        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };

        let environment =
            env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let is_production = environment == "production";

        Self {
            level,
            format,
            include_location: is_production || env::var("LOG_INCLUDE_LOCATION").is_ok(),
            include_thread: is_production || env::var("LOG_INCLUDE_THREAD").is_ok(),
            include_spans: is_production || env::var("LOG_INCLUDE_SPANS").is_ok(),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "maf-tracker".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            environment,
        }
    }

    /// Install the global tracing subscriber.
    ///
    /// Fails if a subscriber is already installed.
    pub fn init(&self) -> Result<()> {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let registry = tracing_subscriber::registry().with(env_filter);
        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_thread_ids(self.include_thread)
            .with_thread_names(self.include_thread)
            .with_span_events(self.span_events());

        let installed = match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init(),
            LogFormat::Pretty => registry.with(layer.with_target(true)).try_init(),
            LogFormat::Compact => registry.with(layer.compact().with_target(false)).try_init(),
        };
        installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

        self.log_startup_info();
        Ok(())
    }

    fn span_events(&self) -> FmtSpan {
        if self.include_spans {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn log_startup_info(&self) {
        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "MAF tracker starting up"
        );

        let logging = json!({
            "level": self.level,
            "format": format!("{:?}", self.format),
            "location": self.include_location,
            "thread": self.include_thread,
            "spans": self.include_spans,
        });
        debug!("Logging configured: {}", logging);
    }
}

/// Initialize logging from environment
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Structured events for the analysis pipeline
pub struct AppLogger;

impl AppLogger {
    /// Log the outcome of analyzing one activity
    pub fn log_analysis(activity_id: &str, qualifying: bool, has_streams: bool) {
        debug!(
            activity.id = %activity_id,
            analysis.qualifying = %qualifying,
            analysis.has_streams = %has_streams,
            "Activity analyzed"
        );
    }

    /// Log one stream fetch
    pub fn log_stream_fetch(activity_id: &str, success: bool, duration_ms: u64) {
        debug!(
            activity.id = %activity_id,
            stream.success = %success,
            stream.duration_ms = %duration_ms,
            "Stream fetch"
        );
    }

    /// Log the result of a provider sync
    pub fn log_sync_summary(fetched: usize, merged: usize, with_streams: usize) {
        info!(
            sync.fetched = %fetched,
            sync.merged = %merged,
            sync.with_streams = %with_streams,
            "Sync complete"
        );
    }

    /// Log a generated report
    pub fn log_report(total_runs: usize, qualifying_runs: usize, focus: &str) {
        info!(
            report.total_runs = %total_runs,
            report.qualifying_runs = %qualifying_runs,
            report.advice_focus = %focus,
            "Report generated"
        );
    }
}
