// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use maf_tracker::config::{Config, MafZone};
use maf_tracker::constants::env_config;
use maf_tracker::exclusions::ExclusionSet;
use maf_tracker::intelligence::{analyze_all, build_report_at, MafAnalyzer, MafReport};
use maf_tracker::logging::{self, AppLogger};
use maf_tracker::models::{parse_timestamp, ActivityRecord, RawActivity, StreamRecord, StreamsById};
use maf_tracker::providers::StravaProvider;
use maf_tracker::sync::{merge_activities, ActivitySync};
use maf_tracker::units::{format_ef, format_pace, format_pace_carried, UnitSystem};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "maf-report")]
#[command(about = "Analyze runs against the MAF heart-rate method and print a progress report")]
struct Cli {
    /// JSON array of platform activity records
    #[arg(long)]
    activities: Option<PathBuf>,

    /// JSON object of stream payloads keyed by activity id
    #[arg(long)]
    streams: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Exclusion file (defaults to the configured location)
    #[arg(long)]
    exclusions: Option<PathBuf>,

    /// Exclude an activity id from analysis and persist the choice
    #[arg(long, value_name = "ID")]
    exclude: Vec<String>,

    /// Re-include a previously excluded activity id
    #[arg(long, value_name = "ID")]
    include: Vec<String>,

    /// Pull activities and streams from Strava
    #[arg(long)]
    strava: bool,

    /// Reference time for the report (RFC 3339)
    #[arg(long)]
    now: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Carry 60 rounded seconds into the minute in text paces ("6:00" instead of "5:60")
    #[arg(long)]
    carry_pace_seconds: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_from_env()?;
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?;
    info!("{}", config.summary());

    let exclusions_path = cli.exclusions.clone().unwrap_or_else(|| config.exclusions_path());
    let mut exclusions = ExclusionSet::load(&exclusions_path)?;
    let mut changed = false;
    for id in &cli.exclude {
        changed |= exclusions.exclude(id.as_str());
    }
    for id in &cli.include {
        changed |= exclusions.include(id);
    }
    if changed {
        exclusions.save(&exclusions_path)?;
        info!("Saved {} exclusions to {}", exclusions.len(), exclusions_path.display());
    }
    if !exclusions.is_empty() {
        let ids: Vec<&str> = exclusions.iter().collect();
        debug!(excluded = ?ids, "Excluded activities");
    }

    let mut activities = match &cli.activities {
        Some(path) => load_activities(path)?,
        None => Vec::new(),
    };
    let mut streams = match &cli.streams {
        Some(path) => load_streams(path)?,
        None => StreamsById::new(),
    };

    if cli.strava {
        let provider_config = config.strava.clone().unwrap_or_default();
        let provider = StravaProvider::from_config(&provider_config)?;
        let sync = ActivitySync::new(Arc::new(provider));
        let per_page = provider_config
            .per_page
            .unwrap_or_else(env_config::activities_per_page);

        let fetched = sync.fetch_activities(config.athlete.start_date, per_page).await?;
        let fetched_count = fetched.len();
        activities = merge_activities(activities, fetched);

        let missing: Vec<String> = activities
            .iter()
            .filter(|a| a.is_run() && !streams.contains_key(&a.id))
            .map(|a| a.id.clone())
            .collect();
        let fetched_streams = sync
            .fetch_streams(&missing, env_config::max_concurrent_stream_fetches())
            .await;
        let with_streams = fetched_streams.len();
        streams.extend(fetched_streams);

        AppLogger::log_sync_summary(fetched_count, activities.len(), with_streams);
    }

    if activities.is_empty() {
        warn!("No activities to analyze; pass --activities or --strava");
    }

    let now = match &cli.now {
        Some(value) => parse_timestamp(value).context("Invalid --now value")?,
        None => chrono::Utc::now(),
    };

    let analyzer = MafAnalyzer::new(config.athlete.zone(), config.athlete.units);
    let analyzed = analyze_all(
        &analyzer,
        &activities,
        &streams,
        &exclusions,
        config.athlete.start_date,
    );
    let report = build_report_at(analyzed, analyzer.zone(), analyzer.unit(), now);

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            let pace_format: fn(f64, UnitSystem) -> String = if cli.carry_pace_seconds {
                format_pace_carried
            } else {
                format_pace
            };
            print_text(&report, analyzer.zone(), analyzer.unit(), pace_format)
        }
    }

    Ok(())
}

fn load_activities(path: &Path) -> Result<Vec<RawActivity>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read activities: {}", path.display()))?;
    let records: Vec<ActivityRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse activities: {}", path.display()))?;

    let total = records.len();
    let activities: Vec<RawActivity> = records
        .into_iter()
        .filter_map(|record| {
            RawActivity::try_from(record)
                .map_err(|e| warn!("Skipping invalid activity record: {}", e))
                .ok()
        })
        .collect();
    info!("Loaded {} of {} activity records from {}", activities.len(), total, path.display());
    Ok(activities)
}

fn load_streams(path: &Path) -> Result<StreamsById> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read streams: {}", path.display()))?;
    let records: HashMap<String, StreamRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse streams: {}", path.display()))?;
    Ok(records
        .into_iter()
        .map(|(id, record)| (id, record.into()))
        .collect())
}

fn print_text(
    report: &MafReport,
    zone: &MafZone,
    units: UnitSystem,
    pace_format: fn(f64, UnitSystem) -> String,
) {
    let summary = &report.summary;

    println!("MAF report ({})", report.generated_at.format("%Y-%m-%d %H:%M UTC"));
    println!(
        "MAF HR {} bpm, zone {}-{} bpm, qualifying up to {} bpm",
        zone.maf_hr,
        zone.zone_low,
        zone.zone_high,
        zone.qualifying_high()
    );
    println!();
    println!(
        "Runs: {} total, {} in the last 4 weeks, {} qualifying ({:.0}%)",
        summary.total_runs, summary.recent_runs, summary.qualifying_runs, summary.qualifying_pct
    );
    if let Some(hr) = summary.current_hr {
        println!("Current HR:   {:.0} bpm ({})", hr, summary.hr_trend_direction.as_str());
    }
    if let Some(pace) = summary.current_pace {
        println!(
            "Current pace: {} ({})",
            pace_format(pace, units),
            summary.pace_trend_direction.as_str()
        );
    }
    if let Some(ef) = summary.current_ef {
        println!("Current EF:   {} ({})", format_ef(ef), summary.ef_trend_direction.as_str());
    }
    if let Some(discipline) = summary.zone_discipline {
        println!("Zone discipline: {:.0}%", discipline);
    }
    if let Some(decoupling) = summary.avg_decoupling {
        println!("Avg decoupling:  {:.1}%", decoupling);
    }
    if let Some(cadence) = summary.avg_cadence {
        println!("Avg cadence:     {:.0} spm", cadence);
    }
    println!();
    println!("{}", report.advice.headline);
    println!("{}", report.advice.body);
}
