//! Perch command-line app: recent bird sightings at eBird hotspots.

mod error_mapping;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use perch_core::{AppError, Config, ConfigError};
use perch_ebird::{EbirdClient, HotspotCache, TaxonomyCache};
use perch_observations::{location_summary, ObservationData};

#[derive(Parser)]
#[command(name = "perch", version, about = "Browse recent bird sightings at eBird hotspots")]
struct Cli {
    /// Path to an alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List active hotspots in the configured region
    Hotspots,
    /// Show aggregated recent sightings for a hotspot
    Sightings {
        /// eBird location id, e.g. L123456
        loc_id: String,
        /// Day window, 1 to 14; defaults to the configured window
        #[arg(long)]
        days: Option<u32>,
    },
    /// Regenerate the taxonomy and hotspot caches
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    perch_core::init()?;

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        tracing::error!("{}", err);
        eprintln!("{}", err.user_message());
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let (config, _) = config.validated()?;

    if !config.ebird.is_configured() {
        return Err(ConfigError::MissingSetting("ebird.api_key".to_string()).into());
    }

    let client = EbirdClient::with_base_url(&config.ebird.api_key, &config.ebird.api_url);
    let taxonomy_cache =
        TaxonomyCache::with_expiry_days(&config.cache_dir, config.cache.taxonomy_expiry_days);
    let hotspot_cache =
        HotspotCache::with_expiry_days(&config.cache_dir, config.cache.hotspot_expiry_days);

    match cli.command {
        Command::Hotspots => {
            let hotspots = hotspot_cache
                .load(&client, &config.ebird.region, config.ebird.days_back)
                .await
                .map_err(error_mapping::ebird)?;

            if hotspots.is_empty() {
                println!(
                    "No active hotspots in {} over the last {} days.",
                    config.ebird.region, config.ebird.days_back
                );
            }
            for spot in &hotspots {
                println!(
                    "{} [{}]  {:.4}, {:.4}  last observation {}",
                    spot.loc_name,
                    spot.loc_id,
                    spot.lat,
                    spot.lng,
                    spot.latest_obs_dt.as_deref().unwrap_or("unknown"),
                );
            }
        }
        Command::Sightings { loc_id, days } => {
            let days = days.unwrap_or(config.ebird.days_back);
            let taxonomy = taxonomy_cache
                .load(&client)
                .await
                .map_err(error_mapping::ebird)?;
            let summary = location_summary(&client, taxonomy, &loc_id, days)
                .await
                .map_err(error_mapping::observation)?;

            if summary.is_empty() {
                println!("No recent sightings for {} in the last {} days.", loc_id, days);
            }
            for obs in &summary {
                print_observation(obs);
            }
        }
        Command::Refresh => {
            let mapping = taxonomy_cache
                .refresh(&client)
                .await
                .map_err(error_mapping::ebird)?;
            let hotspots = hotspot_cache
                .refresh(&client, &config.ebird.region, config.ebird.days_back)
                .await
                .map_err(error_mapping::ebird)?;
            println!(
                "Cached {} species and {} active hotspots.",
                mapping.len(),
                hotspots.len()
            );
        }
    }

    Ok(())
}

fn print_observation(obs: &ObservationData) {
    println!("{}", obs.common_name);
    println!("  {}", last_seen_phrase(obs.time_since));
    println!("  Latest observation count: {}", obs.num_obs);
    println!("  {}", checklist_phrase(obs.checklist_count));
}

fn last_seen_phrase(days: i64) -> String {
    if days > 1 {
        format!("Last seen {} days ago", days)
    } else if days == 1 {
        "Last seen 1 day ago".to_string()
    } else {
        "Last seen today".to_string()
    }
}

fn checklist_phrase(count: u32) -> String {
    if count > 1 {
        format!("Counted in {} unique checklists", count)
    } else {
        "Counted in 1 unique checklist".to_string()
    }
}
