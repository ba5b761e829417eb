//! eBird API types and data structures.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp format used throughout the eBird API (e.g. "2024-02-01 10:30").
pub const EBIRD_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One entry in the eBird taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Taxon {
    pub species_code: String,
    pub com_name: String,
    pub sci_name: String,
}

/// A birding hotspot within a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub loc_id: String,
    pub loc_name: String,
    pub lat: f64,
    pub lng: f64,
    /// Timestamp of the most recent observation at this hotspot, if any.
    pub latest_obs_dt: Option<String>,
}

impl Hotspot {
    /// Parse `latest_obs_dt`. `None` when absent or malformed, which callers
    /// treat as "no recent activity".
    pub fn last_observed(&self) -> Option<NaiveDateTime> {
        let raw = self.latest_obs_dt.as_deref()?;
        NaiveDateTime::parse_from_str(raw, EBIRD_DATETIME_FORMAT).ok()
    }
}

/// A single visit (submitted checklist) from the location feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub sub_id: String,
    #[serde(default)]
    pub loc_id: Option<String>,
    #[serde(default)]
    pub num_species: Option<u32>,
    #[serde(default)]
    pub obs_dt: Option<String>,
}

/// Full checklist detail, including its observations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checklist {
    pub sub_id: String,
    #[serde(default)]
    pub obs: Vec<ChecklistObservation>,
}

/// One species observation within a checklist.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistObservation {
    pub species_code: String,
    /// Observation time in [`EBIRD_DATETIME_FORMAT`].
    pub obs_dt: String,
    /// Reported count as a string; "X" means present but uncounted.
    #[serde(default)]
    pub how_many_str: Option<String>,
}
