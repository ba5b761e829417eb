//! Aggregated observation records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reported count for an observation. eBird checklists record either a
/// number or "X" for present-but-uncounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Count {
    Exact(u32),
    Unspecified,
}

impl Count {
    /// Parse a checklist count string. Anything that is not a plain run of
    /// ASCII digits becomes [`Count::Unspecified`].
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            raw.parse().map(Self::Exact).unwrap_or(Self::Unspecified)
        } else {
            Self::Unspecified
        }
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Count::Exact(n) => write!(f, "{}", n),
            Count::Unspecified => write!(f, "X"),
        }
    }
}

/// One species' aggregated sighting record at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservationData {
    pub species_code: String,
    pub common_name: String,
    /// Count from the most recent sighting.
    pub num_obs: Count,
    /// Whole days since the most recent sighting; 0 means today.
    pub time_since: i64,
    /// Number of checklists the species appeared in.
    pub checklist_count: u32,
}
