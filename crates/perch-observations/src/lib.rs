//! Recent-sightings aggregation for Perch.
//!
//! Fetches per-location checklists over a sliding day window, merges repeated
//! sightings of the same species across checklists, and produces a summary
//! sorted by common name.

pub mod aggregate;
pub mod error;
pub mod fetch;
pub mod types;

use std::collections::HashMap;

use perch_ebird::EbirdClient;

pub use aggregate::ObservationAggregator;
pub use error::ObservationError;
pub use fetch::{ChecklistFetcher, DEFAULT_MAX_RESULTS, MAX_WINDOW_DAYS};
pub use types::{Count, ObservationData};

/// Fetch checklists for a location and aggregate them into the sorted
/// per-species summary. The day window is capped at [`MAX_WINDOW_DAYS`];
/// larger windows yield an empty summary.
pub async fn location_summary(
    client: &EbirdClient,
    taxonomy: HashMap<String, String>,
    loc_id: &str,
    days_back: u32,
) -> Result<Vec<ObservationData>, ObservationError> {
    let checklists = ChecklistFetcher::new(client).gather(loc_id, days_back).await?;
    ObservationAggregator::new(taxonomy).aggregate(&checklists)
}
