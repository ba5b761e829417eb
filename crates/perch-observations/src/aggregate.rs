//! Merging per-checklist observations into a per-species summary.

use std::collections::HashMap;

use chrono::{Local, NaiveDateTime};

use perch_ebird::types::{Checklist, EBIRD_DATETIME_FORMAT};

use crate::error::ObservationError;
use crate::types::{Count, ObservationData};

const SECONDS_PER_DAY: i64 = 86_400;

/// Working record for one species while checklists are being merged.
/// Elapsed time is kept in seconds so that same-day sightings still compare
/// correctly; the final record truncates to whole days.
#[derive(Debug)]
struct SpeciesEntry {
    common_name: String,
    num_obs: Count,
    elapsed_secs: i64,
    checklist_count: u32,
}

impl SpeciesEntry {
    /// Fold in another sighting of the same species. The smaller elapsed
    /// value (most recent sighting) wins and brings its count with it; the
    /// checklist count always increments.
    fn update(&mut self, elapsed_secs: i64, count: Count) {
        if elapsed_secs < self.elapsed_secs {
            self.elapsed_secs = elapsed_secs;
            self.num_obs = count;
        }
        self.checklist_count += 1;
    }

    fn into_data(self, species_code: String) -> ObservationData {
        ObservationData {
            species_code,
            common_name: self.common_name,
            num_obs: self.num_obs,
            time_since: self.elapsed_secs.div_euclid(SECONDS_PER_DAY),
            checklist_count: self.checklist_count,
        }
    }
}

/// Merges checklists into per-species records and sorts them by common name.
///
/// Each call to [`aggregate`](Self::aggregate) builds its working state from
/// scratch; nothing carries over between calls.
pub struct ObservationAggregator {
    taxonomy: HashMap<String, String>,
    reference_time: NaiveDateTime,
}

impl ObservationAggregator {
    pub fn new(taxonomy: HashMap<String, String>) -> Self {
        Self {
            taxonomy,
            reference_time: Local::now().naive_local(),
        }
    }

    /// Fix the "now" that elapsed times are measured against.
    pub fn with_reference_time(mut self, reference_time: NaiveDateTime) -> Self {
        self.reference_time = reference_time;
        self
    }

    /// Merge every observation in `checklists` into one record per species,
    /// sorted ascending by common name.
    ///
    /// A species code missing from the taxonomy invalidates the whole pass:
    /// the caller gets an empty summary, including entries gathered before
    /// the unknown code was hit.
    pub fn aggregate(
        &self,
        checklists: &[Checklist],
    ) -> Result<Vec<ObservationData>, ObservationError> {
        let mut species: HashMap<String, SpeciesEntry> = HashMap::new();

        for checklist in checklists {
            for obs in &checklist.obs {
                let observed_at = NaiveDateTime::parse_from_str(&obs.obs_dt, EBIRD_DATETIME_FORMAT)
                    .map_err(|_| ObservationError::InvalidTimestamp(obs.obs_dt.clone()))?;
                let elapsed_secs = (self.reference_time - observed_at).num_seconds();
                let count = obs
                    .how_many_str
                    .as_deref()
                    .map(Count::parse)
                    .unwrap_or(Count::Unspecified);

                if let Some(entry) = species.get_mut(&obs.species_code) {
                    entry.update(elapsed_secs, count);
                } else {
                    let Some(common_name) = self.taxonomy.get(&obs.species_code) else {
                        tracing::warn!(
                            species_code = %obs.species_code,
                            checklist = %checklist.sub_id,
                            "species code not in taxonomy; returning empty summary"
                        );
                        return Ok(Vec::new());
                    };
                    species.insert(
                        obs.species_code.clone(),
                        SpeciesEntry {
                            common_name: common_name.clone(),
                            num_obs: count,
                            elapsed_secs,
                            checklist_count: 1,
                        },
                    );
                }
            }
        }

        let mut summary: Vec<ObservationData> = species
            .into_iter()
            .map(|(code, entry)| entry.into_data(code))
            .collect();
        summary.sort_by(|a, b| a.common_name.cmp(&b.common_name));
        Ok(summary)
    }
}
