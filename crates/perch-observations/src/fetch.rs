//! Day-windowed checklist fetching.

use chrono::{Duration, Local, NaiveDate};
use tracing::instrument;

use perch_ebird::types::Checklist;
use perch_ebird::{EbirdClient, EbirdError};

/// Largest supported day window; larger requests return nothing.
pub const MAX_WINDOW_DAYS: u32 = 14;

/// Checklists requested per visit-feed query.
pub const DEFAULT_MAX_RESULTS: u32 = 100;

/// Collects the checklists submitted at one location over a sliding day
/// window: one visit-feed query per day, then one detail fetch per checklist.
pub struct ChecklistFetcher<'a> {
    client: &'a EbirdClient,
    reference_date: NaiveDate,
    max_results: u32,
}

impl<'a> ChecklistFetcher<'a> {
    pub fn new(client: &'a EbirdClient) -> Self {
        Self {
            client,
            reference_date: Local::now().date_naive(),
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    /// Fix the date the window counts back from.
    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = reference_date;
        self
    }

    /// Fetch checklist detail for every visit to `loc_id` within the last
    /// `days_back` days, in feed order. Windows beyond [`MAX_WINDOW_DAYS`]
    /// yield an empty result without touching the API. Request failures
    /// propagate unchanged; there is no retry and no partial result.
    #[instrument(skip(self), level = "info")]
    pub async fn gather(
        &self,
        loc_id: &str,
        days_back: u32,
    ) -> Result<Vec<Checklist>, EbirdError> {
        if days_back > MAX_WINDOW_DAYS {
            tracing::debug!(days_back, "window exceeds maximum; returning nothing");
            return Ok(Vec::new());
        }

        let mut sub_ids = Vec::new();
        for d in 0..days_back {
            let day = self.reference_date - Duration::days(i64::from(d));
            let visits = self
                .client
                .get_visits(loc_id, day, self.max_results)
                .await?;
            sub_ids.extend(visits.into_iter().map(|v| v.sub_id));
        }

        tracing::debug!(checklists = sub_ids.len(), "collected visit ids");

        let mut checklists = Vec::with_capacity(sub_ids.len());
        for sub_id in &sub_ids {
            checklists.push(self.client.get_checklist(sub_id).await?);
        }

        Ok(checklists)
    }
}
