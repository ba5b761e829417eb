//! eBird API v2 client.

use chrono::{Datelike, NaiveDate};
use tracing::instrument;

use crate::error::EbirdError;
use crate::types::*;

const EBIRD_API_BASE: &str = "https://api.ebird.org/v2";
const API_KEY_HEADER: &str = "X-eBirdApiToken";

pub struct EbirdClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl EbirdClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, EBIRD_API_BASE)
    }

    /// Point the client at a different API root, e.g. a mock server.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full eBird taxonomy.
    #[instrument(skip(self), level = "info")]
    pub async fn get_taxonomy(&self) -> Result<Vec<Taxon>, EbirdError> {
        let url = format!("{}/ref/taxonomy/ebird?fmt=json", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List hotspots in a region with observations in the last `back` days.
    #[instrument(skip(self), level = "info")]
    pub async fn get_hotspots(&self, region: &str, back: u32) -> Result<Vec<Hotspot>, EbirdError> {
        let url = format!(
            "{}/ref/hotspot/{}?back={}&fmt=json",
            self.base_url,
            urlencoding::encode(region),
            back,
        );

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List checklist submissions for a location on a given day.
    #[instrument(skip(self), level = "info")]
    pub async fn get_visits(
        &self,
        loc_id: &str,
        date: NaiveDate,
        max_results: u32,
    ) -> Result<Vec<Visit>, EbirdError> {
        let url = format!(
            "{}/product/lists/{}/{}/{}/{}?maxResults={}",
            self.base_url,
            urlencoding::encode(loc_id),
            date.year(),
            date.month(),
            date.day(),
            max_results,
        );

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get full checklist detail, including observations.
    #[instrument(skip(self), level = "info")]
    pub async fn get_checklist(&self, sub_id: &str) -> Result<Checklist, EbirdError> {
        let url = format!(
            "{}/product/checklist/view/{}",
            self.base_url,
            urlencoding::encode(sub_id),
        );

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, EbirdError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| EbirdError::ApiError(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 || status.as_u16() == 403 {
            Err(EbirdError::InvalidApiKey)
        } else if status.as_u16() == 404 {
            let text = response.text().await.unwrap_or_default();
            Err(EbirdError::NotFound(text))
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(EbirdError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(EbirdError::ApiError(format!("{}: {}", status, text)))
        }
    }
}
