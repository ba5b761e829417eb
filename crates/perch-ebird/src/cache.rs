//! JSON file caches for taxonomy and hotspot data.
//!
//! Both caches follow the same policy: read the file if it exists and is
//! younger than its expiry, otherwise refetch from the API and rewrite it.
//! Staleness is judged by file modification time.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;

use crate::client::EbirdClient;
use crate::error::EbirdError;
use crate::types::Hotspot;

pub const TAXONOMY_CACHE_FILE: &str = "taxonomy_cache.json";
pub const HOTSPOT_CACHE_FILE: &str = "hotspot_cache.json";

pub const DEFAULT_TAXONOMY_EXPIRY_DAYS: u64 = 180;
pub const DEFAULT_HOTSPOT_EXPIRY_DAYS: u64 = 1;

const SECS_PER_DAY: u64 = 86_400;

/// True when the file is missing, unreadable, or older than `max_age`.
fn is_stale(path: &Path, max_age: Duration) -> bool {
    let modified = match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return true,
    };
    match modified.elapsed() {
        Ok(age) => age >= max_age,
        // Modification time in the future; treat as fresh
        Err(_) => false,
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), EbirdError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| EbirdError::CacheError(format!("create {}: {}", parent.display(), e)))?;
    }
    let contents = serde_json::to_string_pretty(value)
        .map_err(|e| EbirdError::CacheError(e.to_string()))?;
    fs::write(path, contents)
        .map_err(|e| EbirdError::CacheError(format!("write {}: {}", path.display(), e)))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, EbirdError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| EbirdError::CacheError(format!("read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| EbirdError::CacheError(format!("parse {}: {}", path.display(), e)))
}

/// Cache mapping species code to common name for the full eBird taxonomy.
#[derive(Debug)]
pub struct TaxonomyCache {
    path: PathBuf,
    max_age: Duration,
}

impl TaxonomyCache {
    pub fn new(cache_dir: &Path) -> Self {
        Self::with_expiry_days(cache_dir, DEFAULT_TAXONOMY_EXPIRY_DAYS)
    }

    pub fn with_expiry_days(cache_dir: &Path, days: u64) -> Self {
        Self {
            path: cache_dir.join(TAXONOMY_CACHE_FILE),
            max_age: Duration::from_secs(days * SECS_PER_DAY),
        }
    }

    pub fn is_stale(&self) -> bool {
        is_stale(&self.path, self.max_age)
    }

    /// Load the cached taxonomy, refetching and rewriting the file when
    /// missing or expired.
    pub async fn load(&self, client: &EbirdClient) -> Result<HashMap<String, String>, EbirdError> {
        if self.is_stale() {
            return self.refresh(client).await;
        }
        tracing::debug!(path = %self.path.display(), "using cached taxonomy");
        read_json(&self.path)
    }

    /// Force-regenerate the cache file from the API.
    pub async fn refresh(
        &self,
        client: &EbirdClient,
    ) -> Result<HashMap<String, String>, EbirdError> {
        tracing::info!(path = %self.path.display(), "regenerating taxonomy cache");
        let taxonomy = client.get_taxonomy().await?;
        let mapping: HashMap<String, String> = taxonomy
            .into_iter()
            .map(|t| (t.species_code, t.com_name))
            .collect();
        write_json(&self.path, &mapping)?;
        Ok(mapping)
    }
}

/// Cache of active hotspots for a region.
///
/// Only hotspots with an observation inside the day window are kept; entries
/// without a parseable `latestObsDt` are dropped at refresh time.
#[derive(Debug)]
pub struct HotspotCache {
    path: PathBuf,
    max_age: Duration,
}

impl HotspotCache {
    pub fn new(cache_dir: &Path) -> Self {
        Self::with_expiry_days(cache_dir, DEFAULT_HOTSPOT_EXPIRY_DAYS)
    }

    pub fn with_expiry_days(cache_dir: &Path, days: u64) -> Self {
        Self {
            path: cache_dir.join(HOTSPOT_CACHE_FILE),
            max_age: Duration::from_secs(days * SECS_PER_DAY),
        }
    }

    pub fn is_stale(&self) -> bool {
        is_stale(&self.path, self.max_age)
    }

    /// Load the cached hotspot list, refetching and rewriting the file when
    /// missing or expired.
    pub async fn load(
        &self,
        client: &EbirdClient,
        region: &str,
        days_back: u32,
    ) -> Result<Vec<Hotspot>, EbirdError> {
        if self.is_stale() {
            return self.refresh(client, region, days_back).await;
        }
        tracing::debug!(path = %self.path.display(), "using cached hotspots");
        read_json(&self.path)
    }

    /// Force-regenerate the cache file from the API.
    pub async fn refresh(
        &self,
        client: &EbirdClient,
        region: &str,
        days_back: u32,
    ) -> Result<Vec<Hotspot>, EbirdError> {
        tracing::info!(region, days_back, "regenerating hotspot cache");
        let cutoff = Local::now().naive_local() - chrono::Duration::days(i64::from(days_back));
        let hotspots: Vec<Hotspot> = client
            .get_hotspots(region, days_back)
            .await?
            .into_iter()
            .filter(|spot| spot.last_observed().is_some_and(|t| t >= cutoff))
            .collect();
        write_json(&self.path, &hotspots)?;
        Ok(hotspots)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::EBIRD_DATETIME_FORMAT;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn taxonomy_body() -> serde_json::Value {
        serde_json::json!([
            {"sciName": "Calypte anna", "comName": "Anna's Hummingbird", "speciesCode": "annhum"},
            {"sciName": "Taeniopygia guttata", "comName": "Zebra Finch", "speciesCode": "zebfin"}
        ])
    }

    #[tokio::test]
    async fn test_taxonomy_fetch_writes_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/ref/taxonomy/ebird"))
            .respond_with(ResponseTemplate::new(200).set_body_json(taxonomy_body()))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = EbirdClient::with_base_url("key", &mock_server.uri());
        let cache = TaxonomyCache::new(dir.path());

        let mapping = cache.load(&client).await.unwrap();
        assert_eq!(mapping.get("annhum").map(String::as_str), Some("Anna's Hummingbird"));
        assert!(dir.path().join(TAXONOMY_CACHE_FILE).exists());
    }

    #[tokio::test]
    async fn test_taxonomy_second_load_uses_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/ref/taxonomy/ebird"))
            .respond_with(ResponseTemplate::new(200).set_body_json(taxonomy_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = EbirdClient::with_base_url("key", &mock_server.uri());
        let cache = TaxonomyCache::new(dir.path());

        cache.load(&client).await.unwrap();
        let mapping = cache.load(&client).await.unwrap();
        assert_eq!(mapping.len(), 2);
    }

    #[tokio::test]
    async fn test_taxonomy_zero_expiry_always_refetches() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/ref/taxonomy/ebird"))
            .respond_with(ResponseTemplate::new(200).set_body_json(taxonomy_body()))
            .expect(2)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = EbirdClient::with_base_url("key", &mock_server.uri());
        let cache = TaxonomyCache::with_expiry_days(dir.path(), 0);

        cache.load(&client).await.unwrap();
        cache.load(&client).await.unwrap();
    }

    #[tokio::test]
    async fn test_taxonomy_corrupt_file_is_cache_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(TAXONOMY_CACHE_FILE), "{not json").unwrap();

        let client = EbirdClient::with_base_url("key", "http://127.0.0.1:9");
        let cache = TaxonomyCache::new(dir.path());

        let result = cache.load(&client).await;
        assert!(matches!(result, Err(EbirdError::CacheError(_))));
    }

    #[tokio::test]
    async fn test_hotspot_refresh_filters_inactive() {
        let recent = Local::now().naive_local().format(EBIRD_DATETIME_FORMAT).to_string();

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/ref/hotspot/US-VA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"locId": "L1", "locName": "Ivy Creek", "lat": 38.09, "lng": -78.49,
                 "latestObsDt": recent},
                {"locId": "L2", "locName": "Sleepy Marsh", "lat": 38.0, "lng": -78.0,
                 "latestObsDt": "1970-01-01 00:00"},
                {"locId": "L3", "locName": "Never Visited", "lat": 38.1, "lng": -78.1}
            ])))
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = EbirdClient::with_base_url("key", &mock_server.uri());
        let cache = HotspotCache::new(dir.path());

        let hotspots = cache.refresh(&client, "US-VA", 14).await.unwrap();
        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].loc_id, "L1");
    }

    #[tokio::test]
    async fn test_hotspot_cached_file_roundtrip() {
        let recent = Local::now().naive_local().format(EBIRD_DATETIME_FORMAT).to_string();

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/ref/hotspot/US-VA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"locId": "L1", "locName": "Ivy Creek", "lat": 38.09, "lng": -78.49,
                 "latestObsDt": recent}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = EbirdClient::with_base_url("key", &mock_server.uri());
        let cache = HotspotCache::new(dir.path());

        cache.load(&client, "US-VA", 14).await.unwrap();
        let hotspots = cache.load(&client, "US-VA", 14).await.unwrap();
        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0].loc_name, "Ivy Creek");
    }
}
