//! eBird API integration for Perch.
//!
//! Provides the eBird v2 API client and the taxonomy/hotspot file caches.

pub mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use cache::{HotspotCache, TaxonomyCache};
pub use client::EbirdClient;
pub use error::EbirdError;
pub use types::{Checklist, ChecklistObservation, Hotspot, Taxon, Visit};
