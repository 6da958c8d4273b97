//! Place search and geocoding, consumed by the session as a narrow capability.

pub mod google;

pub use google::GoogleMapsClient;

use anyhow::Result;
use async_trait::async_trait;
use thymos_core::PlaceRecord;

/// External place/geocoding capability.
///
/// Callers treat any `Err` or empty result as "no places found"; provider
/// failures never propagate past the session.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Up to `max_results` places near `location` (a `"lat,lng"` string)
    /// matching `keyword`.
    async fn search(&self, keyword: &str, location: &str, radius_m: u32)
        -> Result<Vec<PlaceRecord>>;

    /// Resolve a free-form place name to coordinates; `None` when the
    /// geocoder has no answer.
    async fn geocode(&self, query: &str) -> Result<Option<(f64, f64)>>;
}
