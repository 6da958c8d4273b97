//! Google Maps Places / Geocoding client.

use crate::PlaceSearch;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;
use thymos_core::{PlaceRecord, ThymosError};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_results: usize,
}

impl GoogleMapsClient {
    /// Reads `GOOGLE_MAPS_API_KEY` (falling back to `"mock"`, which serves
    /// canned offline data) and an optional `GOOGLE_MAPS_BASE_URL` override.
    pub fn new(max_results: usize) -> Result<Self> {
        let api_key = env::var("GOOGLE_MAPS_API_KEY").unwrap_or_else(|_| "mock".to_string());
        let base_url = env::var("GOOGLE_MAPS_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?,
            api_key,
            base_url,
            max_results,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = api_key.to_string();
        self
    }

    fn mock_places(&self, keyword: &str) -> Vec<PlaceRecord> {
        (1..=3.min(self.max_results))
            .map(|i| PlaceRecord {
                name: format!("Mock {} #{}", keyword, i),
                address: format!("{} Example Ave", 100 * i),
                lat: Some(40.7128 + i as f64 * 0.001),
                lng: Some(-74.0060 - i as f64 * 0.001),
            })
            .collect()
    }
}

#[async_trait]
impl PlaceSearch for GoogleMapsClient {
    async fn search(
        &self,
        keyword: &str,
        location: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceRecord>> {
        if self.api_key == "mock" {
            tokio::time::sleep(Duration::from_millis(100)).await;
            return Ok(self.mock_places(keyword));
        }

        let url = format!("{}/maps/api/place/nearbysearch/json", self.base_url);
        let radius = radius_m.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("location", location),
                ("radius", radius.as_str()),
                ("keyword", keyword),
            ])
            .send()
            .await
            .context("Failed to reach place search service")?;

        if !response.status().is_success() {
            return Err(ThymosError::ProviderUnavailable(format!(
                "place search returned HTTP {}",
                response.status()
            ))
            .into());
        }

        let body: NearbyResponse = response
            .json()
            .await
            .context("Failed to parse place search response")?;

        let places: Vec<PlaceRecord> = body
            .results
            .into_iter()
            .take(self.max_results)
            .map(|p| {
                let loc = p.geometry.and_then(|g| g.location);
                PlaceRecord {
                    name: p.name.unwrap_or_else(|| "Unknown".to_string()),
                    address: p
                        .vicinity
                        .unwrap_or_else(|| "No address found".to_string()),
                    lat: loc.as_ref().and_then(|l| l.lat),
                    lng: loc.as_ref().and_then(|l| l.lng),
                }
            })
            .collect();

        tracing::debug!(keyword, location, count = places.len(), "place search complete");
        Ok(places)
    }

    async fn geocode(&self, query: &str) -> Result<Option<(f64, f64)>> {
        if self.api_key == "mock" {
            tokio::time::sleep(Duration::from_millis(100)).await;
            // New York City
            return Ok(Some((40.7128, -74.0060)));
        }

        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("address", query), ("key", self.api_key.as_str())])
            .send()
            .await
            .context("Failed to reach geocoding service")?;

        if !response.status().is_success() {
            return Err(ThymosError::ProviderUnavailable(format!(
                "geocoding returned HTTP {}",
                response.status()
            ))
            .into());
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        // Anything but an OK status with at least one result means "no answer".
        if body.status != "OK" {
            return Ok(None);
        }
        let coords = body
            .results
            .into_iter()
            .next()
            .and_then(|r| r.geometry.location)
            .and_then(|l| match (l.lat, l.lng) {
                (Some(lat), Some(lng)) => Some((lat, lng)),
                _ => None,
            });
        Ok(coords)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default)]
    results: Vec<NearbyPlace>,
}

#[derive(Debug, Deserialize)]
struct NearbyPlace {
    name: Option<String>,
    vicinity: Option<String>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GoogleMapsClient {
        GoogleMapsClient::new(5)
            .unwrap()
            .with_api_key("test-key")
            .with_base_url(&server.uri())
    }

    #[tokio::test]
    async fn test_search_parses_places() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "status": "OK",
            "results": [
                {
                    "name": "Sunrise Yoga",
                    "vicinity": "12 Elm St",
                    "geometry": { "location": { "lat": 40.71, "lng": -74.0 } }
                },
                {
                    "vicinity": "Pier 4",
                    "geometry": { "location": { "lat": 40.72 } }
                },
                { "name": "No Geometry Hall" }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .and(query_param("keyword", "yoga"))
            .and(query_param("radius", "1500"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let places = client_for(&server)
            .search("yoga", "40.7128,-74.0060", 1500)
            .await
            .unwrap();

        assert_eq!(places.len(), 3);
        assert_eq!(places[0].name, "Sunrise Yoga");
        assert!(places[0].has_coords());
        // Missing fields fall back to the fixed defaults.
        assert_eq!(places[1].name, "Unknown");
        assert!(!places[1].has_coords());
        assert_eq!(places[2].address, "No address found");
    }

    #[tokio::test]
    async fn test_search_truncates_to_max_results() {
        let server = MockServer::start().await;
        let results: Vec<_> = (0..9)
            .map(|i| serde_json::json!({ "name": format!("Place {}", i) }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/maps/api/place/nearbysearch/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "results": results })),
            )
            .mount(&server)
            .await;

        let places = client_for(&server)
            .search("cafe", "40.7,-74.0", 1500)
            .await
            .unwrap();
        assert_eq!(places.len(), 5);
    }

    #[tokio::test]
    async fn test_search_http_error_is_err() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = client_for(&server).search("bar", "40.7,-74.0", 1500).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_geocode_ok() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "status": "OK",
            "results": [
                { "geometry": { "location": { "lat": 35.6762, "lng": 139.6503 } } }
            ]
        });
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .and(query_param("address", "Tokyo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let coords = client_for(&server).geocode("Tokyo").await.unwrap();
        assert_eq!(coords, Some((35.6762, 139.6503)));
    }

    #[tokio::test]
    async fn test_geocode_zero_results_is_none() {
        let server = MockServer::start().await;
        let body = serde_json::json!({ "status": "ZERO_RESULTS", "results": [] });
        Mock::given(method("GET"))
            .and(path("/maps/api/geocode/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let coords = client_for(&server).geocode("Atlantis").await.unwrap();
        assert_eq!(coords, None);
    }

    #[tokio::test]
    async fn test_mock_key_serves_offline_data() {
        let client = GoogleMapsClient::new(5).unwrap().with_api_key("mock");
        let places = client.search("spa", "40.7,-74.0", 1500).await.unwrap();
        assert!(!places.is_empty());
        assert!(places[0].name.contains("spa"));

        let coords = client.geocode("anywhere").await.unwrap();
        assert!(coords.is_some());
    }
}
