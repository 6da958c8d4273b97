//! Normalized place record as returned by the search provider.

use serde::{Deserialize, Serialize};

/// One point of interest. Immutable once fetched.
///
/// Coordinates can be absent in provider responses; such records stay in
/// list display but must be skipped for anything map-related.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub name: String,
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl PlaceRecord {
    pub fn has_coords(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_coords_requires_both() {
        let mut place = PlaceRecord {
            name: "Sunrise Yoga".into(),
            address: "12 Elm St".into(),
            lat: Some(40.7),
            lng: None,
        };
        assert!(!place.has_coords());
        place.lng = Some(-74.0);
        assert!(place.has_coords());
    }
}
