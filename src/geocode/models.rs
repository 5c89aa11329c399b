use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::stations::GeoPoint;

/// One match from the Nominatim search endpoint.
///
/// Coordinates arrive as decimal strings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Place {
    pub fn point(&self) -> Result<GeoPoint> {
        let lat = self
            .lat
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid latitude in geocoding response: {}", self.lat))?;
        let lon = self
            .lon
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid longitude in geocoding response: {}", self.lon))?;
        Ok(GeoPoint { lat, lon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_point() {
        let place = Place {
            lat: "40.7484".to_string(),
            lon: "-73.9967".to_string(),
            display_name: None,
        };
        let point = place.point().unwrap();
        assert_eq!(point.lat, 40.7484);
        assert_eq!(point.lon, -73.9967);
    }

    #[test]
    fn test_place_point_rejects_garbage() {
        let place = Place {
            lat: "north".to_string(),
            lon: "0".to_string(),
            display_name: None,
        };
        assert!(place.point().unwrap_err().to_string().contains("Invalid latitude"));
    }
}
