use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response};
use tracing::{debug, info};

use crate::config::Config;
use crate::geocode::Place;
use crate::stations::GeoPoint;

/// Geocoding client abstraction
pub enum GeocodingClient {
    Real(RealGeocoder),
    #[cfg(test)]
    Mock(MockGeocoder),
}

impl GeocodingClient {
    /// Create a client for the configured geocoding service
    pub fn new(config: &Config) -> Result<Self> {
        Ok(GeocodingClient::Real(RealGeocoder::new(config)?))
    }

    /// Resolve a free-text address to its best match, if any
    pub fn locate(&self, address: &str) -> Result<Option<GeoPoint>> {
        match self {
            GeocodingClient::Real(client) => client.locate(address),
            #[cfg(test)]
            GeocodingClient::Mock(client) => client.locate(address),
        }
    }
}

/// Client for the OpenStreetMap Nominatim search endpoint
pub struct RealGeocoder {
    client: HttpClient,
    url: String,
}

impl RealGeocoder {
    pub fn new(config: &Config) -> Result<Self> {
        // Nominatim rejects requests without an identifying User-Agent
        let client = config
            .http
            .client(Some(&config.geocoding.user_agent))
            .context("Failed to create HTTP client for geocoding")?;

        Ok(RealGeocoder {
            client,
            url: config.geocoding.url.clone(),
        })
    }

    pub fn locate(&self, address: &str) -> Result<Option<GeoPoint>> {
        info!("Geocoding '{}'", address);

        let response = self
            .client
            .get(&self.url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .context("Failed to send request to geocoding service")?;

        let places = self.handle_response(response)?;
        match places.first() {
            Some(place) => {
                let point = place.point()?;
                debug!(
                    "Geocoded '{}' to {},{} ({})",
                    address,
                    point.lat,
                    point.lon,
                    place.display_name.as_deref().unwrap_or("unnamed")
                );
                Ok(Some(point))
            }
            None => Ok(None),
        }
    }

    fn handle_response(&self, response: Response) -> Result<Vec<Place>> {
        let status = response.status();
        let body = response.text().context("Failed to read geocoding response body")?;

        if !status.is_success() {
            return Err(anyhow!("Geocoding service error ({}): {}", status, body));
        }

        serde_json::from_str(&body).context("Failed to parse geocoding response")
    }
}

/// Mock geocoder for testing
#[cfg(test)]
pub struct MockGeocoder {
    pub places: Vec<(String, GeoPoint)>,
    pub fail: bool,
    pub call_count: std::cell::RefCell<usize>,
}

#[cfg(test)]
impl MockGeocoder {
    pub fn new() -> Self {
        MockGeocoder {
            places: vec![],
            fail: false,
            call_count: std::cell::RefCell::new(0),
        }
    }

    pub fn with_place(mut self, address: &str, lat: f64, lon: f64) -> Self {
        self.places.push((address.to_string(), GeoPoint { lat, lon }));
        self
    }

    pub fn locate(&self, address: &str) -> Result<Option<GeoPoint>> {
        *self.call_count.borrow_mut() += 1;

        if self.fail {
            return Err(anyhow!("Geocoding service error (500 Internal Server Error)"));
        }

        Ok(self
            .places
            .iter()
            .find(|(known, _)| known == address)
            .map(|(_, point)| *point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_geocoder_lookup() {
        let client = GeocodingClient::Mock(MockGeocoder::new().with_place("10001", 40.75, -73.99));

        let point = client.locate("10001").unwrap().unwrap();
        assert_eq!(point.lat, 40.75);
        assert!(client.locate("Atlantis").unwrap().is_none());
    }

    #[test]
    fn test_mock_geocoder_counts_calls() {
        let mock = MockGeocoder::new();
        mock.locate("a").unwrap();
        mock.locate("b").unwrap();
        assert_eq!(*mock.call_count.borrow(), 2);
    }
}
