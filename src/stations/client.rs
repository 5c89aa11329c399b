use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response};
use tracing::{debug, info};

use crate::config::Config;
use crate::fuel::join_codes;
use crate::stations::{NearestResponse, StationQuery, StationRecord};

/// Station lookup client abstraction
pub enum StationClient {
    Real(RealStations),
    #[cfg(test)]
    Mock(MockStations),
}

impl StationClient {
    /// Create a client for the configured lookup API
    pub fn new(config: &Config) -> Result<Self> {
        Ok(StationClient::Real(RealStations::new(config)?))
    }

    /// Fetch the stations nearest to a point
    pub fn nearest(&self, query: &StationQuery) -> Result<Vec<StationRecord>> {
        match self {
            StationClient::Real(client) => client.nearest(query),
            #[cfg(test)]
            StationClient::Mock(client) => client.nearest(query),
        }
    }
}

/// Client for the NREL alternative fuel stations API
pub struct RealStations {
    client: HttpClient,
    url: String,
    api_key: String,
}

impl RealStations {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.stations.resolved_api_key();
        let client = config
            .http
            .client(None)
            .context("Failed to create HTTP client for station lookup")?;

        Ok(RealStations {
            client,
            url: config.stations.url.clone(),
            api_key,
        })
    }

    pub fn nearest(&self, query: &StationQuery) -> Result<Vec<StationRecord>> {
        let fuel_type = join_codes(&query.fuel_types);
        info!(
            "Looking up {} stations ({}) near {:.4},{:.4}",
            query.limit.get(),
            fuel_type,
            query.point.lat,
            query.point.lon
        );

        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("api_key", self.api_key.clone()),
                ("latitude", query.point.lat.to_string()),
                ("longitude", query.point.lon.to_string()),
                ("limit", query.limit.get().to_string()),
                ("fuel_type", fuel_type),
            ])
            .send()
            .context("Failed to send request to station lookup API")?;

        let stations = self.handle_response(response)?;
        debug!("Station lookup returned {} stations", stations.len());
        Ok(stations)
    }

    fn handle_response(&self, response: Response) -> Result<Vec<StationRecord>> {
        let status = response.status();
        let body = response.text().context("Failed to read station response body")?;

        if !status.is_success() {
            return Err(anyhow!("Station lookup API error ({}): {}", status, body));
        }

        let parsed: NearestResponse =
            serde_json::from_str(&body).context("Failed to parse station lookup response")?;
        Ok(parsed.fuel_stations)
    }
}

/// Mock station lookup for testing
#[cfg(test)]
pub struct MockStations {
    pub stations: Vec<StationRecord>,
    pub fail: bool,
    pub queries: std::cell::RefCell<Vec<StationQuery>>,
}

#[cfg(test)]
impl MockStations {
    pub fn new() -> Self {
        MockStations {
            stations: vec![],
            fail: false,
            queries: std::cell::RefCell::new(vec![]),
        }
    }

    pub fn with_stations(mut self, stations: Vec<StationRecord>) -> Self {
        self.stations = stations;
        self
    }

    pub fn failing() -> Self {
        MockStations {
            fail: true,
            ..Self::new()
        }
    }

    pub fn nearest(&self, query: &StationQuery) -> Result<Vec<StationRecord>> {
        self.queries.borrow_mut().push(query.clone());

        if self.fail {
            return Err(anyhow!("Station lookup API error (503 Service Unavailable)"));
        }

        Ok(self
            .stations
            .iter()
            .take(query.limit.get() as usize)
            .cloned()
            .collect())
    }
}
