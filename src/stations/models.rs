use serde::{Deserialize, Serialize};

/// A fuel station as returned by the lookup API.
///
/// Fields are copied verbatim; anything the API omits stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StationRecord {
    #[serde(default)]
    pub station_name: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub fuel_type_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl StationRecord {
    /// Map point for this station.
    ///
    /// Missing or zero coordinates are treated as unknown.
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat != 0.0 && lon != 0.0 => Some(GeoPoint { lat, lon }),
            _ => None,
        }
    }

    /// The fixed column projection shown in the results table
    pub fn table_row(&self) -> [&str; 5] {
        [
            self.station_name.as_deref().unwrap_or(""),
            self.street_address.as_deref().unwrap_or(""),
            self.city.as_deref().unwrap_or(""),
            self.state.as_deref().unwrap_or(""),
            self.zip.as_deref().unwrap_or(""),
        ]
    }
}

/// Column headers matching `StationRecord::table_row`
pub const TABLE_COLUMNS: [&str; 5] = ["station_name", "street_address", "city", "state", "zip"];

/// A latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Query sent to the station lookup API
#[derive(Debug, Clone)]
pub struct StationQuery {
    pub point: GeoPoint,
    pub fuel_types: Vec<crate::fuel::FuelType>,
    pub limit: crate::fuel::ResultLimit,
}

/// Body of the "nearest stations" response
#[derive(Debug, Deserialize)]
pub struct NearestResponse {
    #[serde(default)]
    pub fuel_stations: Vec<StationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_requires_both_coordinates() {
        let mut station = StationRecord {
            latitude: Some(40.75),
            longitude: Some(-73.99),
            ..Default::default()
        };
        assert_eq!(
            station.location(),
            Some(GeoPoint {
                lat: 40.75,
                lon: -73.99
            })
        );

        station.longitude = None;
        assert_eq!(station.location(), None);

        station.longitude = Some(0.0);
        assert_eq!(station.location(), None);
    }

    #[test]
    fn test_table_row_defaults_to_empty() {
        let station = StationRecord {
            station_name: Some("Hub".to_string()),
            city: Some("New York".to_string()),
            ..Default::default()
        };
        assert_eq!(station.table_row(), ["Hub", "", "New York", "", ""]);
    }

    #[test]
    fn test_deserialize_ignores_extra_fields() {
        let json = r#"{
            "station_name": "Garage",
            "fuel_type_code": "ELEC",
            "zip": "10001",
            "latitude": 40.7,
            "longitude": -73.9,
            "ev_network": "ChargePoint Network",
            "distance": 0.4
        }"#;
        let station: StationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(station.station_name.as_deref(), Some("Garage"));
        assert_eq!(station.street_address, None);
        assert_eq!(station.zip.as_deref(), Some("10001"));
    }

    #[test]
    fn test_missing_station_list_is_empty() {
        let response: NearestResponse = serde_json::from_str("{}").unwrap();
        assert!(response.fuel_stations.is_empty());
    }
}
