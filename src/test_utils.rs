//! Test utilities for fuel-finder-usability
#![cfg(test)]

use crate::fuel::{FuelType, ResultLimit};
use crate::geocode::{GeocodingClient, MockGeocoder};
use crate::sheets::{MockSheet, SheetClient};
use crate::stations::{MockStations, StationClient, StationRecord};
use crate::wizard::{SearchForm, Services, Wizard};

/// Create a wizard backed by mocks.
///
/// The geocoder only knows "10001"; the station mock returns `stations`.
pub fn create_test_wizard(stations: Vec<StationRecord>) -> Wizard {
    Wizard::new(create_test_services(stations))
}

pub fn create_test_services(stations: Vec<StationRecord>) -> Services {
    Services {
        geocoder: GeocodingClient::Mock(MockGeocoder::new().with_place("10001", 40.7506, -73.9972)),
        stations: StationClient::Mock(MockStations::new().with_stations(stations)),
        sheet: SheetClient::Mock(MockSheet::new()),
    }
}

/// An electric-only search with the smallest result limit
pub fn search_form(location: &str) -> SearchForm {
    SearchForm::new(location, vec![FuelType::Elec], ResultLimit::default())
}

/// Create a test station with coordinates near midtown Manhattan
pub fn create_test_station(name: &str, fuel_type_code: Option<&str>) -> StationRecord {
    StationRecord {
        station_name: Some(name.to_string()),
        street_address: Some(format!("{} W 34th St", name.len() * 10)),
        city: Some("New York".to_string()),
        state: Some("NY".to_string()),
        zip: Some("10001".to_string()),
        fuel_type_code: fuel_type_code.map(str::to_string),
        latitude: Some(40.75),
        longitude: Some(-73.99),
    }
}

/// Create `count` electric stations
pub fn create_test_stations(count: usize) -> Vec<StationRecord> {
    (1..=count)
        .map(|i| create_test_station(&format!("Station {}", i), Some("ELEC")))
        .collect()
}
