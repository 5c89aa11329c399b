mod client;
mod models;

pub use client::*;
pub use models::*;

#[cfg(test)]
pub use client::MockStations;

/// Public demo key accepted by the NREL developer API
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Default "nearest stations" endpoint
pub const DEFAULT_STATIONS_URL: &str =
    "https://developer.nrel.gov/api/alt-fuel-stations/v1/nearest.json";
