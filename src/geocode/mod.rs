mod client;
mod models;

pub use client::*;
pub use models::*;

#[cfg(test)]
pub use client::MockGeocoder;

/// Default Nominatim search endpoint
pub const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org/search";

/// User-Agent sent with geocoding requests
pub const DEFAULT_USER_AGENT: &str = "Alternative Fuel Finder";
