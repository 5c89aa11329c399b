use anyhow::{Context, Result};
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::geocode::{DEFAULT_GEOCODING_URL, DEFAULT_USER_AGENT};
use crate::sheets::{DEFAULT_RANGE, DEFAULT_SHEETS_URL};
use crate::stations::{DEFAULT_STATIONS_URL, DEMO_API_KEY};

/// Environment variable holding the station API key
pub const STATIONS_KEY_ENV: &str = "NREL_API_KEY";
/// Environment variable holding the feedback spreadsheet id
pub const SHEET_ID_ENV: &str = "FUEL_SHEET_ID";
/// Environment variable holding the sheet bearer token
pub const SHEET_TOKEN_ENV: &str = "GOOGLE_SHEETS_TOKEN";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub stations: StationsConfig,
    #[serde(default)]
    pub sheets: SheetsConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct StationsConfig {
    #[serde(default = "default_stations_url")]
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SheetsConfig {
    #[serde(default = "default_sheets_url")]
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_id: Option<String>,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HttpConfig {
    /// Request timeout; requests wait indefinitely when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the default location or a specified path.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file at an explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    debug!("No config at {:?}, using defaults", default_path);
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config from {:?}", config_path))?;

        Ok(config)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".config").join("fuel-usability").join("config.toml"))
    }
}

impl StationsConfig {
    /// API key from the config, then the environment, then the demo key
    pub fn resolved_api_key(&self) -> String {
        resolve(self.api_key.as_deref(), STATIONS_KEY_ENV)
            .unwrap_or_else(|| DEMO_API_KEY.to_string())
    }
}

impl SheetsConfig {
    pub fn resolved_spreadsheet_id(&self) -> Option<String> {
        resolve(self.spreadsheet_id.as_deref(), SHEET_ID_ENV)
    }

    pub fn resolved_access_token(&self) -> Option<String> {
        resolve(self.access_token.as_deref(), SHEET_TOKEN_ENV)
    }
}

/// Config value, else the environment variable. Blank values count as unset
/// at both stages.
fn resolve(value: Option<&str>, env_var: &str) -> Option<String> {
    first_non_blank(value, std::env::var(env_var).ok().as_deref())
}

fn first_non_blank(value: Option<&str>, fallback: Option<&str>) -> Option<String> {
    [value, fallback]
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
        .map(str::to_string)
}

impl HttpConfig {
    /// Build a blocking HTTP client honoring the configured timeout
    pub fn client(&self, user_agent: Option<&str>) -> Result<HttpClient> {
        let mut builder =
            HttpClient::builder().timeout(self.timeout_secs.map(Duration::from_secs));

        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }

        builder.build().context("Failed to create HTTP client")
    }
}

// Default value functions
fn default_geocoding_url() -> String {
    DEFAULT_GEOCODING_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_stations_url() -> String {
    DEFAULT_STATIONS_URL.to_string()
}

fn default_sheets_url() -> String {
    DEFAULT_SHEETS_URL.to_string()
}

fn default_range() -> String {
    DEFAULT_RANGE.to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        GeocodingConfig {
            url: default_geocoding_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StationsConfig {
    fn default() -> Self {
        StationsConfig {
            url: default_stations_url(),
            api_key: None,
        }
    }
}

impl Default for SheetsConfig {
    fn default() -> Self {
        SheetsConfig {
            base_url: default_sheets_url(),
            spreadsheet_id: None,
            range: default_range(),
            access_token: None,
        }
    }
}
