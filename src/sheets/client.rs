use anyhow::{anyhow, Context, Result};
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::Url;
use tracing::{debug, info};

use crate::config::Config;
use crate::sheets::{AppendRequest, AppendResponse, ErrorResponse, FeedbackRecord};

/// Feedback sheet client abstraction
pub enum SheetClient {
    Real(RealSheet),
    #[cfg(test)]
    Mock(MockSheet),
}

impl SheetClient {
    /// Create a client for the configured spreadsheet
    pub fn new(config: &Config) -> Result<Self> {
        Ok(SheetClient::Real(RealSheet::new(config)?))
    }

    /// Append one feedback row
    pub fn append(&self, record: &FeedbackRecord) -> Result<()> {
        match self {
            SheetClient::Real(client) => client.append(record),
            #[cfg(test)]
            SheetClient::Mock(client) => client.append(record),
        }
    }
}

/// Google Sheets `values:append` client.
///
/// Missing credentials are reported when appending, not at construction, so
/// the test can run up to the feedback step without them.
pub struct RealSheet {
    client: HttpClient,
    base_url: String,
    spreadsheet_id: Option<String>,
    range: String,
    access_token: Option<String>,
}

impl RealSheet {
    pub fn new(config: &Config) -> Result<Self> {
        let client = config
            .http
            .client(None)
            .context("Failed to create HTTP client for the feedback sheet")?;

        Ok(RealSheet {
            client,
            base_url: config.sheets.base_url.clone(),
            spreadsheet_id: config.sheets.resolved_spreadsheet_id(),
            range: config.sheets.range.clone(),
            access_token: config.sheets.resolved_access_token(),
        })
    }

    /// Build the append endpoint for the configured sheet range
    fn append_url(&self) -> Result<Url> {
        let spreadsheet_id = self
            .spreadsheet_id
            .as_deref()
            .ok_or_else(|| anyhow!("Spreadsheet id is not configured"))?;

        let range_segment = format!("{}:append", self.range);
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid sheets base URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Sheets base URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(&[
                "v4",
                "spreadsheets",
                spreadsheet_id,
                "values",
                range_segment.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");

        Ok(url)
    }

    pub fn append(&self, record: &FeedbackRecord) -> Result<()> {
        let url = self.append_url()?;
        let token = self
            .access_token
            .as_deref()
            .ok_or_else(|| anyhow!("Sheet access token is not configured (GOOGLE_SHEETS_TOKEN)"))?;

        info!("Appending feedback row for '{}'", record.name());
        let body = AppendRequest {
            values: vec![record.to_row()],
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .context("Failed to send request to the feedback sheet")?;

        self.handle_response(response)
    }

    fn handle_response(&self, response: Response) -> Result<()> {
        let status = response.status();
        let body = response.text().context("Failed to read sheet response body")?;

        if status.is_success() {
            let parsed: AppendResponse =
                serde_json::from_str(&body).context("Failed to parse sheet append response")?;
            if let Some(updates) = parsed.updates {
                debug!(
                    "Sheet updated {:?} ({} rows)",
                    updates.updated_range,
                    updates.updated_rows.unwrap_or(0)
                );
            }
            Ok(())
        } else if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&body) {
            Err(anyhow!(
                "Sheets API error ({} {}): {}",
                error_response.error.code,
                error_response.error.status.as_deref().unwrap_or("UNKNOWN"),
                error_response.error.message
            ))
        } else {
            Err(anyhow!("Sheets API error ({}): {}", status, body))
        }
    }
}

/// Mock sheet for testing
#[cfg(test)]
pub struct MockSheet {
    pub rows: std::cell::RefCell<Vec<Vec<serde_json::Value>>>,
    pub fail: bool,
}

#[cfg(test)]
impl MockSheet {
    pub fn new() -> Self {
        MockSheet {
            rows: std::cell::RefCell::new(vec![]),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        MockSheet {
            fail: true,
            ..Self::new()
        }
    }

    pub fn append(&self, record: &FeedbackRecord) -> Result<()> {
        if self.fail {
            return Err(anyhow!("Sheets API error (403 PERMISSION_DENIED): caller lacks access"));
        }
        self.rows.borrow_mut().push(record.to_row());
        Ok(())
    }
}
