mod client;
mod models;

pub use client::*;
pub use models::*;

#[cfg(test)]
pub use client::MockSheet;

/// Default Sheets API root
pub const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com";

/// Default range rows are appended to
pub const DEFAULT_RANGE: &str = "Sheet1";
