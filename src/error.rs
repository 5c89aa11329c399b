use std::fmt;
use thiserror::Error;

use crate::session::Step;

/// Recoverable failures of a wizard action.
///
/// None of these end the session; the step is left unchanged and the user
/// may retry.
#[derive(Debug, Error)]
pub enum WizardError {
    /// A required field is empty or out of range
    #[error("{0}")]
    Validation(String),

    /// The feedback comment was left empty
    #[error("We appreciate your feedback! Please provide a suggestion or comment")]
    EmptyComment,

    /// Geocoding returned nothing usable
    #[error("Location could not be found.")]
    LocationNotFound,

    /// The station lookup API returned a non-success status or bad body
    #[error("Error retrieving fuel station data.")]
    StationLookupFailed(#[source] anyhow::Error),

    /// The station lookup succeeded but found nothing
    #[error("No fuel stations found near this location.")]
    NoStationsFound,

    /// Results were requested but the session holds none
    #[error("No search results available. Please go back and search again")]
    NoResults,

    /// Feedback was requested before results were sent
    #[error("Please send search results before proceeding to feedback.")]
    ResultsNotSent,

    /// Appending the feedback row failed
    #[error("Failed to submit feedback: {0:#}")]
    Persistence(#[source] anyhow::Error),

    /// A transition outside the step table was requested
    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: Step, to: Step },

    /// The action is not offered by the current step
    #[error("'{action}' is not available during {step}")]
    InvalidAction { step: Step, action: &'static str },
}

impl WizardError {
    /// How the error should be surfaced to the user
    pub fn level(&self) -> Level {
        match self {
            WizardError::EmptyComment | WizardError::NoStationsFound | WizardError::NoResults => {
                Level::Warning
            }
            _ => Level::Error,
        }
    }

    /// Whether this is a field validation failure
    pub fn is_validation(&self) -> bool {
        matches!(self, WizardError::Validation(_) | WizardError::EmptyComment)
    }

    /// Whether this came from one of the lookup collaborators
    pub fn is_lookup(&self) -> bool {
        matches!(
            self,
            WizardError::LocationNotFound
                | WizardError::StationLookupFailed(_)
                | WizardError::NoStationsFound
        )
    }
}

/// Severity of an inline message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

/// User-friendly error wrapper
#[derive(Debug)]
pub struct UserError {
    message: String,
    details: Option<String>,
    suggestion: Option<String>,
}

impl UserError {
    /// Create a new user error
    pub fn new(message: impl Into<String>) -> Self {
        UserError {
            message: message.into(),
            details: None,
            suggestion: None,
        }
    }

    /// Add details about the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Add a suggestion for how to fix the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    /// Format the error for display
    pub fn display(&self) {
        eprintln!("\n❌ Error: {}", self.message);

        if let Some(ref details) = self.details {
            eprintln!("\n   {}", details);
        }

        if let Some(ref suggestion) = self.suggestion {
            eprintln!("\n💡 {}", suggestion);
        }
    }
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref details) = self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for UserError {}

/// Convert process-level errors to user-friendly messages
pub fn user_friendly_error(error: &anyhow::Error) -> UserError {
    let error_str = format!("{:#}", error);

    if error_str.contains("Failed to read config") {
        return UserError::new("Configuration file not found")
            .with_details(error_str)
            .with_suggestion("Run 'fuel-usability init' to create a configuration");
    }

    if error_str.contains("Failed to parse config") {
        return UserError::new("Invalid configuration file")
            .with_details("The configuration file contains syntax errors")
            .with_suggestion("Check the TOML syntax in your config.toml file");
    }

    if error_str.contains("Spreadsheet id is not configured") {
        return UserError::new("Feedback sheet not configured")
            .with_details("Feedback rows cannot be appended without a spreadsheet id")
            .with_suggestion("Set FUEL_SHEET_ID or sheets.spreadsheet_id in the config file");
    }

    if error_str.contains("not a terminal") || error_str.contains("IO error") {
        return UserError::new("Interactive terminal required")
            .with_details("The usability test prompts for input on stdin")
            .with_suggestion("Run the wizard from an interactive terminal, or use 'lookup'");
    }

    if error_str.contains("Permission denied") {
        return UserError::new("Permission denied")
            .with_details("Cannot write to the specified location")
            .with_suggestion("Check that you have write permissions for the config directory");
    }

    if error_str.contains("connect") || error_str.contains("dns") {
        return UserError::new("Network connection failed")
            .with_details("Could not reach the geocoding, station or sheet service")
            .with_suggestion("Check your internet connection and try again");
    }

    // Default fallback
    UserError::new("An unexpected error occurred").with_details(error_str)
}

/// Wrap a result with user-friendly error handling
pub trait UserFriendly<T> {
    fn user_friendly(self) -> Result<T, UserError>;
}

impl<T> UserFriendly<T> for anyhow::Result<T> {
    fn user_friendly(self) -> Result<T, UserError> {
        self.map_err(|e| user_friendly_error(&e))
    }
}
