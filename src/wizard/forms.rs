use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Level;
use crate::fuel::{FuelType, ResultLimit};
use crate::session::Step;
use crate::sheets::{Age, Difficulty};

/// Input of the search step
#[derive(Debug, Clone)]
pub struct SearchForm {
    pub location: String,
    pub fuel_types: Vec<FuelType>,
    pub limit: ResultLimit,
}

impl SearchForm {
    pub fn new(location: impl Into<String>, fuel_types: Vec<FuelType>, limit: ResultLimit) -> Self {
        SearchForm {
            location: location.into(),
            fuel_types,
            limit,
        }
    }
}

/// Channel the results are (notionally) sent through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeliveryMethod {
    #[default]
    Email,
    TextMessage,
}

impl DeliveryMethod {
    pub const ALL: [DeliveryMethod; 2] = [DeliveryMethod::Email, DeliveryMethod::TextMessage];

    /// Prompt for the matching contact field
    pub fn contact_prompt(&self) -> &'static str {
        match self {
            DeliveryMethod::Email => "Enter your email address",
            DeliveryMethod::TextMessage => "Enter your phone number (with country code).",
        }
    }
}

impl fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMethod::Email => f.write_str("Email"),
            DeliveryMethod::TextMessage => f.write_str("Text Message"),
        }
    }
}

/// Input of the delivery step
#[derive(Debug, Clone, Default)]
pub struct DeliveryForm {
    pub method: DeliveryMethod,
    pub contact: String,
}

impl DeliveryForm {
    pub fn new(method: DeliveryMethod, contact: impl Into<String>) -> Self {
        DeliveryForm {
            method,
            contact: contact.into(),
        }
    }

    pub fn has_contact(&self) -> bool {
        !self.contact.trim().is_empty()
    }
}

/// Input of the feedback step
#[derive(Debug, Clone, Default)]
pub struct FeedbackForm {
    pub name: String,
    pub age: Age,
    pub difficulty: Difficulty,
    pub comment: String,
}

/// Something the participant did
#[derive(Debug, Clone)]
pub enum Action {
    Start,
    Search(SearchForm),
    BackToSearch,
    ContinueToDelivery,
    SendResults(DeliveryForm),
    ContinueToFeedback(DeliveryForm),
    SubmitFeedback(FeedbackForm),
}

impl Action {
    /// Button label, used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Action::Start => "Start Task 1",
            Action::Search(_) => "Search for Fuel",
            Action::BackToSearch => "Back to Search",
            Action::ContinueToDelivery => "Receive Search Results",
            Action::SendResults(_) => "Send Search Results",
            Action::ContinueToFeedback(_) => "Feedback",
            Action::SubmitFeedback(_) => "Submit Feedback",
        }
    }

    /// The step offering this action
    pub fn step(&self) -> Step {
        match self {
            Action::Start => Step::Intro,
            Action::Search(_) => Step::Task1,
            Action::BackToSearch | Action::ContinueToDelivery => Step::Task2,
            Action::SendResults(_) | Action::ContinueToFeedback(_) => Step::Task3,
            Action::SubmitFeedback(_) => Step::Feedback,
        }
    }
}

/// Inline message produced by a handled action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: Level::Info,
            message: message.into(),
        }
    }
}

impl From<&crate::error::WizardError> for Notice {
    fn from(error: &crate::error::WizardError) -> Self {
        Notice {
            level: error.level(),
            message: error.to_string(),
        }
    }
}
