use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::error::WizardError;

/// How hard the participant found the test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    #[default]
    Easy,
    Moderate,
    Difficult,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Difficult];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Difficult => "Difficult",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Participant age, bounded to 18..=80
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Age(u8);

impl Age {
    pub const MIN: u8 = 18;
    pub const MAX: u8 = 80;

    pub fn new(value: u8) -> Result<Self, WizardError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Age(value))
        } else {
            Err(WizardError::Validation(format!(
                "Age must be between {} and {}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl Default for Age {
    fn default() -> Self {
        Age(Self::MIN)
    }
}

impl TryFrom<u8> for Age {
    type Error = WizardError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Age::new(value)
    }
}

impl From<Age> for u8 {
    fn from(age: Age) -> u8 {
        age.0
    }
}

/// One completed usability test, as written to the sheet.
///
/// Built once when feedback is submitted and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    name: String,
    age: Age,
    difficulty: Difficulty,
    comment: String,
    durations: [Option<f64>; 3],
    successes: [bool; 3],
}

impl FeedbackRecord {
    pub fn new(
        name: impl Into<String>,
        age: Age,
        difficulty: Difficulty,
        comment: impl Into<String>,
        durations: [Option<f64>; 3],
        successes: [bool; 3],
    ) -> Self {
        FeedbackRecord {
            name: name.into(),
            age,
            difficulty,
            comment: comment.into(),
            durations,
            successes,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> Age {
        self.age
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn durations(&self) -> [Option<f64>; 3] {
        self.durations
    }

    pub fn successes(&self) -> [bool; 3] {
        self.successes
    }

    /// Sheet row: name, age, difficulty, feedback, three durations, three
    /// success flags. A missing duration becomes an empty cell.
    pub fn to_row(&self) -> Vec<Value> {
        let mut row = vec![
            json!(self.name),
            json!(self.age.get()),
            json!(self.difficulty.as_str()),
            json!(self.comment),
        ];
        row.extend(self.durations.iter().map(|d| json!(d)));
        row.extend(self.successes.iter().map(|s| json!(s)));
        row
    }
}

/// Body of a `values:append` request
#[derive(Debug, Serialize)]
pub struct AppendRequest {
    pub values: Vec<Vec<Value>>,
}

/// Relevant part of a `values:append` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendResponse {
    #[serde(default)]
    pub updates: Option<UpdateSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    #[serde(default)]
    pub updated_range: Option<String>,
    #[serde(default)]
    pub updated_rows: Option<u32>,
}

/// Error body returned by the Sheets API
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub code: u16,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}
