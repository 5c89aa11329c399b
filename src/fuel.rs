use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WizardError;
use crate::stations::StationRecord;

/// Fuel types understood by the station lookup API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FuelType {
    #[default]
    Elec,
    Lpg,
    Cng,
    E85,
    Hy,
    Lng,
    Bd,
    Rd,
}

impl FuelType {
    /// Catalogue order, used for prompts and chart tie-breaking
    pub const ALL: [FuelType; 8] = [
        FuelType::Elec,
        FuelType::Lpg,
        FuelType::Cng,
        FuelType::E85,
        FuelType::Hy,
        FuelType::Lng,
        FuelType::Bd,
        FuelType::Rd,
    ];

    /// API code for this fuel type
    pub fn code(&self) -> &'static str {
        match self {
            FuelType::Elec => "ELEC",
            FuelType::Lpg => "LPG",
            FuelType::Cng => "CNG",
            FuelType::E85 => "E85",
            FuelType::Hy => "HY",
            FuelType::Lng => "LNG",
            FuelType::Bd => "BD",
            FuelType::Rd => "RD",
        }
    }

    /// Human readable name shown in the chart
    pub fn display_name(&self) -> &'static str {
        match self {
            FuelType::Elec => "Electric",
            FuelType::Lpg => "Liquified Petroleum Gas",
            FuelType::Cng => "Compressed Natural Gas",
            FuelType::E85 => "Ethanol (E85)",
            FuelType::Hy => "Hydrogen",
            FuelType::Lng => "Liquified Natural Gas",
            FuelType::Bd => "Biodiesel",
            FuelType::Rd => "Renewable Diesel",
        }
    }

    /// Look up a fuel type by its API code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.code() == code)
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for FuelType {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(&s.trim().to_uppercase())
            .ok_or_else(|| WizardError::Validation(format!("Unknown fuel type '{}'", s.trim())))
    }
}

/// Join fuel type codes the way the lookup API expects them
pub fn join_codes(fuel_types: &[FuelType]) -> String {
    fuel_types
        .iter()
        .map(FuelType::code)
        .collect::<Vec<_>>()
        .join(",")
}

/// Number of stations to retrieve, bounded to 10..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ResultLimit(u32);

impl ResultLimit {
    pub const MIN: u32 = 10;
    pub const MAX: u32 = 100;
    pub const STEP: u32 = 10;

    pub fn new(value: u32) -> Result<Self, WizardError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(ResultLimit(value))
        } else {
            Err(WizardError::Validation(format!(
                "Number of stations must be between {} and {}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Values offered by the interactive prompt
    pub fn choices() -> Vec<u32> {
        (Self::MIN..=Self::MAX).step_by(Self::STEP as usize).collect()
    }
}

impl Default for ResultLimit {
    fn default() -> Self {
        ResultLimit(Self::MIN)
    }
}

impl TryFrom<u32> for ResultLimit {
    type Error = WizardError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ResultLimit::new(value)
    }
}

impl From<ResultLimit> for u32 {
    fn from(limit: ResultLimit) -> u32 {
        limit.0
    }
}

/// One bar of the fuel type chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuelCount {
    pub label: String,
    pub count: usize,
}

/// Count stations per fuel type.
///
/// Every catalogue entry is present, zero counts included. Codes outside the
/// catalogue are kept verbatim and a missing code is counted as "Unknown".
/// Sorted by count descending; ties keep catalogue order.
pub fn distribution(stations: &[StationRecord]) -> Vec<FuelCount> {
    let mut counts: Vec<FuelCount> = FuelType::ALL
        .iter()
        .map(|f| FuelCount {
            label: f.display_name().to_string(),
            count: 0,
        })
        .collect();

    for station in stations {
        let label = match station.fuel_type_code.as_deref() {
            Some(code) => FuelType::from_code(code)
                .map(|f| f.display_name().to_string())
                .unwrap_or_else(|| code.to_string()),
            None => "Unknown".to_string(),
        };

        match counts.iter_mut().find(|c| c.label == label) {
            Some(entry) => entry.count += 1,
            None => counts.push(FuelCount { label, count: 1 }),
        }
    }

    // sort_by is stable
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_station;

    #[test]
    fn test_fuel_type_codes() {
        assert_eq!(FuelType::Elec.code(), "ELEC");
        assert_eq!(FuelType::E85.display_name(), "Ethanol (E85)");
        assert_eq!(FuelType::from_code("HY"), Some(FuelType::Hy));
        assert_eq!(FuelType::from_code("XYZ"), None);
        assert_eq!(FuelType::default(), FuelType::Elec);
    }

    #[test]
    fn test_parse_fuel_type() {
        assert_eq!(" cng ".parse::<FuelType>().unwrap(), FuelType::Cng);
        assert!("diesel".parse::<FuelType>().is_err());
    }

    #[test]
    fn test_join_codes() {
        assert_eq!(join_codes(&[FuelType::Elec, FuelType::Lpg]), "ELEC,LPG");
        assert_eq!(join_codes(&[]), "");
    }

    #[test]
    fn test_result_limit_bounds() {
        assert!(ResultLimit::new(9).is_err());
        assert!(ResultLimit::new(101).is_err());
        assert_eq!(ResultLimit::new(10).unwrap().get(), 10);
        assert_eq!(ResultLimit::new(100).unwrap().get(), 100);
        assert_eq!(ResultLimit::default().get(), 10);
        assert_eq!(ResultLimit::choices().len(), 10);
        assert_eq!(ResultLimit::choices()[9], 100);
    }

    #[test]
    fn test_result_limit_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<ResultLimit>("50").is_ok());
        assert!(serde_json::from_str::<ResultLimit>("500").is_err());
    }

    #[test]
    fn test_distribution_counts_and_order() {
        let stations = vec![
            create_test_station("A", Some("CNG")),
            create_test_station("B", Some("ELEC")),
            create_test_station("C", Some("ELEC")),
            create_test_station("D", Some("WIND")),
            create_test_station("E", None),
        ];

        let counts = distribution(&stations);

        assert_eq!(counts[0], FuelCount { label: "Electric".to_string(), count: 2 });
        assert_eq!(counts[1].label, "Compressed Natural Gas");
        assert_eq!(counts[1].count, 1);
        assert!(counts.iter().any(|c| c.label == "WIND" && c.count == 1));
        assert!(counts.iter().any(|c| c.label == "Unknown" && c.count == 1));
        // All catalogue entries stay present
        assert_eq!(counts.len(), 10);
        assert!(counts.iter().any(|c| c.label == "Hydrogen" && c.count == 0));
    }

    #[test]
    fn test_distribution_ties_keep_catalogue_order() {
        let counts = distribution(&[]);
        let labels: Vec<_> = counts.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels[0], "Electric");
        assert_eq!(labels[7], "Renewable Diesel");
    }
}
