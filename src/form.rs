use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::product::{StepDefinition, StepKind};

pub const DEFAULT_BOAT_LENGTH_M: f64 = 6.0;
pub const DEFAULT_BOAT_WEIGHT_KG: f64 = 2000.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unknown value '{value}' for {field}")]
    UnknownValue { field: Field, value: String },
    #[error("{0} is not a choice field")]
    NotAChoice(Field),
    #[error("{0} is not a numeric field")]
    NotNumeric(Field),
    #[error("Non-finite value for {0}")]
    NonFinite(Field),
}

/// Every answer the wizard can collect, keyed the way the step manifest names them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    CustomerType,
    BoatType,
    BoatLength,
    BoatWeight,
    CurrentDrive,
    WaterType,
    TripDuration,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::CustomerType => "customerType",
            Field::BoatType => "boatType",
            Field::BoatLength => "boatLength",
            Field::BoatWeight => "boatWeight",
            Field::CurrentDrive => "currentDrive",
            Field::WaterType => "waterType",
            Field::TripDuration => "tripDuration",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Field::BoatLength | Field::BoatWeight)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sailing area. Drives the power multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterType {
    #[serde(rename = "binnenwater")]
    Inland,
    #[serde(rename = "kustwater")]
    Coastal,
    #[serde(rename = "beide")]
    Mixed,
}

impl WaterType {
    pub fn as_str(self) -> &'static str {
        match self {
            WaterType::Inland => "binnenwater",
            WaterType::Coastal => "kustwater",
            WaterType::Mixed => "beide",
        }
    }

    pub fn power_factor(self) -> f64 {
        match self {
            WaterType::Inland => 1.0,
            WaterType::Coastal => 1.3,
            WaterType::Mixed => 1.15,
        }
    }
}

impl FromStr for WaterType {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binnenwater" => Ok(WaterType::Inland),
            "kustwater" => Ok(WaterType::Coastal),
            "beide" => Ok(WaterType::Mixed),
            other => Err(FormError::UnknownValue {
                field: Field::WaterType,
                value: other.to_string(),
            }),
        }
    }
}

/// Coarse trip-length bucket used to size the battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripDuration {
    #[serde(rename = "2-4")]
    Short,
    #[serde(rename = "4-8")]
    Medium,
    #[serde(rename = "8+")]
    Long,
}

impl TripDuration {
    /// Hours assumed when no bucket was picked.
    pub const FALLBACK_HOURS: f64 = 4.0;

    pub fn as_str(self) -> &'static str {
        match self {
            TripDuration::Short => "2-4",
            TripDuration::Medium => "4-8",
            TripDuration::Long => "8+",
        }
    }

    pub fn hours(self) -> f64 {
        match self {
            TripDuration::Short => 3.0,
            TripDuration::Medium => 6.0,
            TripDuration::Long => 10.0,
        }
    }
}

impl FromStr for TripDuration {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2-4" => Ok(TripDuration::Short),
            "4-8" => Ok(TripDuration::Medium),
            "8+" => Ok(TripDuration::Long),
            other => Err(FormError::UnknownValue {
                field: Field::TripDuration,
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Answers collected so far. Later answers are kept when the visitor navigates back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    pub customer_type: Option<String>,
    pub boat_type: Option<String>,
    pub boat_length: f64,
    pub boat_weight: f64,
    pub current_drive: Option<String>,
    pub water_type: Option<WaterType>,
    pub trip_duration: Option<TripDuration>,
    pub contact: ContactDetails,
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            customer_type: None,
            boat_type: None,
            boat_length: DEFAULT_BOAT_LENGTH_M,
            boat_weight: DEFAULT_BOAT_WEIGHT_KG,
            current_drive: None,
            water_type: None,
            trip_duration: None,
            contact: ContactDetails::default(),
        }
    }
}

impl FormData {
    /// Starts from the numeric defaults declared by the input steps.
    pub fn seeded(steps: &[StepDefinition]) -> Self {
        let mut form = Self::default();
        for step in steps {
            if let StepKind::Input { fields } = &step.kind {
                for field in fields {
                    // Defaults are range-checked when the manifest loads.
                    let _ = form.set_number(field.field, field.default);
                }
            }
        }
        form
    }

    pub fn set_choice(&mut self, field: Field, value: &str) -> Result<(), FormError> {
        match field {
            Field::CustomerType => self.customer_type = Some(value.to_string()),
            Field::BoatType => self.boat_type = Some(value.to_string()),
            Field::CurrentDrive => self.current_drive = Some(value.to_string()),
            Field::WaterType => self.water_type = Some(value.parse()?),
            Field::TripDuration => self.trip_duration = Some(value.parse()?),
            Field::BoatLength | Field::BoatWeight => return Err(FormError::NotAChoice(field)),
        }
        Ok(())
    }

    pub fn set_number(&mut self, field: Field, value: f64) -> Result<(), FormError> {
        if !value.is_finite() {
            return Err(FormError::NonFinite(field));
        }
        match field {
            Field::BoatLength => self.boat_length = value,
            Field::BoatWeight => self.boat_weight = value,
            _ => return Err(FormError::NotNumeric(field)),
        }
        Ok(())
    }

    pub fn choice(&self, field: Field) -> Option<&str> {
        match field {
            Field::CustomerType => self.customer_type.as_deref(),
            Field::BoatType => self.boat_type.as_deref(),
            Field::CurrentDrive => self.current_drive.as_deref(),
            Field::WaterType => self.water_type.map(WaterType::as_str),
            Field::TripDuration => self.trip_duration.map(TripDuration::as_str),
            Field::BoatLength | Field::BoatWeight => None,
        }
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        match field {
            Field::BoatLength => Some(self.boat_length),
            Field::BoatWeight => Some(self.boat_weight),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_choices_parse_dutch_values() {
        let mut form = FormData::default();
        form.set_choice(Field::WaterType, "kustwater").unwrap();
        form.set_choice(Field::TripDuration, "8+").unwrap();
        assert_eq!(form.water_type, Some(WaterType::Coastal));
        assert_eq!(form.trip_duration, Some(TripDuration::Long));
        assert_eq!(form.choice(Field::TripDuration), Some("8+"));
    }

    #[test]
    fn unknown_water_type_is_rejected_and_previous_answer_kept() {
        let mut form = FormData::default();
        form.set_choice(Field::WaterType, "beide").unwrap();
        let err = form.set_choice(Field::WaterType, "oceaan").unwrap_err();
        assert_eq!(
            err,
            FormError::UnknownValue {
                field: Field::WaterType,
                value: "oceaan".into()
            }
        );
        assert_eq!(form.water_type, Some(WaterType::Mixed));
    }

    #[test]
    fn numbers_only_go_to_numeric_fields() {
        let mut form = FormData::default();
        assert_eq!(
            form.set_number(Field::BoatType, 3.0),
            Err(FormError::NotNumeric(Field::BoatType))
        );
        assert_eq!(
            form.set_number(Field::BoatLength, f64::NAN),
            Err(FormError::NonFinite(Field::BoatLength))
        );
        assert_eq!(
            form.set_choice(Field::BoatWeight, "2000"),
            Err(FormError::NotAChoice(Field::BoatWeight))
        );
        assert_eq!(form.number(Field::BoatWeight), Some(DEFAULT_BOAT_WEIGHT_KG));
    }
}
