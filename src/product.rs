use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::form::Field;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Motor catalog is empty")]
    Empty,
    #[error("Motor '{0}' has min length above max length")]
    InvertedLengthRange(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChoiceOption {
    pub value: String,        // Stored answer (e.g. "kustwater")
    pub label: String,        // Button text (e.g. "Kustwater")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>, // Asset file name, resolved by the hosting page
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NumericField {
    #[serde(rename = "id")]
    pub field: Field,
    pub label: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl NumericField {
    /// Snaps to the step grid and clamps into `[min, max]`, like a range control does.
    pub fn clamp(&self, value: f64) -> f64 {
        let snapped = if self.step > 0.0 {
            self.min + ((value - self.min) / self.step).round() * self.step
        } else {
            value
        };
        snapped.clamp(self.min, self.max)
    }

    /// Position of `value` along the track, in percent.
    pub fn fill_percent(&self, value: f64) -> f64 {
        if self.max <= self.min {
            return 100.0;
        }
        ((value - self.min) / (self.max - self.min)) * 100.0
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum StepKind {
    Choice {
        field: Field,
        options: Vec<ChoiceOption>,
        #[serde(default)]
        has_icons: bool,
    },
    Input {
        fields: Vec<NumericField>,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StepDefinition {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    #[serde(flatten)]
    pub kind: StepKind,
}

impl StepDefinition {
    pub fn option(&self, value: &str) -> Option<&ChoiceOption> {
        match &self.kind {
            StepKind::Choice { options, .. } => options.iter().find(|o| o.value == value),
            StepKind::Input { .. } => None,
        }
    }

    pub fn numeric_field(&self, field: Field) -> Option<&NumericField> {
        match &self.kind {
            StepKind::Input { fields } => fields.iter().find(|f| f.field == field),
            StepKind::Choice { .. } => None,
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self.kind, StepKind::Choice { .. })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Motor {
    pub name: String,
    pub power: f64,      // kW
    pub max_weight: f64, // kg
    pub min_length: f64, // m, waterline
    pub max_length: f64,
}

impl Motor {
    pub fn fits(&self, required_power: f64, weight_kg: f64, length_m: f64) -> bool {
        self.power >= required_power
            && self.max_weight >= weight_kg
            && self.min_length <= length_m
            && self.max_length >= length_m
    }
}

/// Ordered, never-empty list of motors. Order is selection priority.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "Vec<Motor>", into = "Vec<Motor>")]
pub struct MotorCatalog {
    motors: Vec<Motor>,
}

impl MotorCatalog {
    pub fn new(motors: Vec<Motor>) -> Result<Self, CatalogError> {
        if motors.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(bad) = motors.iter().find(|m| m.min_length > m.max_length) {
            return Err(CatalogError::InvertedLengthRange(bad.name.clone()));
        }
        Ok(Self { motors })
    }

    pub fn motors(&self) -> &[Motor] {
        &self.motors
    }

    /// The entry recommended when nothing else fits.
    pub fn largest(&self) -> &Motor {
        // Non-empty by construction.
        &self.motors[self.motors.len() - 1]
    }
}

impl TryFrom<Vec<Motor>> for MotorCatalog {
    type Error = CatalogError;

    fn try_from(motors: Vec<Motor>) -> Result<Self, Self::Error> {
        Self::new(motors)
    }
}

impl From<MotorCatalog> for Vec<Motor> {
    fn from(catalog: MotorCatalog) -> Self {
        catalog.motors
    }
}
