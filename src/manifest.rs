use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

use crate::form::{Field, TripDuration, WaterType};
use crate::product::{CatalogError, MotorCatalog, StepDefinition, StepKind};

/// Dutch copy, steps and catalog the calculator ships with.
pub const DEFAULT_MANIFEST: &str = include_str!("../manifest/green_marine.yaml");

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse manifest YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid motor catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Manifest declares no steps")]
    NoSteps,
    #[error("Step '{step}': {reason}")]
    InvalidStep { step: String, reason: String },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WizardManifest {
    pub name: String,
    pub steps: Vec<StepDefinition>,
    pub motors: MotorCatalog,
    #[serde(default)]
    pub usps: Vec<String>,
}

impl WizardManifest {
    pub fn from_yaml(raw: &str) -> Result<Self, ManifestError> {
        let manifest: WizardManifest = serde_yaml::from_str(raw)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn embedded() -> Result<Self, ManifestError> {
        Self::from_yaml(DEFAULT_MANIFEST)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&StepDefinition> {
        self.steps.get(index)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.steps.is_empty() {
            return Err(ManifestError::NoSteps);
        }

        let mut seen_fields = HashSet::new();
        for step in &self.steps {
            let invalid = |reason: String| ManifestError::InvalidStep {
                step: step.id.clone(),
                reason,
            };

            match &step.kind {
                StepKind::Choice { field, options, .. } => {
                    if field.is_numeric() {
                        return Err(invalid(format!("{field} cannot be a choice")));
                    }
                    if options.is_empty() {
                        return Err(invalid("no options".into()));
                    }
                    if !seen_fields.insert(*field) {
                        return Err(invalid(format!("{field} is asked twice")));
                    }
                    for option in options {
                        check_typed_value(*field, &option.value).map_err(&invalid)?;
                    }
                }
                StepKind::Input { fields } => {
                    if fields.is_empty() {
                        return Err(invalid("no fields".into()));
                    }
                    for f in fields {
                        if !f.field.is_numeric() {
                            return Err(invalid(format!("{} is not numeric", f.field)));
                        }
                        if !seen_fields.insert(f.field) {
                            return Err(invalid(format!("{} is asked twice", f.field)));
                        }
                        if !(f.min <= f.default && f.default <= f.max) || f.step <= 0.0 {
                            return Err(invalid(format!("{} has an invalid range", f.field)));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_typed_value(field: Field, value: &str) -> Result<(), String> {
    let parsed = match field {
        Field::WaterType => value.parse::<WaterType>().map(|_| ()),
        Field::TripDuration => value.parse::<TripDuration>().map(|_| ()),
        _ => Ok(()),
    };
    parsed.map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_manifest_loads() {
        let manifest = WizardManifest::embedded().unwrap();
        assert_eq!(manifest.step_count(), 6);
        assert_eq!(manifest.motors.motors().len(), 5);
        assert_eq!(manifest.motors.largest().name, "Green Marine 25.0");
        assert_eq!(manifest.usps.len(), 5);
        assert_eq!(manifest.steps[2].id, "boatSpecs");
        assert!(!manifest.steps[2].is_choice());
    }

    #[test]
    fn unknown_trip_bucket_fails_validation() {
        let raw = r#"
name: broken
steps:
  - id: tripDuration
    title: t
    subtitle: s
    type: choice
    field: tripDuration
    options:
      - { value: "1-2", label: kort }
motors:
  - { name: M, power: 1, maxWeight: 1, minLength: 1, maxLength: 2 }
"#;
        let err = WizardManifest::from_yaml(raw).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::InvalidStep { ref step, .. } if step == "tripDuration"
        ));
    }

    #[test]
    fn empty_catalog_fails_parse() {
        let raw = "name: x\nsteps: []\nmotors: []\n";
        assert!(matches!(
            WizardManifest::from_yaml(raw),
            Err(ManifestError::Yaml(_))
        ));
    }

    #[test]
    fn default_outside_range_is_rejected() {
        let raw = r#"
name: broken
steps:
  - id: specs
    title: t
    subtitle: s
    type: input
    fields:
      - { id: boatLength, label: L, unit: m, min: 3, max: 20, step: 0.5, default: 25 }
motors:
  - { name: M, power: 1, maxWeight: 1, minLength: 1, maxLength: 2 }
"#;
        assert!(matches!(
            WizardManifest::from_yaml(raw),
            Err(ManifestError::InvalidStep { .. })
        ));
    }
}
