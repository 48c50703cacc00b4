use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::Recommendation;
use crate::form::FormData;

pub const SUBMISSION_SOURCE: &str = "calculator";

/// Outbound lead record. Field names are the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    // Customer
    pub customer_type: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    // Boat
    pub boat_type: String,
    pub boat_length: f64,
    pub boat_weight: f64,
    pub current_drive: String,
    pub water_type: String,
    pub trip_duration: String,
    // Recommendation
    pub recommended_motor: String,
    pub recommended_motor_power: f64,
    pub recommended_battery: u32,
    pub estimated_cruising_time: u32,
    pub cruising_speed: String,
    // Metadata
    pub submission_date: String,
    pub source: String,
}

impl SubmissionRecord {
    pub fn build(form: &FormData, rec: &Recommendation, now: DateTime<Utc>) -> Self {
        let text = |v: Option<&str>| v.unwrap_or_default().to_string();

        Self {
            customer_type: text(form.customer_type.as_deref()),
            first_name: form.contact.first_name.clone(),
            last_name: form.contact.last_name.clone(),
            email: form.contact.email.clone(),
            phone: form.contact.phone.clone(),
            boat_type: text(form.boat_type.as_deref()),
            boat_length: form.boat_length,
            boat_weight: form.boat_weight,
            current_drive: text(form.current_drive.as_deref()),
            water_type: text(form.water_type.map(|w| w.as_str())),
            trip_duration: text(form.trip_duration.map(|t| t.as_str())),
            recommended_motor: rec.motor.name.clone(),
            recommended_motor_power: rec.motor.power,
            recommended_battery: rec.battery_capacity,
            estimated_cruising_time: rec.estimated_cruising_time,
            cruising_speed: rec.cruising_speed_label(),
            submission_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            source: SUBMISSION_SOURCE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::recommend;
    use crate::form::{ContactDetails, TripDuration, WaterType};
    use crate::manifest::WizardManifest;
    use chrono::TimeZone;

    #[test]
    fn record_carries_answers_recommendation_and_metadata() {
        let manifest = WizardManifest::embedded().unwrap();
        let mut form = FormData::default();
        form.customer_type = Some("zakelijk".into());
        form.water_type = Some(WaterType::Inland);
        form.trip_duration = Some(TripDuration::Short);
        form.contact = ContactDetails {
            first_name: "Anne".into(),
            last_name: "Bakker".into(),
            email: "anne@werf.nl".into(),
            phone: "0612345678".into(),
        };
        let rec = recommend(&form, &manifest.motors);
        let now = Utc.with_ymd_and_hms(2024, 12, 29, 10, 30, 0).unwrap();

        let record = SubmissionRecord::build(&form, &rec, now);
        assert_eq!(record.submission_date, "2024-12-29T10:30:00.000Z");
        assert_eq!(record.source, "calculator");
        assert_eq!(record.water_type, "binnenwater");
        assert_eq!(record.boat_type, "");
        assert_eq!(record.recommended_motor, rec.motor.name);

        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "customerType",
            "firstName",
            "lastName",
            "email",
            "phone",
            "boatType",
            "boatLength",
            "boatWeight",
            "currentDrive",
            "waterType",
            "tripDuration",
            "recommendedMotor",
            "recommendedMotorPower",
            "recommendedBattery",
            "estimatedCruisingTime",
            "cruisingSpeed",
            "submissionDate",
            "source",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json.as_object().unwrap().len(), 18);
    }
}
