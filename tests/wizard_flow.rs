use chrono::Utc;
use green_marine_wizard::{
    ContactDetails, Field, LogSink, SubmissionSink, ViewModel, Wizard, WizardManifest, WizardState,
};
use std::sync::Arc;

fn wizard() -> Wizard {
    Wizard::new(Arc::new(WizardManifest::embedded().expect("embedded manifest")))
}

fn pick(wizard: &mut Wizard, value: &str) {
    let pending = wizard.select_option(value).expect("option on step");
    assert!(wizard.fire_auto_advance(pending.token).expect("fire"));
}

#[test]
fn selecting_particulier_auto_advances_to_step_one() {
    let mut wizard = wizard();
    let pending = wizard.select_option("particulier").unwrap();
    assert_eq!(wizard.state(), &WizardState::Step(0));
    assert!(wizard.fire_auto_advance(pending.token).unwrap());
    assert_eq!(wizard.state(), &WizardState::Step(1));
}

#[tokio::test]
async fn full_questionnaire_to_submitted_record() {
    let mut wizard = wizard();
    pick(&mut wizard, "particulier");
    pick(&mut wizard, "sloep");
    // Specs step keeps its defaults: 6 m, 2000 kg.
    wizard.advance().unwrap();
    pick(&mut wizard, "geen");
    pick(&mut wizard, "kustwater");
    pick(&mut wizard, "4-8");
    assert_eq!(wizard.state(), &WizardState::Results);

    let ViewModel::Results(results) = wizard.view() else {
        panic!("expected results view");
    };
    assert_eq!(results.motor_name, "Green Marine 10.0");
    assert_eq!(results.battery_capacity, 72);
    assert_eq!(results.cruising_time, 10);
    assert_eq!(results.cruising_speed, "7.7");

    wizard.show_contact().unwrap();
    let contact = ContactDetails {
        first_name: "Marieke".into(),
        last_name: "de Boer".into(),
        email: "marieke@deboer.nl".into(),
        phone: "06 98765432".into(),
    };
    let record = wizard.begin_submission(&contact, Utc::now()).unwrap();
    let outcome = LogSink.deliver(&record).await.map_err(|e| e.to_string());
    wizard.finish_submission(outcome).unwrap();
    assert_eq!(wizard.state(), &WizardState::Submitted);

    assert_eq!(record.customer_type, "particulier");
    assert_eq!(record.boat_type, "sloep");
    assert_eq!(record.boat_length, 6.0);
    assert_eq!(record.boat_weight, 2000.0);
    assert_eq!(record.current_drive, "geen");
    assert_eq!(record.water_type, "kustwater");
    assert_eq!(record.trip_duration, "4-8");
    assert_eq!(record.recommended_motor, "Green Marine 10.0");
    assert_eq!(record.recommended_motor_power, 10.0);
    assert_eq!(record.recommended_battery, 72);
    assert_eq!(record.estimated_cruising_time, 10);
    assert_eq!(record.cruising_speed, "7.7");
    assert_eq!(record.source, "calculator");
    assert!(chrono::DateTime::parse_from_rfc3339(&record.submission_date).is_ok());

    let ViewModel::Submitted(done) = wizard.view() else {
        panic!("expected submitted view");
    };
    assert_eq!(done.title, "Bedankt!");
}

#[test]
fn defaults_only_still_recommend_something() {
    let mut wizard = wizard();
    for _ in 0..6 {
        wizard.advance().unwrap();
    }
    let rec = wizard.recommendation();
    assert!(!rec.motor.name.is_empty());
    assert!(rec.battery_capacity > 0);
}

#[test]
fn oversized_boat_falls_back_to_largest_motor() {
    let mut wizard = wizard();
    wizard.advance().unwrap();
    wizard.advance().unwrap();
    wizard.set_number(Field::BoatLength, 4.0).unwrap();
    wizard.set_number(Field::BoatWeight, 10_000.0).unwrap();
    for _ in 0..4 {
        wizard.advance().unwrap();
    }
    assert_eq!(wizard.recommendation().motor.name, "Green Marine 25.0");
}
