//! Document-free view models for each wizard screen.
//!
//! Everything a renderer needs is computed here, so the wizard can be
//! exercised without markup.

use serde::Serialize;

use crate::form::{ContactDetails, Field, FormData};
use crate::product::{StepDefinition, StepKind};
use crate::wizard::{SubmissionPhase, Wizard, WizardState};

mod copy {
    pub const NEXT: &str = "Volgende";

    pub const RESULTS_TITLE: &str = "Uw aanbeveling";
    pub const RESULTS_SUBTITLE: &str = "Op basis van uw bootgegevens";
    pub const MOTOR_LABEL: &str = "Aanbevolen motor";
    pub const BATTERY_LABEL: &str = "Accu capaciteit";
    pub const SPEED_LABEL: &str = "Kruissnelheid";
    pub const TIME_LABEL: &str = "Vaartijd";
    pub const QUOTE_CTA: &str = "Vraag een offerte aan";

    pub const CONTACT_TITLE: &str = "Uw gegevens";
    pub const CONTACT_SUBTITLE: &str = "Wij nemen binnen 24 uur contact met u op";
    pub const CONTACT_SUBMIT: &str = "Verstuur aanvraag";
    pub const CONTACT_FAILED: &str =
        "Er ging iets mis bij het versturen. Uw gegevens zijn bewaard, probeer het opnieuw.";

    pub const THANKS_TITLE: &str = "Bedankt!";
    pub const THANKS_SUBTITLE: &str = "We nemen binnen 24 uur contact met u op.";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum ViewModel {
    Step(StepView),
    Results(ResultsView),
    Contact(ContactView),
    Submitted(SubmittedView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub label: String, // "Stap 2 van 6"
    pub percent: u32,
    pub fill: f64,
}

impl Progress {
    pub fn new(index: usize, total: usize) -> Self {
        let fill = (index + 1) as f64 / total.max(1) as f64 * 100.0;
        Self {
            label: format!("Stap {} van {}", index + 1, total),
            percent: fill.round() as u32,
            fill,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GridLayout {
    OneCol,
    TwoCol,
}

impl GridLayout {
    fn for_step(has_icons: bool, option_count: usize) -> Self {
        if has_icons || option_count > 3 {
            GridLayout::TwoCol
        } else {
            GridLayout::OneCol
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            GridLayout::OneCol => "gmm-options-grid--one-col",
            GridLayout::TwoCol => "gmm-options-grid--two-col",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub icon: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderView {
    pub field: Field,
    pub label: String,
    pub unit: String,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
    pub fill_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StepBody {
    Choice {
        field: Field,
        layout: GridLayout,
        options: Vec<OptionView>,
    },
    Input {
        sliders: Vec<SliderView>,
        submit_label: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub id: String,
    pub index: usize,
    pub total: usize,
    pub progress: Progress,
    pub title: String,
    pub subtitle: String,
    pub can_go_back: bool,
    pub body: StepBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub motor_label: &'static str,
    pub motor_name: String,
    pub motor_power: f64,
    pub battery_label: &'static str,
    pub battery_capacity: u32,
    pub speed_label: &'static str,
    pub cruising_speed: String,
    pub time_label: &'static str,
    pub cruising_time: u32,
    pub usps: Vec<String>,
    pub cta_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactFieldView {
    pub id: &'static str,
    pub label: &'static str,
    pub input_type: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub fields: Vec<ContactFieldView>,
    pub submit_label: &'static str,
    pub sending: bool,
    pub notice: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedView {
    pub title: &'static str,
    pub subtitle: &'static str,
}

impl ViewModel {
    pub fn of(wizard: &Wizard) -> Self {
        match wizard.state() {
            WizardState::Step(_) => match wizard.current_step() {
                Some((index, step)) => ViewModel::Step(step_view(
                    step,
                    index,
                    wizard.manifest().step_count(),
                    wizard.form(),
                )),
                // Index is kept in range by the wizard.
                None => ViewModel::Results(results_view(wizard)),
            },
            WizardState::Results => ViewModel::Results(results_view(wizard)),
            WizardState::Contact { .. } => {
                ViewModel::Contact(contact_view(&wizard.form().contact, wizard.submission_phase()))
            }
            WizardState::Submitted => ViewModel::Submitted(SubmittedView {
                title: copy::THANKS_TITLE,
                subtitle: copy::THANKS_SUBTITLE,
            }),
        }
    }

    pub fn shows_progress(&self) -> bool {
        matches!(self, ViewModel::Step(_))
    }

    pub fn can_go_back(&self) -> bool {
        match self {
            ViewModel::Step(step) => step.can_go_back,
            ViewModel::Results(_) => true,
            ViewModel::Contact(contact) => !contact.sending,
            ViewModel::Submitted(_) => false,
        }
    }
}

fn step_view(step: &StepDefinition, index: usize, total: usize, form: &FormData) -> StepView {
    let body = match &step.kind {
        StepKind::Choice {
            field,
            options,
            has_icons,
        } => {
            let current = form.choice(*field);
            StepBody::Choice {
                field: *field,
                layout: GridLayout::for_step(*has_icons, options.len()),
                options: options
                    .iter()
                    .map(|o| OptionView {
                        value: o.value.clone(),
                        label: o.label.clone(),
                        icon: if *has_icons { o.icon.clone() } else { None },
                        selected: current == Some(o.value.as_str()),
                    })
                    .collect(),
            }
        }
        StepKind::Input { fields } => StepBody::Input {
            sliders: fields
                .iter()
                .map(|f| {
                    let value = form.number(f.field).unwrap_or(f.default);
                    SliderView {
                        field: f.field,
                        label: f.label.clone(),
                        unit: f.unit.clone(),
                        min: f.min,
                        max: f.max,
                        step: f.step,
                        value,
                        fill_percent: f.fill_percent(value),
                    }
                })
                .collect(),
            submit_label: copy::NEXT,
        },
    };

    StepView {
        id: step.id.clone(),
        index,
        total,
        progress: Progress::new(index, total),
        title: step.title.clone(),
        subtitle: step.subtitle.clone(),
        can_go_back: index > 0,
        body,
    }
}

fn results_view(wizard: &Wizard) -> ResultsView {
    let rec = wizard.recommendation();
    ResultsView {
        title: copy::RESULTS_TITLE,
        subtitle: copy::RESULTS_SUBTITLE,
        motor_label: copy::MOTOR_LABEL,
        motor_name: rec.motor.name.clone(),
        motor_power: rec.motor.power,
        battery_label: copy::BATTERY_LABEL,
        battery_capacity: rec.battery_capacity,
        speed_label: copy::SPEED_LABEL,
        cruising_speed: rec.cruising_speed_label(),
        time_label: copy::TIME_LABEL,
        cruising_time: rec.estimated_cruising_time,
        usps: wizard.manifest().usps.clone(),
        cta_label: copy::QUOTE_CTA,
    }
}

fn contact_view(contact: &ContactDetails, phase: &SubmissionPhase) -> ContactView {
    let field = |id, label, input_type, placeholder, required, value: &str| ContactFieldView {
        id,
        label,
        input_type,
        placeholder,
        required,
        value: value.to_string(),
    };

    ContactView {
        title: copy::CONTACT_TITLE,
        subtitle: copy::CONTACT_SUBTITLE,
        fields: vec![
            field("firstName", "Voornaam", "text", "Uw voornaam", true, &contact.first_name),
            field("lastName", "Achternaam", "text", "Uw achternaam", true, &contact.last_name),
            field("email", "E-mail", "email", "uw@email.nl", true, &contact.email),
            field("phone", "Telefoon", "tel", "06 12345678", false, &contact.phone),
        ],
        submit_label: copy::CONTACT_SUBMIT,
        sending: *phase == SubmissionPhase::InFlight,
        notice: match phase {
            SubmissionPhase::Failed(_) => Some(copy::CONTACT_FAILED),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::WizardManifest;
    use std::sync::Arc;

    fn wizard() -> Wizard {
        Wizard::new(Arc::new(WizardManifest::embedded().unwrap()))
    }

    #[test]
    fn first_step_progress_and_layout() {
        let ViewModel::Step(view) = wizard().view() else {
            panic!("expected step view");
        };
        assert_eq!(view.progress.label, "Stap 1 van 6");
        assert_eq!(view.progress.percent, 17);
        assert!(!view.can_go_back);
        let StepBody::Choice { layout, options, .. } = view.body else {
            panic!("expected choice body");
        };
        assert_eq!(layout, GridLayout::OneCol);
        assert!(options.iter().all(|o| !o.selected));
    }

    #[test]
    fn icon_step_uses_two_columns_and_marks_selection() {
        let mut wizard = wizard();
        wizard.advance().unwrap();
        wizard.select_option("werkboot").unwrap();
        let ViewModel::Step(view) = wizard.view() else {
            panic!("expected step view");
        };
        let StepBody::Choice { layout, options, .. } = view.body else {
            panic!("expected choice body");
        };
        assert_eq!(layout, GridLayout::TwoCol);
        let selected: Vec<_> = options.iter().filter(|o| o.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].icon.as_deref(), Some("werkboot.svg"));
    }

    #[test]
    fn sliders_show_current_values() {
        let mut wizard = wizard();
        wizard.advance().unwrap();
        wizard.advance().unwrap();
        wizard.set_number(Field::BoatLength, 11.5).unwrap();
        let ViewModel::Step(view) = wizard.view() else {
            panic!("expected step view");
        };
        let StepBody::Input { sliders, submit_label } = view.body else {
            panic!("expected input body");
        };
        assert_eq!(submit_label, "Volgende");
        assert_eq!(sliders[0].value, 11.5);
        assert_eq!(sliders[0].fill_percent, 50.0);
        assert_eq!(sliders[1].value, 2000.0);
    }

    #[test]
    fn results_hide_progress_and_reflect_edits() {
        let mut wizard = wizard();
        for _ in 0..6 {
            wizard.advance().unwrap();
        }
        let view = wizard.view();
        assert!(!view.shows_progress());
        let ViewModel::Results(first) = view else {
            panic!("expected results");
        };
        assert_eq!(first.motor_name, "Green Marine 10.0");
        assert_eq!(first.usps.len(), 5);

        // Revisit the specs step with a heavier boat.
        for _ in 0..4 {
            wizard.back().unwrap();
        }
        wizard.set_number(Field::BoatWeight, 4500.0).unwrap();
        for _ in 0..4 {
            wizard.advance().unwrap();
        }
        let ViewModel::Results(second) = wizard.view() else {
            panic!("expected results");
        };
        assert_eq!(second.motor_name, "Green Marine 15.0");
    }

    #[test]
    fn progress_rounds_percent() {
        let progress = Progress::new(5, 6);
        assert_eq!(progress.percent, 100);
        assert_eq!(Progress::new(1, 6).percent, 33);
    }
}
