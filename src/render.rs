//! HTML fragments for the embedding page, rendered with askama.
//!
//! Class names and element ids are what the host stylesheet and event
//! wiring expect: `.gmm-progress-*`, `.gmm-content`, `.gmm-button-back`.

use askama::Template;

use crate::form::Field;
use crate::view::{
    ContactView, GridLayout, OptionView, Progress, ResultsView, SliderView, StepBody, StepView,
    SubmittedView, ViewModel,
};

#[derive(Template)]
#[template(path = "document.html")]
struct DocumentTemplate {
    progress: String,
    content: String,
    can_go_back: bool,
}

#[derive(Template)]
#[template(path = "fragments/progress.html")]
struct ProgressTemplate<'a> {
    progress: Option<&'a Progress>,
}

#[derive(Template)]
#[template(path = "fragments/choice_step.html")]
struct ChoiceStepTemplate<'a> {
    step: &'a StepView,
    field: Field,
    layout: GridLayout,
    options: &'a [OptionView],
}

#[derive(Template)]
#[template(path = "fragments/input_step.html")]
struct InputStepTemplate<'a> {
    step: &'a StepView,
    sliders: &'a [SliderView],
    submit_label: &'a str,
}

#[derive(Template)]
#[template(path = "fragments/results.html")]
struct ResultsTemplate<'a> {
    results: &'a ResultsView,
}

#[derive(Template)]
#[template(path = "fragments/contact.html")]
struct ContactTemplate<'a> {
    contact: &'a ContactView,
}

#[derive(Template)]
#[template(path = "fragments/submitted.html")]
struct SubmittedTemplate<'a> {
    done: &'a SubmittedView,
}

/// Progress bar, content area and back button.
pub fn document(view: &ViewModel) -> askama::Result<String> {
    DocumentTemplate {
        progress: progress(view)?,
        content: content(view)?,
        can_go_back: view.can_go_back(),
    }
    .render()
}

/// Outside the questionnaire the bar is an empty, hidden container.
pub fn progress(view: &ViewModel) -> askama::Result<String> {
    let progress = match view {
        ViewModel::Step(step) => Some(&step.progress),
        _ => None,
    };
    ProgressTemplate { progress }.render()
}

pub fn content(view: &ViewModel) -> askama::Result<String> {
    match view {
        ViewModel::Step(step) => match &step.body {
            StepBody::Choice {
                field,
                layout,
                options,
            } => ChoiceStepTemplate {
                step,
                field: *field,
                layout: *layout,
                options,
            }
            .render(),
            StepBody::Input {
                sliders,
                submit_label,
            } => InputStepTemplate {
                step,
                sliders,
                submit_label,
            }
            .render(),
        },
        ViewModel::Results(results) => ResultsTemplate { results }.render(),
        ViewModel::Contact(contact) => ContactTemplate { contact }.render(),
        ViewModel::Submitted(done) => SubmittedTemplate { done }.render(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::ContactDetails;
    use crate::manifest::WizardManifest;
    use crate::wizard::Wizard;
    use chrono::Utc;
    use std::sync::Arc;

    fn wizard() -> Wizard {
        Wizard::new(Arc::new(WizardManifest::embedded().unwrap()))
    }

    fn to_results(wizard: &mut Wizard) {
        for _ in 0..6 {
            wizard.advance().unwrap();
        }
    }

    #[test]
    fn step_fragment_has_progress_and_option_buttons() {
        let html = document(&wizard().view()).unwrap();
        assert!(html.contains("Stap 1 van 6"));
        assert!(html.contains("gmm-options-grid--one-col"));
        assert!(html.contains("data-field=\"customerType\" data-value=\"particulier\""));
        assert!(html.contains("class=\"gmm-button-back\" disabled"));
    }

    #[test]
    fn icon_options_render_images_and_selection() {
        let mut wizard = wizard();
        wizard.advance().unwrap();
        wizard.select_option("werkboot").unwrap();
        let html = content(&wizard.view()).unwrap();
        assert!(html.contains("gmm-options-grid--two-col"));
        assert!(html.contains("<img src=\"werkboot.svg\""));
        assert!(html.contains("gmm-option-button--selected"));
    }

    #[test]
    fn slider_step_renders_range_inputs() {
        let mut wizard = wizard();
        wizard.advance().unwrap();
        wizard.advance().unwrap();
        let html = content(&wizard.view()).unwrap();
        assert!(html.contains("id=\"boatLength\" min=\"3\" max=\"20\" step=\"0.5\" value=\"6\""));
        assert!(html.contains("id=\"specs-submit\""));
        assert!(html.contains("Lengte waterlijn (LWL)"));
    }

    #[test]
    fn results_hide_progress_bar() {
        let mut wizard = wizard();
        to_results(&mut wizard);
        let html = document(&wizard.view()).unwrap();
        assert!(html.contains("<div class=\"gmm-progress-container gmm-hidden\"></div>"));
        assert!(!html.contains("Stap "));
        assert!(!html.contains("gmm-progress-fill"));
        assert!(html.contains("Green Marine 10.0"));
        assert!(html.contains("<li class=\"gmm-usp-item\">"));
    }

    #[test]
    fn contact_failure_notice_and_prefill_are_escaped() {
        let mut wizard = wizard();
        to_results(&mut wizard);
        wizard.show_contact().unwrap();
        let contact = ContactDetails {
            first_name: "<Jan>".into(),
            last_name: "\"Smit\"".into(),
            email: "jan@smit.nl".into(),
            phone: String::new(),
        };
        wizard.begin_submission(&contact, Utc::now()).unwrap();
        wizard.finish_submission(Err("down".into())).unwrap();

        let html = content(&wizard.view()).unwrap();
        assert!(html.contains("gmm-form-error"));
        assert!(html.contains("value=\"&lt;Jan&gt;\""));
        assert!(!html.contains("value=\"\"Smit\"\""));
        assert!(
            html.contains("id=\"phone\" name=\"phone\" placeholder=\"06 12345678\" value=\"\" />")
        );
    }

    #[test]
    fn submitted_fragment_thanks_the_visitor() {
        let mut wizard = wizard();
        to_results(&mut wizard);
        wizard.show_contact().unwrap();
        let contact = ContactDetails {
            first_name: "Jan".into(),
            last_name: "Smit".into(),
            email: "jan@smit.nl".into(),
            phone: String::new(),
        };
        wizard.begin_submission(&contact, Utc::now()).unwrap();
        wizard.finish_submission(Ok(())).unwrap();

        let html = document(&wizard.view()).unwrap();
        assert!(html.contains("Bedankt!"));
        assert!(html.contains("class=\"gmm-button-back\" disabled"));
    }
}
