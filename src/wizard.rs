//! Linear step state machine driving the calculator.
//!
//! `Step(0) .. Step(N-1) -> Results <-> Contact -> Submitted`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::engine::{self, Recommendation};
use crate::form::{ContactDetails, Field, FormData, FormError};
use crate::guard::{ContactGuard, GuardError};
use crate::manifest::WizardManifest;
use crate::product::{StepDefinition, StepKind};
use crate::submission::SubmissionRecord;
use crate::view::ViewModel;

pub const DEFAULT_AUTO_ADVANCE: Duration = Duration::from_millis(300);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("Cannot {event} from {state}")]
    InvalidTransition {
        event: &'static str,
        state: &'static str,
    },
    #[error("Option '{0}' is not offered on this step")]
    UnknownOption(String),
    #[error("{0} is not asked on this step")]
    FieldNotOnStep(Field),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error("A submission is already in flight")]
    SubmissionInFlight,
    #[error("No submission is in flight")]
    NoSubmissionInFlight,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    Step(usize),
    Results,
    /// Remembers where "back" leads.
    Contact { previous: Box<WizardState> },
    Submitted,
}

impl WizardState {
    pub fn name(&self) -> &'static str {
        match self {
            WizardState::Step(_) => "step",
            WizardState::Results => "results",
            WizardState::Contact { .. } => "contact",
            WizardState::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvanceToken(pub u64);

/// An armed, not yet fired advance after an option was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAdvance {
    pub token: AdvanceToken,
    pub step: usize,
    pub delay_ms: u64,
}

impl PendingAdvance {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPhase {
    Idle,
    InFlight,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WizardEvent {
    SelectOption { value: String },
    SetNumber { field: Field, value: f64 },
    Advance,
    AutoAdvance { token: AdvanceToken },
    Back,
    ShowContact,
}

pub struct Wizard {
    manifest: Arc<WizardManifest>,
    state: WizardState,
    form: FormData,
    pending: Option<PendingAdvance>,
    next_token: u64,
    auto_advance_delay: Duration,
    submission: SubmissionPhase,
    guard: ContactGuard,
}

impl Wizard {
    pub fn new(manifest: Arc<WizardManifest>) -> Self {
        let form = FormData::seeded(&manifest.steps);
        Self {
            manifest,
            state: WizardState::Step(0),
            form,
            pending: None,
            next_token: 1,
            auto_advance_delay: DEFAULT_AUTO_ADVANCE,
            submission: SubmissionPhase::Idle,
            guard: ContactGuard::new(),
        }
    }

    pub fn with_auto_advance_delay(mut self, delay: Duration) -> Self {
        self.auto_advance_delay = delay;
        self
    }

    pub fn manifest(&self) -> &WizardManifest {
        &self.manifest
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn pending_advance(&self) -> Option<PendingAdvance> {
        self.pending
    }

    pub fn submission_phase(&self) -> &SubmissionPhase {
        &self.submission
    }

    pub fn current_step(&self) -> Option<(usize, &StepDefinition)> {
        match self.state {
            WizardState::Step(index) => self.manifest.step(index).map(|s| (index, s)),
            _ => None,
        }
    }

    /// Always computed fresh from the current answers.
    pub fn recommendation(&self) -> Recommendation {
        engine::recommend(&self.form, &self.manifest.motors)
    }

    pub fn view(&self) -> ViewModel {
        ViewModel::of(self)
    }

    /// Reducer-style entry point used by the HTTP layer.
    pub fn apply(&mut self, event: WizardEvent) -> Result<Option<PendingAdvance>, WizardError> {
        match event {
            WizardEvent::SelectOption { value } => self.select_option(&value).map(Some),
            WizardEvent::SetNumber { field, value } => {
                self.set_number(field, value)?;
                Ok(None)
            }
            WizardEvent::Advance => {
                self.advance()?;
                Ok(None)
            }
            WizardEvent::AutoAdvance { token } => {
                self.fire_auto_advance(token)?;
                Ok(None)
            }
            WizardEvent::Back => {
                self.back()?;
                Ok(None)
            }
            WizardEvent::ShowContact => {
                self.show_contact()?;
                Ok(None)
            }
        }
    }

    /// Stores the answer of a choice step and arms the delayed advance.
    pub fn select_option(&mut self, value: &str) -> Result<PendingAdvance, WizardError> {
        let (index, step) = self.step_or("select an option")?;
        let field = match &step.kind {
            StepKind::Choice { field, .. } => *field,
            StepKind::Input { .. } => {
                return Err(self.invalid("select an option"));
            }
        };
        if step.option(value).is_none() {
            return Err(WizardError::UnknownOption(value.to_string()));
        }
        self.form.set_choice(field, value)?;

        let pending = PendingAdvance {
            token: AdvanceToken(self.next_token),
            step: index,
            delay_ms: self.auto_advance_delay.as_millis() as u64,
        };
        self.next_token += 1;
        self.pending = Some(pending);
        tracing::debug!(step = index, %field, value, token = pending.token.0, "Option selected");
        Ok(pending)
    }

    /// Clamps into the field's range; returns the stored value.
    pub fn set_number(&mut self, field: Field, value: f64) -> Result<f64, WizardError> {
        let (_, step) = self.step_or("set a number")?;
        let numeric = step
            .numeric_field(field)
            .ok_or(WizardError::FieldNotOnStep(field))?;
        if !value.is_finite() {
            return Err(FormError::NonFinite(field).into());
        }
        let clamped = numeric.clamp(value);
        self.form.set_number(field, clamped)?;
        Ok(clamped)
    }

    pub fn advance(&mut self) -> Result<(), WizardError> {
        let WizardState::Step(index) = self.state else {
            return Err(self.invalid("advance"));
        };
        self.pending = None;
        if index + 1 < self.manifest.step_count() {
            self.state = WizardState::Step(index + 1);
            tracing::debug!(step = index + 1, "Advanced");
        } else {
            self.state = WizardState::Results;
            tracing::info!("Questionnaire complete, showing results");
        }
        Ok(())
    }

    /// Fires an armed advance. `Ok(false)` when the token is stale.
    pub fn fire_auto_advance(&mut self, token: AdvanceToken) -> Result<bool, WizardError> {
        match self.pending {
            Some(pending)
                if pending.token == token && self.state == WizardState::Step(pending.step) =>
            {
                self.advance()?;
                Ok(true)
            }
            _ => {
                tracing::debug!(token = token.0, "Ignoring stale auto-advance");
                Ok(false)
            }
        }
    }

    pub fn cancel_auto_advance(&mut self) -> Option<PendingAdvance> {
        self.pending.take()
    }

    /// On the first step this changes nothing, an armed advance included.
    pub fn back(&mut self) -> Result<(), WizardError> {
        match self.state.clone() {
            WizardState::Step(0) => return Ok(()),
            WizardState::Step(index) => self.state = WizardState::Step(index - 1),
            WizardState::Results => {
                self.state = WizardState::Step(self.manifest.step_count() - 1);
            }
            WizardState::Contact { previous } => {
                if self.submission == SubmissionPhase::InFlight {
                    return Err(WizardError::SubmissionInFlight);
                }
                self.state = *previous;
                self.submission = SubmissionPhase::Idle;
            }
            WizardState::Submitted => return Err(self.invalid("go back")),
        }
        self.pending = None;
        Ok(())
    }

    pub fn show_contact(&mut self) -> Result<(), WizardError> {
        if self.state != WizardState::Results {
            return Err(self.invalid("show the contact form"));
        }
        self.state = WizardState::Contact {
            previous: Box::new(WizardState::Results),
        };
        Ok(())
    }

    /// First half of a submission: validate, store, build the outbound record.
    ///
    /// The wizard stays in `Contact` until [`Wizard::finish_submission`].
    pub fn begin_submission(
        &mut self,
        contact: &ContactDetails,
        now: DateTime<Utc>,
    ) -> Result<SubmissionRecord, WizardError> {
        if !matches!(self.state, WizardState::Contact { .. }) {
            return Err(self.invalid("submit"));
        }
        if self.submission == SubmissionPhase::InFlight {
            return Err(WizardError::SubmissionInFlight);
        }
        self.form.contact = self.guard.check(contact)?;

        let record = SubmissionRecord::build(&self.form, &self.recommendation(), now);
        self.submission = SubmissionPhase::InFlight;
        Ok(record)
    }

    /// Second half: a failed delivery keeps every answer and shows a notice.
    pub fn finish_submission(&mut self, outcome: Result<(), String>) -> Result<(), WizardError> {
        if self.submission != SubmissionPhase::InFlight {
            return Err(WizardError::NoSubmissionInFlight);
        }
        match outcome {
            Ok(()) => {
                self.submission = SubmissionPhase::Idle;
                self.state = WizardState::Submitted;
                tracing::info!("Submission accepted");
            }
            Err(reason) => {
                tracing::warn!(%reason, "Submission failed");
                self.submission = SubmissionPhase::Failed(reason);
            }
        }
        Ok(())
    }

    fn step_or(&self, event: &'static str) -> Result<(usize, &StepDefinition), WizardError> {
        self.current_step().ok_or_else(|| self.invalid(event))
    }

    fn invalid(&self, event: &'static str) -> WizardError {
        WizardError::InvalidTransition {
            event,
            state: self.state.name(),
        }
    }
}
