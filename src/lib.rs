pub mod config;
pub mod engine;
pub mod form;
pub mod guard;
pub mod manifest;
pub mod product;
pub mod render;
pub mod server;
pub mod sink;
pub mod submission;
pub mod view;
pub mod wizard;

pub use config::{ConfigError, WizardConfig};
pub use engine::{Recommendation, recommend};
pub use form::{ContactDetails, Field, FormData, TripDuration, WaterType};
pub use guard::ContactGuard;
pub use manifest::{ManifestError, WizardManifest};
pub use product::{Motor, MotorCatalog, StepDefinition, StepKind};
pub use server::{AppState, create_router};
pub use sink::{LogSink, SinkError, SubmissionSink, WebhookSink};
pub use submission::SubmissionRecord;
pub use view::ViewModel;
pub use wizard::{AdvanceToken, PendingAdvance, Wizard, WizardError, WizardEvent, WizardState};
