//! Registration wizard - flows, draft, payload and the state machine

pub mod controller;
pub mod draft;
pub mod flow;
pub mod payload;

pub use controller::{
    FinalizeOutcome, Ignored, NextRoute, Notification, NotificationLevel, Transition, WizardController,
    WizardEvent,
};
pub use draft::WizardDraft;
pub use flow::{Flow, StepDef, WizardError};
pub use payload::{PayloadError, PayloadPart, SubmissionPayload};
