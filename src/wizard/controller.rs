//! Wizard controller: the registration state machine
//!
//! All state changes go through [`WizardController::transition`]. The
//! higher-level operations (`advance`, `retreat`, `submit_step`,
//! `finalize`) are thin compositions of events, so the machine can be
//! exercised without any rendering layer.
//!
//! Invariants:
//! - `1 <= current_step() <= step_count()`
//! - a draft slot is filled only with a slice that passed its step schema
//! - at most one submission is in flight (the busy flag)

use serde_json::Value;

use crate::client::{SubmissionClient, SubmissionReceipt};
use crate::core::{Portal, StepKey};
use crate::schema::{FieldError, StepErrors, StepValidator};
use crate::wizard::draft::WizardDraft;
use crate::wizard::flow::{Flow, WizardError};
use crate::wizard::payload::SubmissionPayload;

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    /// Store an already-validated slice for `step` and move forward
    Advance { step: usize, slice: Value },
    /// Go back one step
    Retreat,
    /// Mark a submission as in flight
    BeginSubmit,
    /// The in-flight submission was accepted
    SubmitSucceeded,
    /// The in-flight submission failed
    SubmitFailed { message: String },
}

/// Why an event left the state untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// `Advance` named a step other than the current one
    StaleStep { current: usize, requested: usize },
    /// A submission is in flight
    Busy,
    /// `Retreat` at the first step
    AtFirstStep,
    /// A submit result arrived with nothing in flight
    NotSubmitting,
}

/// Result of one transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied { from: usize, to: usize },
    Ignored(Ignored),
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A user-visible message raised by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Where the user goes after a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextRoute {
    /// The external verification (OTP) flow
    Verification { portal: Portal, email: Option<String> },
}

/// Outcome of [`WizardController::finalize`]
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeOutcome {
    /// A submission is already in flight; nothing happened
    Busy,
    /// A stored slice no longer validates; the wizard moved to that step
    Redirected {
        step: usize,
        key: StepKey,
        errors: StepErrors,
    },
    /// The backend accepted the registration and the draft was discarded
    Submitted {
        receipt: SubmissionReceipt,
        next: NextRoute,
    },
    /// Submission failed; the draft is intact and finalize may be retried
    Failed { message: String },
}

/// Drives one registration wizard instance
pub struct WizardController<V: StepValidator> {
    flow: Flow,
    validator: V,
    current: usize,
    draft: WizardDraft,
    busy: bool,
    notifications: Vec<Notification>,
}

impl<V: StepValidator> WizardController<V> {
    /// Start a wizard at step 1 with an empty draft
    pub fn new(portal: Portal, validator: V) -> Result<Self, WizardError> {
        Ok(Self::with_flow(Flow::for_portal(portal)?, validator))
    }

    pub fn with_flow(flow: Flow, validator: V) -> Self {
        let draft = WizardDraft::new(flow.len());
        tracing::debug!(draft_id = %draft.id(), portal = %flow.portal(), "wizard started");
        Self {
            flow,
            validator,
            current: 1,
            draft,
            busy: false,
            notifications: Vec::new(),
        }
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn current_key(&self) -> StepKey {
        // current is kept within 1..=len and flows are never empty
        self.flow.steps()[self.current - 1].key
    }

    pub fn step_count(&self) -> usize {
        self.flow.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.current == self.flow.len()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn draft(&self) -> &WizardDraft {
        &self.draft
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Mutable access to the rules, e.g. to load a revised schema
    pub fn validator_mut(&mut self) -> &mut V {
        &mut self.validator
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// The single transition function
    pub fn transition(&mut self, event: WizardEvent) -> Transition {
        let from = self.current;
        let result = match event {
            WizardEvent::Advance { step, slice } => {
                if self.busy {
                    Transition::Ignored(Ignored::Busy)
                } else if step != self.current {
                    Transition::Ignored(Ignored::StaleStep {
                        current: self.current,
                        requested: step,
                    })
                } else {
                    self.draft.set(step, slice);
                    self.current = (step + 1).min(self.flow.len());
                    Transition::Applied { from, to: self.current }
                }
            }
            WizardEvent::Retreat => {
                if self.busy {
                    Transition::Ignored(Ignored::Busy)
                } else if self.current <= 1 {
                    Transition::Ignored(Ignored::AtFirstStep)
                } else {
                    self.current -= 1;
                    Transition::Applied { from, to: self.current }
                }
            }
            WizardEvent::BeginSubmit => {
                if self.busy {
                    Transition::Ignored(Ignored::Busy)
                } else {
                    self.busy = true;
                    Transition::Applied { from, to: from }
                }
            }
            WizardEvent::SubmitSucceeded => {
                if !self.busy {
                    Transition::Ignored(Ignored::NotSubmitting)
                } else {
                    self.busy = false;
                    self.draft = WizardDraft::new(self.flow.len());
                    self.current = 1;
                    Transition::Applied { from, to: 1 }
                }
            }
            WizardEvent::SubmitFailed { message } => {
                if !self.busy {
                    Transition::Ignored(Ignored::NotSubmitting)
                } else {
                    self.busy = false;
                    self.notify(NotificationLevel::Error, message);
                    Transition::Applied { from, to: from }
                }
            }
        };

        tracing::debug!(draft_id = %self.draft.id(), ?result, "wizard transition");
        result
    }

    /// Record a validated slice for the current step and move on
    ///
    /// A stale `step` (anything but the current one) is a no-op.
    pub fn advance(&mut self, step: usize, validated_slice: Value) -> Transition {
        self.transition(WizardEvent::Advance {
            step,
            slice: validated_slice,
        })
    }

    pub fn retreat(&mut self) -> Transition {
        self.transition(WizardEvent::Retreat)
    }

    /// Validate raw step input and advance on success
    ///
    /// Field errors are returned to the caller and never change the
    /// controller. Calls for a stale step, or while busy, are ignored
    /// without validating.
    pub fn submit_step(&mut self, step: usize, raw: Value) -> Result<Transition, StepErrors> {
        if self.busy {
            return Ok(Transition::Ignored(Ignored::Busy));
        }
        if step != self.current {
            return Ok(Transition::Ignored(Ignored::StaleStep {
                current: self.current,
                requested: step,
            }));
        }
        let key = self.current_key();
        let validated = self.validator.validate_slice(self.flow.portal(), key, &raw)?;
        Ok(self.advance(step, validated))
    }

    /// Re-check every slice, then submit the flattened draft
    pub fn finalize<C: SubmissionClient + ?Sized>(&mut self, client: &mut C) -> FinalizeOutcome {
        if self.busy {
            return FinalizeOutcome::Busy;
        }

        if let Some((step, key, errors)) = self.first_invalid_step() {
            tracing::info!(
                draft_id = %self.draft.id(),
                %key,
                step,
                errors = errors.errors.len(),
                "finalize redirected to invalid step"
            );
            self.current = step;
            self.notify(
                NotificationLevel::Error,
                format!(
                    "Please review step {} ({}): {}",
                    step,
                    self.flow.steps()[step - 1].title,
                    errors
                        .errors
                        .first()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "invalid input".to_string())
                ),
            );
            return FinalizeOutcome::Redirected { step, key, errors };
        }

        let payload = match SubmissionPayload::assemble(&self.flow, &self.draft) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(draft_id = %self.draft.id(), "payload assembly failed: {}", e);
                let message = e.to_string();
                self.notify(NotificationLevel::Error, message.clone());
                return FinalizeOutcome::Failed { message };
            }
        };

        if !self.transition(WizardEvent::BeginSubmit).is_applied() {
            return FinalizeOutcome::Busy;
        }

        let email = self
            .draft
            .find_field("email")
            .and_then(|v| v.as_str())
            .map(String::from);

        tracing::info!(draft_id = %self.draft.id(), parts = payload.len(), "submitting registration");
        match client.submit(&payload) {
            Ok(receipt) => {
                drop(payload);
                self.transition(WizardEvent::SubmitSucceeded);
                self.notify(
                    NotificationLevel::Success,
                    receipt
                        .message
                        .clone()
                        .unwrap_or_else(|| "Registration submitted".to_string()),
                );
                FinalizeOutcome::Submitted {
                    receipt,
                    next: NextRoute::Verification {
                        portal: self.flow.portal(),
                        email,
                    },
                }
            }
            Err(e) => {
                tracing::warn!(draft_id = %self.draft.id(), "submission failed: {}", e);
                self.transition(WizardEvent::SubmitFailed {
                    message: e.message.clone(),
                });
                FinalizeOutcome::Failed { message: e.message }
            }
        }
    }

    /// First step (in order) whose slice is missing or fails its schema now
    fn first_invalid_step(&self) -> Option<(usize, StepKey, StepErrors)> {
        let portal = self.flow.portal();
        for (i, def) in self.flow.steps().iter().enumerate() {
            let index = i + 1;
            let result = match self.draft.get(index) {
                Some(slice) => self.validator.validate_slice(portal, def.key, slice).err(),
                None => Some(StepErrors::new(
                    portal,
                    def.key,
                    vec![FieldError {
                        path: String::new(),
                        message: "This step has not been completed".to_string(),
                        hint: "step missing".to_string(),
                        help: None,
                    }],
                )),
            };
            if let Some(errors) = result {
                return Some((index, def.key, errors));
            }
        }
        None
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.notifications.push(Notification {
            level,
            message: message.into(),
        });
    }
}
