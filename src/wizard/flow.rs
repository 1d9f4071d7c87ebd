//! Registration flows: the fixed step order of each portal

use thiserror::Error;

use crate::core::{Portal, StepKey};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("the {0} portal has no registration wizard")]
    NoRegistration(Portal),
}

/// One page of a registration wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDef {
    pub key: StepKey,
    pub title: &'static str,
    /// Fields holding local document paths, sent as file parts
    pub file_fields: &'static [&'static str],
}

const DOCTOR_STEPS: &[StepDef] = &[
    StepDef {
        key: StepKey::Personal,
        title: "Personal information",
        file_fields: &[],
    },
    StepDef {
        key: StepKey::Professional,
        title: "Professional information",
        file_fields: &[],
    },
    StepDef {
        key: StepKey::Documents,
        title: "Credential documents",
        file_fields: &["medical_license", "national_id", "profile_photo"],
    },
    StepDef {
        key: StepKey::Consent,
        title: "Terms and consent",
        file_fields: &[],
    },
];

const USER_STEPS: &[StepDef] = &[
    StepDef {
        key: StepKey::Account,
        title: "Account",
        file_fields: &[],
    },
    StepDef {
        key: StepKey::Personal,
        title: "Personal information",
        file_fields: &[],
    },
    StepDef {
        key: StepKey::Consent,
        title: "Terms and consent",
        file_fields: &[],
    },
];

/// Ordered, mandatory steps of one portal's sign-up
///
/// Positions are 1-based to match what users see ("step 2 of 4").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flow {
    portal: Portal,
    steps: &'static [StepDef],
}

impl Flow {
    pub fn for_portal(portal: Portal) -> Result<Self, WizardError> {
        let steps = match portal {
            Portal::Doctor => DOCTOR_STEPS,
            Portal::User => USER_STEPS,
            Portal::Admin => return Err(WizardError::NoRegistration(portal)),
        };
        Ok(Self { portal, steps })
    }

    pub fn portal(&self) -> Portal {
        self.portal
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &'static [StepDef] {
        self.steps
    }

    /// Step definition at a 1-based position
    pub fn step(&self, index: usize) -> Option<&'static StepDef> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// 1-based position of a step key
    pub fn index_of(&self, key: StepKey) -> Option<usize> {
        self.steps.iter().position(|s| s.key == key).map(|i| i + 1)
    }
}
