//! Numeric code to display label tables
//!
//! The backend reports enumerations as small integers. Each one is a closed
//! enum here with an exhaustive code/label mapping, so an unknown code is an
//! explicit `None` rather than an undefined display value.

use serde::Serialize;

macro_rules! label_table {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn from_code(code: u8) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn code(&self) -> u8 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn all() -> &'static [$name] {
                &[$($name::$variant),+]
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.label())
            }
        }
    };
}

label_table! {
    /// Medical specialization of a doctor
    Specialization {
        Cardiology = 1 => "Cardiology",
        Dermatology = 2 => "Dermatology",
        Neurology = 3 => "Neurology",
        Pediatrics = 4 => "Pediatrics",
        Psychiatry = 5 => "Psychiatry",
        Orthopedics = 6 => "Orthopedics",
        Gynecology = 7 => "Gynecology",
        Ophthalmology = 8 => "Ophthalmology",
        Dentistry = 9 => "Dentistry",
        Otolaryngology = 10 => "Ear, Nose & Throat",
        GeneralPractice = 11 => "General Practice",
        InternalMedicine = 12 => "Internal Medicine",
    }
}

label_table! {
    Gender {
        Male = 1 => "Male",
        Female = 2 => "Female",
    }
}

label_table! {
    /// Admin-controlled account state for users and doctors
    AccountStatus {
        Active = 1 => "Active",
        Suspended = 2 => "Suspended",
        Banned = 3 => "Banned",
    }
}

label_table! {
    AppointmentStatus {
        Pending = 1 => "Pending",
        Approved = 2 => "Approved",
        Completed = 3 => "Completed",
        Cancelled = 4 => "Cancelled",
    }
}

label_table! {
    ComplaintStatus {
        Open = 1 => "Open",
        InReview = 2 => "In Review",
        Resolved = 3 => "Resolved",
    }
}

/// Display text used when a code has no entry
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Selector over all label tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LabelKind {
    Specialization,
    Gender,
    AccountStatus,
    AppointmentStatus,
    ComplaintStatus,
}

impl LabelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelKind::Specialization => "specialization",
            LabelKind::Gender => "gender",
            LabelKind::AccountStatus => "account-status",
            LabelKind::AppointmentStatus => "appointment-status",
            LabelKind::ComplaintStatus => "complaint-status",
        }
    }

    /// Look up a table by the name used in step schemas (`x-labels`)
    pub fn from_name(name: &str) -> Option<Self> {
        [
            LabelKind::Specialization,
            LabelKind::Gender,
            LabelKind::AccountStatus,
            LabelKind::AppointmentStatus,
            LabelKind::ComplaintStatus,
        ]
        .into_iter()
        .find(|k| k.as_str() == name)
    }

    /// Every (code, label) pair of the table, in code order
    pub fn entries(&self) -> Vec<(u8, &'static str)> {
        fn pairs<T: Copy>(all: &[T], code: fn(&T) -> u8, label: fn(&T) -> &'static str) -> Vec<(u8, &'static str)> {
            all.iter().map(|v| (code(v), label(v))).collect()
        }
        match self {
            LabelKind::Specialization => pairs(Specialization::all(), Specialization::code, Specialization::label),
            LabelKind::Gender => pairs(Gender::all(), Gender::code, Gender::label),
            LabelKind::AccountStatus => pairs(AccountStatus::all(), AccountStatus::code, AccountStatus::label),
            LabelKind::AppointmentStatus => {
                pairs(AppointmentStatus::all(), AppointmentStatus::code, AppointmentStatus::label)
            }
            LabelKind::ComplaintStatus => {
                pairs(ComplaintStatus::all(), ComplaintStatus::code, ComplaintStatus::label)
            }
        }
    }
}

/// Resolve a code within a table, `None` when the code is not defined
pub fn label_for_code(kind: LabelKind, code: u8) -> Option<&'static str> {
    match kind {
        LabelKind::Specialization => Specialization::from_code(code).map(|v| v.label()),
        LabelKind::Gender => Gender::from_code(code).map(|v| v.label()),
        LabelKind::AccountStatus => AccountStatus::from_code(code).map(|v| v.label()),
        LabelKind::AppointmentStatus => AppointmentStatus::from_code(code).map(|v| v.label()),
        LabelKind::ComplaintStatus => ComplaintStatus::from_code(code).map(|v| v.label()),
    }
}

/// Like [`label_for_code`] but always yields printable text
pub fn display_label(kind: LabelKind, code: u8) -> &'static str {
    label_for_code(kind, code).unwrap_or(UNKNOWN_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specialization_codes_roundtrip() {
        for s in Specialization::all() {
            assert_eq!(Specialization::from_code(s.code()), Some(*s));
        }
        assert_eq!(Specialization::all().len(), 12);
    }

    #[test]
    fn test_unknown_code_is_none() {
        assert_eq!(Specialization::from_code(0), None);
        assert_eq!(Specialization::from_code(13), None);
        assert_eq!(label_for_code(LabelKind::Gender, 3), None);
        assert_eq!(display_label(LabelKind::Gender, 3), "Unknown");
    }

    #[test]
    fn test_label_lookup() {
        assert_eq!(label_for_code(LabelKind::AccountStatus, 3), Some("Banned"));
        assert_eq!(label_for_code(LabelKind::ComplaintStatus, 2), Some("In Review"));
        assert_eq!(Specialization::Otolaryngology.to_string(), "Ear, Nose & Throat");
    }

    #[test]
    fn test_entries_are_in_code_order() {
        let entries = LabelKind::AppointmentStatus.entries();
        let codes: Vec<u8> = entries.iter().map(|(c, _)| *c).collect();
        assert_eq!(codes, vec![1, 2, 3, 4]);
        assert_eq!(entries[1].1, "Approved");
    }
}
