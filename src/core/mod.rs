//! Core module - fundamental types and utilities

pub mod config;
pub mod labels;
pub mod portal;

pub use config::{Config, ConfigError};
pub use labels::{display_label, label_for_code, LabelKind};
pub use portal::{IdentityParseError, Portal, Session, StepKey};
