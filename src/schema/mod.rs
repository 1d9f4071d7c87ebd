//! Schema system - step validation and schema-driven prompting

pub mod prompter;
pub mod registry;
pub mod validator;

pub use prompter::{FieldInfo, FieldType, StepPrompter};
pub use registry::SchemaRegistry;
pub use validator::{FieldError, StepErrors, StepValidator, ValidationError, Validator};
