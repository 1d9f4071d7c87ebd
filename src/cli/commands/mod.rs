//! CLI command implementations

pub mod completions;
pub mod config;
pub mod labels;
pub mod register;
pub mod steps;
pub mod submit;
pub mod validate;
