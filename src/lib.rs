//! Onboard: registration wizards for the telehealth portals
//!
//! The doctor and user sign-up flows are modelled as an explicit state
//! machine that validates each step against an embedded JSON Schema,
//! re-checks the whole draft before submitting, and hands a flattened
//! multipart payload to a pluggable submission client.

pub mod cli;
pub mod client;
pub mod core;
pub mod schema;
pub mod wizard;
pub mod yaml;
