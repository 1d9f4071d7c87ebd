//! `onboard validate` command - check one step slice against its schema

use console::style;
use miette::{bail, IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::core::{Portal, StepKey};
use crate::schema::Validator;
use crate::wizard::Flow;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Portal the slice belongs to
    #[arg(value_enum)]
    pub portal: Portal,

    /// Step name (account, personal, professional, documents, consent)
    pub step: StepKey,

    /// Slice file (YAML or JSON)
    pub file: PathBuf,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let flow = Flow::for_portal(args.portal).into_diagnostic()?;
    if flow.index_of(args.step).is_none() {
        bail!(
            "'{}' is not a step of the {} registration (steps: {})",
            args.step,
            args.portal,
            flow.steps()
                .iter()
                .map(|s| s.key.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let content = std::fs::read_to_string(&args.file).into_diagnostic()?;
    let filename = args.file.display().to_string();

    let validator = Validator::default();
    validator.validate_document(&content, &filename, args.portal, args.step)?;

    if !global.quiet {
        println!(
            "{} {} is a valid {} {} step",
            style("✓").green(),
            filename,
            args.portal,
            args.step
        );
    }
    Ok(())
}
