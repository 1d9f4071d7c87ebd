//! `onboard submit` command - batch registration from a draft file

use clap::Args;
use console::style;
use miette::{bail, IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{describe_next_route, print_field_errors, print_notifications, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::client::{DryRunClient, HttpSubmissionClient, SubmissionClient};
use crate::core::{Config, Portal};
use crate::schema::{StepPrompter, StepValidator, Validator};
use crate::wizard::{FinalizeOutcome, PayloadPart, SubmissionPayload, WizardController};
use crate::yaml::load_draft_document;

#[derive(Debug, Args)]
pub struct SubmitArgs {
    /// Portal to register with
    #[arg(value_enum)]
    pub portal: Portal,

    /// Draft file mapping step names to fields (YAML or JSON)
    pub draft: PathBuf,

    /// Validate and assemble the payload without sending it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run(args: SubmitArgs, global: &GlobalOpts) -> Result<()> {
    let slices = load_draft_document(&args.draft)?;
    let mut wizard = WizardController::new(args.portal, Validator::default()).into_diagnostic()?;

    for step in slices.keys() {
        if wizard.flow().index_of(*step).is_none() {
            bail!(
                "The draft has a '{}' section, which is not a step of the {} registration",
                step,
                args.portal
            );
        }
    }

    // Feed steps in order until the first one the draft does not cover
    let steps = wizard.flow().steps();
    for def in steps {
        let Some(slice) = slices.get(&def.key) else {
            break;
        };
        let index = wizard.current_step();
        if let Err(errors) = wizard.submit_step(index, slice.clone()) {
            print_field_errors(&errors);
            bail!("Step {} ({}) is invalid; nothing was submitted", index, def.key);
        }
        if chatty(global) {
            println!(
                "{} Step {}/{}: {}",
                style("✓").green(),
                index,
                wizard.step_count(),
                def.title
            );
        }
    }

    if args.dry_run {
        let mut client = DryRunClient::new();
        finish(&mut wizard, &mut client, global)?;
        if let Some(payload) = client.last() {
            let secret = StepPrompter::new().secret_fields(args.portal);
            print_payload(&payload.redacted(&secret), global)?;
        }
        Ok(())
    } else {
        let config = Config::load();
        let mut client =
            HttpSubmissionClient::from_config(&config, config.session(args.portal)).into_diagnostic()?;
        finish(&mut wizard, &mut client, global)
    }
}

fn finish<V: StepValidator, C: SubmissionClient>(
    wizard: &mut WizardController<V>,
    client: &mut C,
    global: &GlobalOpts,
) -> Result<()> {
    let outcome = wizard.finalize(client);
    let notes = wizard.take_notifications();

    match outcome {
        FinalizeOutcome::Submitted { next, .. } => {
            if chatty(global) {
                print_notifications(notes);
                println!("{}", describe_next_route(&next));
            }
            Ok(())
        }
        FinalizeOutcome::Redirected { step, errors, .. } => {
            print_field_errors(&errors);
            bail!("Registration stopped at step {} ({})", step, errors.step)
        }
        FinalizeOutcome::Failed { message } => bail!("Submission failed: {}", message),
        FinalizeOutcome::Busy => bail!("A submission is already in progress"),
    }
}

/// Progress lines only go with the human-readable format
fn chatty(global: &GlobalOpts) -> bool {
    !global.quiet && matches!(global.format, OutputFormat::Auto | OutputFormat::Tsv)
}

fn print_payload(payload: &SubmissionPayload, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(payload).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(payload).into_diagnostic()?);
        }
        _ => {
            if global.quiet {
                return Ok(());
            }
            println!();
            println!("{}", style("Payload (not sent)").bold());
            for part in &payload.parts {
                match part {
                    PayloadPart::Text { name, value } => println!("  {}\t{}", name, truncate_str(value, 60)),
                    PayloadPart::File { name, path } => {
                        println!("  {}\t{} {}", name, style("file").cyan(), path.display())
                    }
                }
            }
        }
    }
    Ok(())
}
