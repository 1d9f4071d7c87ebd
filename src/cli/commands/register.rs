//! `onboard register` command - interactive registration wizard

use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use miette::{bail, IntoDiagnostic, Result};
use serde_json::Value;

use crate::cli::helpers::{describe_next_route, print_field_errors, print_notifications};
use crate::cli::GlobalOpts;
use crate::client::{DryRunClient, HttpSubmissionClient, SubmissionClient};
use crate::core::{Config, Portal};
use crate::schema::{StepPrompter, Validator};
use crate::wizard::{FinalizeOutcome, WizardController};

#[derive(Debug, Args)]
pub struct RegisterArgs {
    /// Portal to register with
    #[arg(value_enum)]
    pub portal: Portal,

    /// Walk through the wizard without sending anything
    #[arg(long)]
    pub dry_run: bool,
}

/// What the user picked after filling a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepAction {
    Continue,
    Back,
    Cancel,
}

pub fn run(args: RegisterArgs, _global: &GlobalOpts) -> Result<()> {
    let mut client: Box<dyn SubmissionClient> = if args.dry_run {
        Box::new(DryRunClient::new())
    } else {
        let config = Config::load();
        Box::new(HttpSubmissionClient::from_config(&config, config.session(args.portal)).into_diagnostic()?)
    };

    let mut wizard = WizardController::new(args.portal, Validator::default()).into_diagnostic()?;
    let prompter = StepPrompter::new();
    let theme = ColorfulTheme::default();

    println!();
    println!(
        "{} {} registration",
        style("◆").cyan(),
        style(args.portal).bold()
    );
    println!("{}", style("─".repeat(50)).dim());

    // Input that failed validation, offered again as defaults
    let mut pending: Option<Value> = None;

    loop {
        let index = wizard.current_step();
        let Some(def) = wizard.flow().step(index) else {
            bail!("Wizard is at step {} which does not exist", index);
        };

        println!();
        println!(
            "{} Step {}/{}: {}",
            style("▸").cyan(),
            index,
            wizard.step_count(),
            style(def.title).bold()
        );

        let defaults = pending.take().or_else(|| wizard.draft().get(index).cloned());
        let raw = prompter.prompt(args.portal, def.key, defaults.as_ref())?;

        match choose_action(&theme, index, wizard.is_last_step())? {
            StepAction::Cancel => {
                println!("{} Registration cancelled, nothing was sent.", style("•").dim());
                return Ok(());
            }
            StepAction::Back => {
                wizard.retreat();
                continue;
            }
            StepAction::Continue => {}
        }

        if let Err(errors) = wizard.submit_step(index, raw.clone()) {
            print_field_errors(&errors);
            pending = Some(raw);
            continue;
        }

        if index < wizard.step_count() {
            continue;
        }

        // Last step accepted: re-check everything and submit, retrying on request
        loop {
            let outcome = wizard.finalize(client.as_mut());
            print_notifications(wizard.take_notifications());

            match outcome {
                FinalizeOutcome::Submitted { next, .. } => {
                    println!("{}", describe_next_route(&next));
                    return Ok(());
                }
                FinalizeOutcome::Redirected { errors, .. } => {
                    print_field_errors(&errors);
                    break;
                }
                FinalizeOutcome::Failed { .. } => {
                    let retry = Confirm::with_theme(&theme)
                        .with_prompt("Try submitting again?")
                        .default(true)
                        .interact()
                        .into_diagnostic()?;
                    if !retry {
                        bail!("Registration was not submitted");
                    }
                }
                FinalizeOutcome::Busy => bail!("A submission is already in progress"),
            }
        }
    }
}

fn choose_action(theme: &ColorfulTheme, index: usize, last: bool) -> Result<StepAction> {
    let mut actions = vec![(if last { "Submit" } else { "Continue" }, StepAction::Continue)];
    if index > 1 {
        actions.push(("Back", StepAction::Back));
    }
    actions.push(("Cancel", StepAction::Cancel));

    let labels: Vec<&str> = actions.iter().map(|(l, _)| *l).collect();
    let selection = Select::with_theme(theme)
        .items(&labels)
        .default(0)
        .interact()
        .into_diagnostic()?;

    Ok(actions
        .get(selection)
        .map(|(_, a)| *a)
        .unwrap_or(StepAction::Cancel))
}
