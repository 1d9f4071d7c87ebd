//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;
use crate::schema::StepErrors;
use crate::wizard::{NextRoute, Notification, NotificationLevel};

/// Truncate a string to max_len characters, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Inline field messages for a step, one per line
pub fn render_field_errors(errors: &StepErrors) -> String {
    let mut out = String::new();
    for e in &errors.errors {
        out.push_str(&format!("  {} {}: {}\n", style("✗").red(), style(e.field()).bold(), e.message));
        if let Some(help) = &e.help {
            out.push_str(&format!("      {}\n", style(help).dim()));
        }
    }
    out
}

pub fn print_field_errors(errors: &StepErrors) {
    eprintln!(
        "{} The {} step needs attention:",
        style("!").yellow().bold(),
        style(errors.step).bold()
    );
    eprint!("{}", render_field_errors(errors));
}

/// Print and clear controller notifications
pub fn print_notifications(notes: Vec<Notification>) {
    for note in notes {
        match note.level {
            NotificationLevel::Info => println!("{} {}", style("•").cyan(), note.message),
            NotificationLevel::Success => println!("{} {}", style("✓").green(), note.message),
            NotificationLevel::Error => eprintln!("{} {}", style("✗").red(), note.message),
        }
    }
}

/// Sentence telling the user where to go next
pub fn describe_next_route(next: &NextRoute) -> String {
    match next {
        NextRoute::Verification { portal, email: Some(email) } => {
            format!("Next: verify your {} account with the code sent to {}", portal, email)
        }
        NextRoute::Verification { portal, email: None } => {
            format!("Next: verify your {} account with the code sent to you", portal)
        }
    }
}

/// Render rows as TSV, CSV or a markdown table
///
/// JSON and YAML are handled by the callers, which have typed rows to
/// serialize; here they fall back to TSV.
pub fn render_rows(headers: &[&str], rows: &[Vec<String>], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            wtr.write_record(headers).into_diagnostic()?;
            for row in rows {
                wtr.write_record(row).into_diagnostic()?;
            }
            let bytes = wtr.into_inner().into_diagnostic()?;
            String::from_utf8(bytes).into_diagnostic()
        }
        OutputFormat::Md => {
            let mut builder = Builder::default();
            builder.push_record(headers.iter().map(|h| h.to_string()));
            for row in rows {
                builder.push_record(row.iter().cloned());
            }
            Ok(format!("{}\n", builder.build().with(Style::markdown()).to_string()))
        }
        _ => {
            let mut out = headers.join("\t").to_uppercase();
            out.push('\n');
            for row in rows {
                out.push_str(&row.join("\t"));
                out.push('\n');
            }
            Ok(out)
        }
    }
}
