//! `onboard steps` command - describe a registration flow

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::render_rows;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Portal;
use crate::schema::StepPrompter;
use crate::wizard::Flow;

#[derive(clap::Args, Debug)]
pub struct StepsArgs {
    /// Portal whose registration flow to list
    #[arg(value_enum)]
    pub portal: Portal,
}

/// One step of a flow, as printed
#[derive(Debug, Serialize)]
struct StepRow {
    index: usize,
    key: String,
    title: String,
    required: Vec<String>,
    optional: Vec<String>,
    files: Vec<String>,
}

pub fn run(args: StepsArgs, global: &GlobalOpts) -> Result<()> {
    let flow = Flow::for_portal(args.portal).into_diagnostic()?;
    let prompter = StepPrompter::new();

    let mut rows = Vec::with_capacity(flow.len());
    for (i, def) in flow.steps().iter().enumerate() {
        let fields = prompter.fields(args.portal, def.key)?;
        let (required, optional): (Vec<_>, Vec<_>) = fields.into_iter().partition(|f| f.required);
        rows.push(StepRow {
            index: i + 1,
            key: def.key.to_string(),
            title: def.title.to_string(),
            required: required.into_iter().map(|f| f.name).collect(),
            optional: optional.into_iter().map(|f| f.name).collect(),
            files: def.file_fields.iter().map(|f| f.to_string()).collect(),
        });
    }

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&rows).into_diagnostic()?);
        }
        OutputFormat::Auto => {
            println!(
                "{} {} registration, {} steps",
                style("◆").cyan(),
                style(args.portal).bold(),
                rows.len()
            );
            for row in &rows {
                println!();
                println!("{} {}", style(format!("{}.", row.index)).cyan(), style(&row.title).bold());
                println!("   {} {}", style("key:").dim(), row.key);
                println!("   {} {}", style("required:").dim(), row.required.join(", "));
                if !row.optional.is_empty() {
                    println!("   {} {}", style("optional:").dim(), row.optional.join(", "));
                }
                if !row.files.is_empty() {
                    println!("   {} {}", style("uploads:").dim(), row.files.join(", "));
                }
            }
        }
        format => {
            let table: Vec<Vec<String>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.index.to_string(),
                        r.key.clone(),
                        r.title.clone(),
                        r.required.join(" "),
                        r.optional.join(" "),
                    ]
                })
                .collect();
            print!(
                "{}",
                render_rows(&["index", "key", "title", "required", "optional"], &table, format)?
            );
        }
    }

    Ok(())
}
