//! `onboard labels` command - code-to-label tables

use console::style;
use miette::{bail, IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::render_rows;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{label_for_code, LabelKind};

#[derive(clap::Args, Debug)]
pub struct LabelsArgs {
    /// Table to show
    #[arg(value_enum)]
    pub kind: LabelKind,

    /// Resolve a single code instead of listing the table
    #[arg(long)]
    pub code: Option<u8>,
}

#[derive(Debug, Serialize)]
struct LabelRow {
    code: u8,
    label: &'static str,
}

pub fn run(args: LabelsArgs, global: &GlobalOpts) -> Result<()> {
    if let Some(code) = args.code {
        let Some(label) = label_for_code(args.kind, code) else {
            bail!("{} has no entry for code {}", args.kind.as_str(), code);
        };
        match global.format {
            OutputFormat::Json => {
                let row = LabelRow { code, label };
                println!("{}", serde_json::to_string(&row).into_diagnostic()?);
            }
            _ => println!("{}", label),
        }
        return Ok(());
    }

    let rows: Vec<LabelRow> = args
        .kind
        .entries()
        .into_iter()
        .map(|(code, label)| LabelRow { code, label })
        .collect();

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&rows).into_diagnostic()?);
        }
        OutputFormat::Auto => {
            println!("{}", style(args.kind.as_str()).bold());
            for row in &rows {
                println!("  {:>3}  {}", style(row.code).cyan(), row.label);
            }
        }
        format => {
            let table: Vec<Vec<String>> = rows
                .iter()
                .map(|r| vec![r.code.to_string(), r.label.to_string()])
                .collect();
            print!("{}", render_rows(&["code", "label"], &table, format)?);
        }
    }

    Ok(())
}
