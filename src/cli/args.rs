//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, labels::LabelsArgs, register::RegisterArgs,
    steps::StepsArgs, submit::SubmitArgs, validate::ValidateArgs,
};

#[derive(Parser)]
#[command(name = "onboard")]
#[command(author, version, about = "Telehealth portal registration wizards")]
#[command(long_about = "Step-by-step sign-up for the doctor and user portals of the telehealth platform. \
Each step is validated against its schema, the whole draft is re-checked before submitting, \
and the registration is posted to the backend as a multipart form.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging on stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a registration wizard interactively
    Register(RegisterArgs),

    /// Register from a draft file without prompts
    Submit(SubmitArgs),

    /// Validate one step slice file against its schema
    Validate(ValidateArgs),

    /// List the steps and fields of a registration flow
    Steps(StepsArgs),

    /// Show code-to-label tables (specializations, statuses, ...)
    Labels(LabelsArgs),

    /// Configuration inspection
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically pick a human-readable format
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
}
