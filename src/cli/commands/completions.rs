//! Shell completion scripts for `onboard`
//!
//! Supports every shell `clap_complete` knows: bash, elvish, fish,
//! PowerShell and zsh.
//!
//! ```bash
//! # Bash - add to ~/.bashrc
//! source <(onboard completions bash)
//!
//! # Zsh - add to ~/.zshrc
//! source <(onboard completions zsh)
//!
//! # Fish
//! onboard completions fish > ~/.config/fish/completions/onboard.fish
//!
//! # PowerShell - add to $PROFILE
//! onboard completions powershell >> $PROFILE
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io;

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
