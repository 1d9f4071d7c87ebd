//! CLI module - argument parsing and command dispatch

pub mod args;
pub mod commands;
pub mod helpers;

pub use args::{Cli, Commands, GlobalOpts, OutputFormat};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber
///
/// `ONBOARD_LOG` (or `RUST_LOG`) wins over the level implied by the flags.
pub fn init_logging(global: &GlobalOpts) {
    let default_level = if global.verbose {
        "onboard=debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("ONBOARD_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
