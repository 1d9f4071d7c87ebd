//! `onboard config` command - inspect the effective configuration

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::LOCAL_CONFIG_FILE;
use crate::core::{Config, Portal};

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the merged configuration and resolved endpoints
    Show,

    /// Show paths to configuration files
    Path,
}

pub fn run(cmd: ConfigCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show => run_show(global),
        ConfigCommands::Path => run_path(),
    }
}

fn run_show(global: &GlobalOpts) -> Result<()> {
    let mut config = Config::load();
    config.token = config.token.as_deref().map(mask_token);

    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(&config).into_diagnostic()?);
        }
        _ => {
            println!("{}", style("Effective Configuration").bold().underlined());
            println!();
            print_config_value("api_url", Some(config.api_url()));
            print_config_value("token", config.token.as_deref());
            for portal in Portal::with_registration().iter().copied() {
                let endpoint = config.registration_endpoint(portal).into_diagnostic()?;
                print_config_value(
                    &format!("endpoints.{}", portal),
                    Some(&config.session(portal).url_for(endpoint)),
                );
            }

            println!();
            println!("{}", style("Config Sources (in priority order):").dim());
            println!("  1. Environment variables (ONBOARD_API_URL, ONBOARD_TOKEN)");
            println!("  2. Local config ({})", LOCAL_CONFIG_FILE);
            println!("  3. Global config (~/.config/onboard/config.yaml)");
        }
    }
    Ok(())
}

fn run_path() -> Result<()> {
    match Config::global_config_path() {
        Some(path) => print_path("Global", &path),
        None => println!("{}: {}", style("Global").bold(), style("(no home directory)").dim()),
    }
    print_path("Local", Path::new(LOCAL_CONFIG_FILE));
    Ok(())
}

fn print_path(label: &str, path: &Path) {
    let status = if path.exists() {
        style("(exists)").green()
    } else {
        style("(not found)").dim()
    };
    println!("{}: {} {}", style(label).bold(), path.display(), status);
}

fn print_config_value(key: &str, value: Option<&str>) {
    match value {
        Some(v) => println!("  {}: {}", style(key).cyan(), v),
        None => println!("  {}: {}", style(key).cyan(), style("(not set)").dim()),
    }
}

/// Keep only the last four characters of a secret
fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("****{}", tail)
}
