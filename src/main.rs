use clap::Parser;
use miette::Result;
use onboard::cli::{init_logging, Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` and friends exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);
    tracing::debug!(format = ?global.format, "starting");

    match cli.command {
        Commands::Register(args) => onboard::cli::commands::register::run(args, &global),
        Commands::Submit(args) => onboard::cli::commands::submit::run(args, &global),
        Commands::Validate(args) => onboard::cli::commands::validate::run(args, &global),
        Commands::Steps(args) => onboard::cli::commands::steps::run(args, &global),
        Commands::Labels(args) => onboard::cli::commands::labels::run(args, &global),
        Commands::Config(cmd) => onboard::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => onboard::cli::commands::completions::run(args),
    }
}
