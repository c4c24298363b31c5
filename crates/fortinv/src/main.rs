mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, LogFormat};
use crate::error::CliError;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity and the configured log format
    init_tracing(cli.global.verbose, log_format(&cli));

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// `--log-format`, else the config file value, else text. A config file
/// that fails to load is reported later by the command that needs it.
fn log_format(cli: &Cli) -> LogFormat {
    cli.global.log_format.unwrap_or_else(|| {
        match config::load(&cli.global).map(|c| c.defaults.log_format) {
            Ok(format) if format == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    })
}

fn init_tracing(verbosity: u8, format: LogFormat) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Export(args) => commands::export::handle(&args, &cli.global),

        Command::Schema => {
            commands::schema::handle(&cli.global);
            Ok(())
        }

        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "fortinv", &mut std::io::stdout());
            Ok(())
        }
    }
}
