//! Moon CLI.
//!
//! Provides commands for:
//! - `serve`: Serve the public directory with live reload

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::ServeArgs;
use error::CliError;
use output::Output;

/// Moon - live reloading development server.
#[derive(Parser, Debug)]
#[command(name = "moon", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the public directory with live reload.
    Serve(ServeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG (default WARN)
    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(err) = run(cli) {
        output.error(&err);
        #[allow(clippy::exit)]
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Serve(args) => {
            let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
            runtime.block_on(args.execute())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from([
            "moon", "serve", "--port", "4000", "-d", "www", "--no-live-reload", "-v",
        ])
        .unwrap();
        let Commands::Serve(args) = cli.command;
        assert!(args.verbose);
    }

    #[test]
    fn test_live_reload_flags_conflict() {
        let result = Cli::try_parse_from([
            "moon",
            "serve",
            "--live-reload",
            "true",
            "--no-live-reload",
        ]);
        assert!(result.is_err());
    }
}
