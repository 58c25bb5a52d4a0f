use std::io::{IsTerminal, Read};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tstoy::{Cli, TstoyError};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("TSTOY_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Everything piped on stdin, or `None` when stdin is a terminal.
fn read_piped_stdin() -> Result<Option<String>, TstoyError> {
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }
    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .map_err(|source| TstoyError::IoError {
            operation: "read",
            path: "<stdin>".into(),
            source,
        })?;
    Ok(Some(text))
}

fn run(cli: Cli) -> Result<(), TstoyError> {
    let stdin = if cli.reads_stdin() {
        read_piped_stdin()?
    } else {
        None
    };
    if let Some(text) = &stdin {
        debug!(bytes = text.len(), "read desired settings from stdin");
    }

    let builder = cli.builder();
    let pretty = cli.pretty;
    let action = cli.into_action(stdin.as_deref())?;
    builder.handle_and_print(&action, pretty)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
