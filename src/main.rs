use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use covgate::cli::{self, Cli};

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    init_logging(args.verbose, args.quiet);

    let outcome = cli::run(&args)?;
    print!("{}", outcome.output);

    Ok(if outcome.pass {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Log to stderr so the report on stdout stays clean. `RUST_LOG` overrides
/// the level picked from the flags.
fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
