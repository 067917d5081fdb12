//! CLI entry point for the switchback migration console.
//! Loads configuration, opens the runner, and hands the terminal to the
//! interactive menu loop. Startup failures map to exit codes by error type.

mod output;
mod prompt;
mod session;

use std::io::{self, Write};
use std::process;

use clap::Parser;

use switchback_core::config::{normalize_location, CliOverrides, SwitchbackConfig};
use switchback_core::error::SwitchbackError;
use switchback_core::{PostgresRunner, Runner};

use crate::prompt::Terminal;

/// Command-line flags. There are no subcommands; the menu drives everything.
#[derive(Parser)]
#[command(
    name = "switchback",
    about = "Interactive console to apply, roll back, force, or drop PostgreSQL schema migrations",
    version
)]
struct Cli {
    /// Config file path
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Database URL (overrides config)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Target schema (overrides config)
    #[arg(long, value_name = "SCHEMA")]
    schema: Option<String>,

    /// Migration directory (overrides config)
    #[arg(long, value_name = "PATH")]
    location: Option<String>,

    /// Number of retries when connecting to the database
    #[arg(long, value_name = "N")]
    connect_retries: Option<u32>,

    /// SSL/TLS mode: disable, prefer, require
    #[arg(long, value_name = "MODE")]
    ssl_mode: Option<String>,

    /// Connection timeout in seconds (default: 30, 0 = no timeout)
    #[arg(long, value_name = "SECS")]
    connect_timeout: Option<u32>,

    /// Suppress log output below errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::new()
        .parse_env(env_logger::Env::default().default_filter_or(filter))
        .format_target(false)
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        output::print_error(&e);
        process::exit(exit_code(&e));
    }
}

/// Map error types to differentiated exit codes.
fn exit_code(error: &SwitchbackError) -> i32 {
    match error {
        SwitchbackError::ConfigError(_) => 2,
        SwitchbackError::DatabaseError(_) => 4,
        SwitchbackError::MigrateError(_) => 5,
        _ => 1,
    }
}

fn run(cli: Cli) -> Result<(), SwitchbackError> {
    let overrides = CliOverrides {
        url: cli.url,
        schema: cli.schema,
        location: cli.location.as_deref().map(normalize_location),
        connect_retries: cli.connect_retries,
        ssl_mode: cli.ssl_mode,
        connect_timeout: cli.connect_timeout,
    };

    let config = SwitchbackConfig::load(cli.config.as_deref(), &overrides)?;
    log::debug!(
        "Opening runner; schema={}, location={}",
        config.migrations.schema,
        config.migrations.location.display()
    );
    let mut runner = PostgresRunner::open(&config)?;

    let result = console(&mut runner, &mut io::stdout());
    if let Err(e) = runner.close() {
        log::warn!("Failed to close migration runner; error={}", e);
    }
    result
}

/// Report the version, run the menu, report the version again.
fn console<M: Runner>(runner: &mut M, out: &mut impl Write) -> Result<(), SwitchbackError> {
    output::report_version(out, runner)?;

    match Terminal::new() {
        Ok(mut terminal) => {
            if let Err(e) = session::run(runner, &mut terminal, out) {
                output::print_failure(out, &e)?;
            }
        }
        Err(e) => output::print_failure(out, &e)?,
    }

    output::report_version(out, runner)?;
    out.flush()?;
    Ok(())
}
