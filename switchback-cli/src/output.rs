//! Terminal output for the console.
//! Uses colored for severity-aware terminal styling.

use std::io::{self, Write};

use colored::Colorize;

use switchback_core::error::SwitchbackError;
use switchback_core::{current_version, MenuOption, Outcome, Runner};

/// Print the numbered menu.
pub fn print_menu(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "Choose option".bold())?;
    for (i, option) in MenuOption::ALL.iter().enumerate() {
        writeln!(out, "  {} {}", format!("{})", i + 1).cyan(), option.label())?;
    }
    Ok(())
}

/// Print the result of a successful option.
pub fn print_outcome(out: &mut impl Write, outcome: &Outcome) -> io::Result<()> {
    let message = outcome.to_string();
    match outcome {
        Outcome::Completed(_) => writeln!(out, "{}", message.green().bold()),
        _ => writeln!(out, "{}", message.green()),
    }
}

/// Print an error raised inside the session; the session keeps going.
pub fn print_failure(out: &mut impl Write, error: &SwitchbackError) -> io::Result<()> {
    writeln!(out, "{} {}", "ERROR:".red().bold(), error)
}

/// Print the runner's current version, or the error that prevented reading it.
pub fn report_version<M: Runner + ?Sized>(out: &mut impl Write, runner: &mut M) -> io::Result<()> {
    match current_version(runner) {
        Ok(version) => writeln!(out, "\n{}\n", version.to_string().cyan()),
        Err(e) => print_failure(out, &e),
    }
}

/// Print a fatal error with an actionable hint to stderr.
pub fn print_error(error: &SwitchbackError) {
    eprintln!("{} {}", "ERROR:".red().bold(), error);

    match error {
        SwitchbackError::ConfigError(_) => {
            eprintln!(
                "{}",
                "Hint: Check your switchback.toml or set SWITCHBACK_DATABASE_URL environment variable."
                    .dimmed()
            );
        }
        SwitchbackError::DatabaseError(_) => {
            eprintln!(
                "{}",
                "Hint: Verify database is running and connection details are correct.".dimmed()
            );
        }
        SwitchbackError::MigrateError(_) => {
            eprintln!(
                "{}",
                "Hint: Check that --location points at a directory of <VERSION>_<NAME>.up.sql / .down.sql files."
                    .dimmed()
            );
        }
        _ => {}
    }
}
