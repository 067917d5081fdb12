//! Map a menu option to one runner operation.

use std::fmt;
use std::io::BufRead;

use crate::error::{Result, SwitchbackError};
use crate::option::MenuOption;
use crate::runner::Runner;

/// Prompt printed before the version for a force is read.
pub const FORCE_PROMPT: &str = "Migrate to which version? ";

/// Successful result of a dispatched option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The option ran and may have changed the schema.
    Completed(MenuOption),
    /// Up found nothing pending.
    AlreadyUpToDate,
    /// Down found nothing applied.
    AlreadyAtLowest,
    /// Exit was chosen; nothing ran.
    Nothing,
}

impl Outcome {
    /// Whether the schema version may differ from before the option ran.
    pub fn changed_schema(self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Completed(MenuOption::Up) => f.write_str("Applied all pending migrations."),
            Outcome::Completed(MenuOption::Down) => f.write_str("Reverted all applied migrations."),
            Outcome::Completed(MenuOption::Drop) => f.write_str("Dropped all tables."),
            Outcome::Completed(MenuOption::Force) => f.write_str("Version marker forced."),
            Outcome::Completed(MenuOption::FullReset) => {
                f.write_str("Forced first version and dropped all tables.")
            }
            Outcome::Completed(MenuOption::Exit) | Outcome::Nothing => f.write_str("Nothing to do."),
            Outcome::AlreadyUpToDate => f.write_str("already up-to-date"),
            Outcome::AlreadyAtLowest => f.write_str("already on lowest possible version"),
        }
    }
}

/// Run `option` against `runner`.
///
/// Only [`MenuOption::Force`] reads from `input`: the first whitespace-separated
/// token of one line, which must be an integer. The runner's no-change signal
/// becomes a success outcome for Up and Down; every other error is returned as is.
pub fn execute_option<R, M>(input: &mut R, runner: &mut M, option: MenuOption) -> Result<Outcome>
where
    R: BufRead + ?Sized,
    M: Runner + ?Sized,
{
    log::debug!("Executing option; option={:?}", option);

    match option {
        MenuOption::Up => match runner.up() {
            Err(SwitchbackError::NoChange) => return Ok(Outcome::AlreadyUpToDate),
            other => other?,
        },
        MenuOption::Down => match runner.down() {
            Err(SwitchbackError::NoChange) => return Ok(Outcome::AlreadyAtLowest),
            other => other?,
        },
        MenuOption::Drop => runner.drop_all()?,
        MenuOption::Force => {
            let version = read_version(input)?;
            runner.force(version)?;
        }
        MenuOption::FullReset => {
            runner.force(0)?;
            runner.drop_all()?;
        }
        MenuOption::Exit => return Ok(Outcome::Nothing),
    }

    Ok(Outcome::Completed(option))
}

/// Read one integer version from `input`.
fn read_version<R: BufRead + ?Sized>(input: &mut R) -> Result<i64> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    let token = line.split_whitespace().next().unwrap_or_default();
    token
        .parse::<i64>()
        .map_err(|_| SwitchbackError::ExpectedInteger {
            input: token.to_string(),
        })
}
