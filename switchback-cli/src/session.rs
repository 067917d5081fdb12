//! The interactive menu loop.
//!
//! Errors never end the session: they are printed and the menu is shown
//! again. Only Exit, end of input, or Ctrl-C leave the loop.

use std::io::Write;

use switchback_core::error::Result;
use switchback_core::{execute_option, MenuOption, Outcome, Runner, FORCE_PROMPT};

use crate::output;
use crate::prompt::LineSource;

const CHOICE_PROMPT: &str = "> ";

/// Present the menu until the operator chooses to exit.
pub fn run<M, L, W>(runner: &mut M, lines: &mut L, out: &mut W) -> Result<()>
where
    M: Runner + ?Sized,
    L: LineSource + ?Sized,
    W: Write,
{
    loop {
        output::print_menu(out)?;
        let Some(option) = select_option(lines, out)? else {
            return Ok(());
        };

        let input = if option.needs_version() {
            match lines.read_line(FORCE_PROMPT)? {
                Some(line) => line,
                None => return Ok(()),
            }
        } else {
            String::new()
        };

        match execute_option(&mut input.as_bytes(), runner, option) {
            Ok(Outcome::Nothing) => return Ok(()),
            Ok(outcome) => {
                output::print_outcome(out, &outcome)?;
                if outcome.changed_schema() {
                    output::report_version(out, runner)?;
                }
            }
            Err(e) => {
                log::debug!("Option failed; option={:?}, error={:?}", option, e);
                output::print_failure(out, &e)?;
            }
        }
    }
}

/// Read choices until one names a menu option. Blank lines are skipped.
fn select_option<L, W>(lines: &mut L, out: &mut W) -> Result<Option<MenuOption>>
where
    L: LineSource + ?Sized,
    W: Write,
{
    loop {
        let Some(line) = lines.read_line(CHOICE_PROMPT)? else {
            return Ok(None);
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<MenuOption>() {
            Ok(option) => return Ok(Some(option)),
            Err(e) => output::print_failure(out, &e)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use switchback_core::error::SwitchbackError;
    use switchback_core::VersionMarker;

    use super::*;

    /// Replays scripted lines, then reports end of input.
    struct Script {
        lines: VecDeque<String>,
        prompts: Vec<String>,
    }

    impl Script {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl LineSource for Script {
        fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
            self.prompts.push(prompt.to_string());
            Ok(self.lines.pop_front())
        }
    }

    #[derive(Default)]
    struct FakeRunner {
        current: Option<i64>,
        fail_up: bool,
        calls: Vec<String>,
    }

    impl Runner for FakeRunner {
        fn up(&mut self) -> Result<()> {
            self.calls.push("Up".to_string());
            if self.fail_up {
                return Err(SwitchbackError::Irreversible { version: 7 });
            }
            if self.current == Some(2) {
                return Err(SwitchbackError::NoChange);
            }
            self.current = Some(2);
            Ok(())
        }

        fn down(&mut self) -> Result<()> {
            self.calls.push("Down".to_string());
            self.current.take().map(|_| ()).ok_or(SwitchbackError::NoChange)
        }

        fn drop_all(&mut self) -> Result<()> {
            self.calls.push("Drop".to_string());
            self.current = None;
            Ok(())
        }

        fn force(&mut self, version: i64) -> Result<()> {
            self.calls.push(format!("Force({})", version));
            self.current = (version > 0).then_some(version);
            Ok(())
        }

        fn version(&mut self) -> Result<VersionMarker> {
            self.calls.push("Version".to_string());
            self.current
                .map(|version| VersionMarker {
                    version,
                    dirty: false,
                })
                .ok_or(SwitchbackError::NilVersion)
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn session(runner: &mut FakeRunner, script: &mut Script) -> String {
        let mut out = Vec::new();
        run(runner, script, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_exit_leaves_immediately() {
        let mut runner = FakeRunner::default();
        let mut script = Script::new(&["6", "1"]);
        let out = session(&mut runner, &mut script);
        assert!(out.contains("Up - all versions"));
        assert!(out.contains("Do nothing - exit"));
        assert!(runner.calls.is_empty());
        assert_eq!(script.lines.len(), 1);
    }

    #[test]
    fn test_end_of_input_leaves() {
        let mut runner = FakeRunner::default();
        let mut script = Script::new(&[]);
        session(&mut runner, &mut script);
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_unknown_choice_reprompts() {
        let mut runner = FakeRunner::default();
        let mut script = Script::new(&["9", "", "exit"]);
        let out = session(&mut runner, &mut script);
        assert!(out.contains("Unknown option '9'"));
        assert_eq!(script.prompts, vec![CHOICE_PROMPT; 3]);
    }

    #[test]
    fn test_error_is_printed_and_menu_shown_again() {
        let mut runner = FakeRunner {
            fail_up: true,
            ..Default::default()
        };
        let mut script = Script::new(&["1", "6"]);
        let out = session(&mut runner, &mut script);
        assert!(out.contains("cannot be reverted"));
        assert_eq!(out.matches("Choose option").count(), 2);
        assert_eq!(runner.calls, vec!["Up"]);
    }

    #[test]
    fn test_success_reports_new_version() {
        let mut runner = FakeRunner::default();
        let mut script = Script::new(&["up", "exit"]);
        let out = session(&mut runner, &mut script);
        assert!(out.contains("Applied all pending migrations."));
        assert!(out.contains("Schema is at v2."));
        assert_eq!(runner.calls, vec!["Up", "Version"]);
    }

    #[test]
    fn test_no_op_is_reported_without_version_query() {
        let mut runner = FakeRunner {
            current: Some(2),
            ..Default::default()
        };
        let mut script = Script::new(&["1", "6"]);
        let out = session(&mut runner, &mut script);
        assert!(out.contains("already up-to-date"));
        assert!(!out.contains("ERROR"));
        assert_eq!(runner.calls, vec!["Up"]);
    }

    #[test]
    fn test_force_prompts_for_version() {
        let mut runner = FakeRunner::default();
        let mut script = Script::new(&["4", "3", "6"]);
        let out = session(&mut runner, &mut script);
        assert_eq!(script.prompts[1], FORCE_PROMPT);
        assert_eq!(runner.calls, vec!["Force(3)", "Version"]);
        assert!(out.contains("Schema is at v3."));
    }

    #[test]
    fn test_force_with_bad_version_applies_nothing() {
        let mut runner = FakeRunner::default();
        let mut script = Script::new(&["force", "three", "exit"]);
        let out = session(&mut runner, &mut script);
        assert!(out.contains("expected integer"));
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_end_of_input_at_force_prompt_leaves() {
        let mut runner = FakeRunner::default();
        let mut script = Script::new(&["4"]);
        session(&mut runner, &mut script);
        assert!(runner.calls.is_empty());
    }

    #[test]
    fn test_full_reset() {
        let mut runner = FakeRunner {
            current: Some(2),
            ..Default::default()
        };
        let mut script = Script::new(&["5", "6"]);
        let out = session(&mut runner, &mut script);
        assert_eq!(runner.calls, vec!["Force(0)", "Drop", "Version"]);
        assert!(out.contains("No migrations have been done yet."));
    }
}
