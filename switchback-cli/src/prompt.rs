//! Operator input, read line by line with rustyline.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use switchback_core::error::{Result, SwitchbackError};

/// Source of operator input.
pub trait LineSource {
    /// Show `prompt` and read one line. `None` means the operator left
    /// (end of input or Ctrl-C).
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive terminal with line editing and in-memory history.
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| SwitchbackError::PromptError(e.to_string()))?;
        Ok(Self { editor })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = self.editor.add_history_entry(line.as_str()) {
                        log::debug!("Failed to record history entry: {}", e);
                    }
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(SwitchbackError::PromptError(e.to_string())),
        }
    }
}
