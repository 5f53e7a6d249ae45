//! Console capability for user-facing messages and prompts.
//!
//! The engine talks to the user only through the [`Console`] trait, so
//! tests can drive reconciliation with a scripted console and the CLI can
//! decide how prompts look.

use std::io::IsTerminal;

use colored::Colorize;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;

use crate::error::{ParamsyncError, Result};

/// Interactive transport injected into the reconciliation engine.
#[cfg_attr(test, mockall::automock)]
pub trait Console {
    /// Writes a status message to the user.
    fn write(&self, message: &str);

    /// Whether the session can ask the user questions.
    fn is_interactive(&self) -> bool;

    /// Asks a question, offering `default` as the answer when the user
    /// just presses enter.
    ///
    /// # Errors
    ///
    /// Returns an error when the prompt transport fails.
    fn ask(&self, label: &str, default: &str) -> Result<String>;
}

/// Console backed by the process terminal.
#[derive(Debug)]
pub struct TerminalConsole {
    /// Interactivity can be switched off regardless of the terminal.
    interactive: bool,
}

impl TerminalConsole {
    /// Creates a terminal console.
    ///
    /// The session counts as interactive only when stdin is a terminal
    /// and `non_interactive` was not requested.
    #[must_use]
    pub fn new(non_interactive: bool) -> Self {
        Self {
            interactive: !non_interactive && std::io::stdin().is_terminal(),
        }
    }
}

impl Console for TerminalConsole {
    fn write(&self, message: &str) {
        println!("{message}");
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn ask(&self, label: &str, default: &str) -> Result<String> {
        let prompt = format!("{} ({})", label.cyan(), default.yellow());
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| ParamsyncError::prompt(e.to_string()))
    }
}
