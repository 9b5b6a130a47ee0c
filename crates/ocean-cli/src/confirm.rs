//! Delete confirmation prompts.

use std::io::{self, BufRead, Write};

use crate::error::CliError;

/// Asks the user a yes/no question.
pub trait Confirm {
    /// Show `message` and return whether the user agreed.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown or read.
    fn confirm(&self, message: &str) -> Result<bool, CliError>;
}

/// Prompts on stderr and reads the answer from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> Result<bool, CliError> {
        let mut stderr = io::stderr().lock();
        write!(stderr, "Warning: {message} (y/N) ? ")?;
        stderr.flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Confirm deleting `count` resources, or fail with [`CliError::Aborted`].
///
/// # Errors
///
/// Returns [`CliError::Aborted`] when the user declines.
pub fn ask_for_confirm_delete(confirm: &dyn Confirm, resource: &str, count: usize) -> Result<(), CliError> {
    let message = if count == 1 {
        format!("Are you sure you want to delete this {resource}?")
    } else {
        format!("Are you sure you want to delete these {count} {resource}s?")
    };
    if confirm.confirm(&message)? {
        Ok(())
    } else {
        Err(CliError::Aborted)
    }
}
