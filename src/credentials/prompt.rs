//! VR-022: Masked terminal prompt.

use super::{PromptError, Prompter};
use dialoguer::Password;
use std::io::IsTerminal;

/// Prompts on the controlling terminal via `dialoguer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn prompt_password(&self, prompt: &str, confirm: bool) -> Result<String, PromptError> {
        if !std::io::stdin().is_terminal() {
            return Err(PromptError::NoInteractivity);
        }
        let mut input = Password::new().with_prompt(prompt);
        if confirm {
            input = input.with_confirmation("Confirm", "Passwords do not match");
        }
        input
            .interact()
            .map_err(|e| PromptError::Failed(e.to_string()))
    }
}

/// Refuses every prompt. Used with `--no-prompt`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrompt;

impl Prompter for NoPrompt {
    fn prompt_password(&self, _prompt: &str, _confirm: bool) -> Result<String, PromptError> {
        Err(PromptError::NoInteractivity)
    }
}
