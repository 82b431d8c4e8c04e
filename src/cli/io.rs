use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};

use crate::cli::core::CommandError;

pub use crate::cli::output::{
    error as print_error, hint as print_hint, info as print_info, success as print_success,
    warning as print_warning,
};

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(
    theme: &ColorfulTheme,
    prompt: &str,
    default: bool,
) -> Result<bool, CommandError> {
    Confirm::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(CommandError::from)
}

/// Prompt the user for free-form text input. Empty input is allowed.
pub fn prompt_text(
    theme: &ColorfulTheme,
    prompt: &str,
    initial: Option<&str>,
) -> Result<String, CommandError> {
    let mut input = Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true);
    if let Some(initial) = initial {
        input = input.with_initial_text(initial);
    }
    input.interact_text().map_err(CommandError::from)
}

/// Prompt for a secret without echoing it.
pub fn prompt_password(theme: &ColorfulTheme, prompt: &str) -> Result<String, CommandError> {
    Password::with_theme(theme)
        .with_prompt(prompt)
        .interact()
        .map_err(CommandError::from)
}

/// Prompt for a new password, asking twice.
pub fn prompt_new_password(theme: &ColorfulTheme, prompt: &str) -> Result<String, CommandError> {
    Password::with_theme(theme)
        .with_prompt(prompt)
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()
        .map_err(CommandError::from)
}
