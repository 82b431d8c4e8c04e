//! Command dispatch, error reporting and the helpers shared by every handler.

use std::io;

use strsim::levenshtein;
use tracker_core::{AuthFlow, AuthUser, CoreError};
use tracker_domain::{Identifiable, Money};

pub use crate::cli::shell_context::{CliMode, ShellContext};
pub use crate::errors::CliError;
use crate::errors::BudgetError;

use super::io as cli_io;
use super::registry::CommandEntry;
use super::shell::parse_command_line;

/// Largest edit distance at which an unknown command gets a suggestion.
const SUGGESTION_DISTANCE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] BudgetError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl CommandError {
    /// Wraps an error raised while signing up, signing in or resetting a password.
    pub(crate) fn auth(err: CoreError, flow: AuthFlow) -> Self {
        CommandError::Core(BudgetError::from_auth(err, flow))
    }

    pub(crate) fn usage(usage: &str) -> Self {
        CommandError::InvalidArguments(format!("usage: {usage}"))
    }

    /// Message and optional follow-up hint shown to the user.
    fn describe(&self) -> (String, Option<&'static str>) {
        match self {
            CommandError::InvalidArguments(message) => {
                (message.clone(), Some("Use `help <command>` for usage details."))
            }
            CommandError::Core(BudgetError::NotSignedIn) => (
                "Not signed in.".to_string(),
                Some("Use `login <email>` or `signup` to get started."),
            ),
            other => (other.to_string(), None),
        }
    }
}

impl From<CoreError> for CommandError {
    fn from(err: CoreError) -> Self {
        CommandError::Core(BudgetError::from(err))
    }
}

impl From<tracker_config::ConfigError> for CommandError {
    fn from(err: tracker_config::ConfigError) -> Self {
        CommandError::Core(BudgetError::from(err))
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Core(inner) => CliError::Core(inner),
            other => CliError::Command(other.to_string()),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        CliError::Command(format!("I/O failure: {err}"))
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(format!("line editor failure: {err}"))
    }
}

impl ShellContext {
    pub(crate) fn can_prompt(&self) -> bool {
        self.mode == CliMode::Interactive
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn prompt(&self) -> String {
        self.client
            .auth
            .current_user()
            .map(|user| format!("budget [{}]> ", user.email))
            .unwrap_or_else(|| "budget> ".to_string())
    }

    /// The signed-in account, or an error pointing at `login`.
    pub(crate) fn require_session(&self) -> Result<AuthUser, CommandError> {
        self.client
            .auth
            .current_user()
            .ok_or(CommandError::Core(BudgetError::NotSignedIn))
    }

    pub(crate) fn format_amount(&self, amount: Money) -> String {
        self.config.format_amount(amount)
    }

    pub(crate) fn recent_limit(&self) -> usize {
        self.config.recent_activity_limit
    }

    pub(crate) fn save_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        Ok(())
    }

    /// Splits, records and runs one input line. Returns `Exit` once the
    /// shell should stop, after which `running` is false.
    pub(crate) fn execute_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                cli_io::print_warning(format!("Could not parse input: {err}"));
                return Ok(LoopControl::Continue);
            }
        };
        let Some((raw, rest)) = tokens.split_first() else {
            return Ok(LoopControl::Continue);
        };

        self.last_command = Some(line.to_string());
        let args: Vec<&str> = rest.iter().map(String::as_str).collect();
        let control = self.dispatch(&raw.to_lowercase(), raw, &args)?;
        if control == LoopControl::Exit {
            self.running = false;
        }
        Ok(control)
    }

    fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let Some(handler) = self.registry.handler(command) else {
            self.suggest_command(raw);
            return Ok(LoopControl::Continue);
        };
        tracing::debug!(command, args = args.len(), "dispatching");
        match handler(self, args) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
            Err(err) => Err(err),
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{input}`. Type `help` to see available commands."
        ));

        let needle = input.to_lowercase();
        let closest = self
            .registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
            .min_by_key(|(distance, _)| *distance);
        if let Some((_, name)) = closest {
            cli_io::print_info(format!("Suggestion: `{name}`?"));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if !self.can_prompt() {
            return Ok(true);
        }
        Ok(cli_io::confirm_action(&self.theme, "Exit shell?", true)?)
    }

    /// Prints a failed command. The shell keeps running afterwards.
    pub(crate) fn report_error(&self, err: &CommandError) {
        if matches!(err, CommandError::ExitRequested) {
            return;
        }
        tracing::debug!(error = %err, command = ?self.last_command, "command failed");
        let (message, hint) = err.describe();
        cli_io::print_error(message);
        if let Some(hint) = hint {
            cli_io::print_hint(hint);
        }
    }

    /// Prints the recoveries made while decoding stored records.
    pub(crate) fn report_decode_warnings(&self, warnings: &[String]) {
        for warning in warnings {
            cli_io::print_warning(warning);
        }
    }
}

/// Joins trailing arguments into an optional description.
pub(crate) fn join_description(args: &[&str]) -> Option<String> {
    let joined = args.join(" ");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Finds the item whose id is `key` or starts with it, as printed by the
/// short-id listings. `None` when nothing matches.
pub(crate) fn find_by_id_prefix<'a, T: Identifiable>(
    items: &'a [T],
    key: &str,
    noun: &str,
) -> Result<Option<&'a T>, CommandError> {
    if let Some(exact) = items.iter().find(|item| item.id() == key) {
        return Ok(Some(exact));
    }
    let mut matches = items.iter().filter(|item| item.id().starts_with(key));
    match (matches.next(), matches.count()) {
        (first, 0) => Ok(first),
        (_, more) => Err(CommandError::InvalidArguments(format!(
            "`{key}` matches {} {noun}; use more characters",
            more + 1
        ))),
    }
}

/// Runs `lines` in script mode against a shell rooted at `home`.
#[cfg(test)]
pub(crate) fn process_script(
    home: &std::path::Path,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut shell = ShellContext::with_home(CliMode::Script, home.to_path_buf())?;
    for line in lines {
        if !shell.running {
            break;
        }
        if let Err(err) = shell.execute_line(line) {
            shell.report_error(&err);
        }
    }
    Ok(shell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_are_trimmed_and_optional() {
        assert_eq!(join_description(&[]), None);
        assert_eq!(join_description(&["  "]), None);
        assert_eq!(
            join_description(&["lunch", "with", "Bob"]).as_deref(),
            Some("lunch with Bob")
        );
    }

    #[test]
    fn id_prefixes_must_be_unambiguous() {
        struct Row(&'static str);
        impl Identifiable for Row {
            fn id(&self) -> &str {
                self.0
            }
        }
        let rows = [Row("ab12"), Row("ab34"), Row("cd56"), Row("ab")];
        let found = |key: &str| {
            find_by_id_prefix(&rows, key, "rows").map(|row| row.map(|row| row.0))
        };
        assert_eq!(found("cd").unwrap(), Some("cd56"));
        assert_eq!(found("ab").unwrap(), Some("ab"));
        assert_eq!(found("zz").unwrap(), None);
        assert!(matches!(
            find_by_id_prefix(&rows[..2], "ab", "rows"),
            Err(CommandError::InvalidArguments(message)) if message.contains("matches 2 rows")
        ));
    }

    #[test]
    fn missing_session_comes_with_a_hint() {
        let (message, hint) = CommandError::Core(BudgetError::NotSignedIn).describe();
        assert_eq!(message, "Not signed in.");
        assert!(hint.is_some_and(|hint| hint.contains("login")));
        assert!(CommandError::usage("exit").describe().1.is_some());
        assert!(CommandError::ExitRequested.describe().1.is_none());
    }
}
