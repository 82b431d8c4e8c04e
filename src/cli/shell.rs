use std::{
    borrow::Cow,
    collections::BTreeMap,
    io::{self, BufRead},
};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use crate::cli::core::{CliError, CliMode, ShellContext};
use crate::cli::output;
use crate::cli::shell_context::SCRIPT_ENV;
use crate::utils::build_info;

const HISTORY_FILE: &str = "history.txt";

/// What the line source produced for one turn of the loop.
enum Input {
    Line(String),
    Interrupted,
    Closed,
}

pub fn run_cli() -> Result<(), CliError> {
    let mode = match std::env::var_os(SCRIPT_ENV) {
        Some(_) => CliMode::Script,
        None => CliMode::Interactive,
    };
    let mut context = ShellContext::new(mode)?;
    tracing::debug!(?mode, root = %context.data_root().display(), "shell starting");

    let outcome = if mode == CliMode::Script {
        let mut lines = io::stdin().lock().lines();
        drive(&mut context, |_| Ok(lines.next().transpose()?.map_or(Input::Closed, Input::Line)))
    } else {
        run_interactive(&mut context)
    };
    tracing::debug!(status = %context.status(), "shell finished");
    outcome
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context)));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    let history = context.data_root().join(HISTORY_FILE);
    let _ = editor.load_history(&history);

    output::section(format!("Budget Tracker {}", build_info::current().short()));
    output::info("Type `help` to list commands, `exit` to leave.");

    drive(context, |context| match editor.readline(&context.prompt()) {
        Ok(line) => {
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.trim());
            }
            Ok(Input::Line(line))
        }
        Err(ReadlineError::Interrupted) => Ok(Input::Interrupted),
        Err(ReadlineError::Eof) => {
            output::info("Exiting shell.");
            Ok(Input::Closed)
        }
        Err(err) => Err(err.into()),
    })?;

    if let Err(err) = editor.save_history(&history) {
        tracing::warn!(error = %err, path = %history.display(), "could not save shell history");
    }
    Ok(())
}

/// Feeds lines from `next` to the shell until it stops or input runs out.
/// Blank lines and `#` comments are skipped.
fn drive<F>(context: &mut ShellContext, mut next: F) -> Result<(), CliError>
where
    F: FnMut(&ShellContext) -> Result<Input, CliError>,
{
    while context.running {
        match next(&*context)? {
            Input::Line(line) => {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Err(err) = context.execute_line(line) {
                    context.report_error(&err);
                }
            }
            Input::Interrupted if context.confirm_exit()? => break,
            Input::Interrupted => {}
            Input::Closed => break,
        }
    }
    Ok(())
}

/// Completes command names and hints at the usage of a typed command.
struct CommandHelper {
    usages: BTreeMap<String, &'static str>,
}

impl CommandHelper {
    fn new(context: &ShellContext) -> Self {
        let usages = context
            .command_names()
            .into_iter()
            .filter_map(|name| {
                context
                    .command(name)
                    .map(|entry| (name.to_ascii_lowercase(), entry.usage))
            })
            .collect();
        Self { usages }
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let trimmed = prefix.trim_start();
        if trimmed.contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }

        let start = prefix.len() - trimmed.len();
        let needle = trimmed.to_ascii_lowercase();
        let candidates = self
            .usages
            .keys()
            .filter(|name| name.starts_with(&needle))
            .map(|name| Pair {
                display: name.clone(),
                replacement: name.clone(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &ReadlineContext<'_>) -> Option<String> {
        if pos < line.len() {
            return None;
        }
        let command = line.trim().to_ascii_lowercase();
        let usage = self.usages.get(&command)?;
        let rest = usage.strip_prefix(command.as_str())?;
        if rest.is_empty() || line.ends_with(char::is_whitespace) {
            None
        } else {
            Some(rest.to_string())
        }
    }
}

impl Highlighter for CommandHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Owned(format!("\x1b[2m{hint}\x1b[0m"))
    }
}

impl Validator for CommandHelper {}

/// Splits a line into shell words, honouring quotes and escapes.
pub(crate) fn parse_command_line(input: &str) -> Result<Vec<String>, shell_words::ParseError> {
    split(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoted_arguments_stay_together() {
        let tokens = parse_command_line(r#"add expense 12.50 "lunch with Bob""#).unwrap();
        assert_eq!(tokens, ["add", "expense", "12.50", "lunch with Bob"]);
    }

    #[test]
    fn unbalanced_quotes_are_reported() {
        assert!(parse_command_line(r#"friend add "Bob"#).is_err());
    }
}
