use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use tracker_config::Config;

static COLOR_ENABLED: AtomicBool = AtomicBool::new(true);

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

impl MessageKind {
    fn render(self, message: impl fmt::Display, color: bool) -> String {
        let text = match self {
            MessageKind::Section => format!("=== {} ===", message.to_string().trim()),
            MessageKind::Info => message.to_string(),
            MessageKind::Success => format!("[ok] {message}"),
            MessageKind::Warning => format!("[!] {message}"),
            MessageKind::Error => format!("[x] {message}"),
            MessageKind::Hint => format!("hint: {message}"),
        };
        if !color {
            return text;
        }
        match self {
            MessageKind::Info => text,
            MessageKind::Success => text.bright_green().to_string(),
            MessageKind::Warning => text.bright_yellow().to_string(),
            MessageKind::Error => text.bright_red().to_string(),
            MessageKind::Hint => text.dimmed().to_string(),
            MessageKind::Section => text.bold().to_string(),
        }
    }
}

/// Mirrors the output-related settings of `config`.
pub fn apply_config(config: &Config) {
    COLOR_ENABLED.store(config.ui_color_enabled, Ordering::Relaxed);
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let rendered = kind.render(message, COLOR_ENABLED.load(Ordering::Relaxed));
    if kind == MessageKind::Section {
        println!();
    }
    println!("{rendered}");
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_has_labels_without_escape_codes() {
        assert_eq!(MessageKind::Error.render("boom", false), "[x] boom");
        assert_eq!(MessageKind::Section.render(" Profile ", false), "=== Profile ===");
        assert_eq!(MessageKind::Info.render("plain", false), "plain");
        assert_eq!(MessageKind::Hint.render("try again", false), "hint: try again");
    }
}
