//! Form validation performed before any backend call.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracker_domain::Money;

use crate::ValidationError;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

const PASSWORD_SYMBOLS: &[char] = &['!', '@', '#', '$', '%', '^', '&', '*'];

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_PATTERN.is_match(email.trim()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Returns `true` when every value contains something other than whitespace.
pub fn all_present(values: &[&str]) -> bool {
    values.iter().all(|value| !value.trim().is_empty())
}

/// Advisory strength rating shown while the user types a new password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl fmt::Display for PasswordStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
        };
        f.write_str(label)
    }
}

pub fn password_strength(password: &str) -> PasswordStrength {
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(&c));
    let length = password.chars().count();

    let mixed = has_lower && has_upper && has_digit;
    if mixed && has_symbol && length >= 8 {
        PasswordStrength::Strong
    } else if mixed && length >= 6 {
        PasswordStrength::Medium
    } else {
        PasswordStrength::Weak
    }
}

/// Normalizes keypad input into a decimal string: digits and a single point,
/// at most two fractional digits. `"1a2.3.45"` becomes `"12.34"`.
pub fn sanitize_amount_input(raw: &str) -> String {
    let mut whole = String::new();
    let mut fraction: Option<String> = None;
    for ch in raw.chars() {
        match (ch, fraction.as_mut()) {
            ('0'..='9', None) => whole.push(ch),
            ('0'..='9', Some(digits)) => {
                if digits.len() < 2 {
                    digits.push(ch);
                }
            }
            ('.', None) => fraction = Some(String::new()),
            _ => {}
        }
    }
    match fraction {
        Some(digits) => format!("{whole}.{digits}"),
        None => whole,
    }
}

/// Sanitizes and parses a user-entered amount, which must be greater than zero.
pub fn parse_amount(raw: &str) -> Result<Money, ValidationError> {
    let cleaned = sanitize_amount_input(raw);
    let amount: Money = cleaned
        .parse()
        .map_err(|_| ValidationError::InvalidAmount)?;
    ensure_positive(amount)
}

pub fn ensure_positive(amount: Money) -> Result<Money, ValidationError> {
    if amount.is_positive() {
        Ok(amount)
    } else {
        Err(ValidationError::InvalidAmount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern_requires_user_domain_and_tld() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email("  ada@example.com ").is_ok());
        assert!(validate_email("ada@example").is_err());
        assert!(validate_email("ada example@x.com").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn password_strength_tiers() {
        assert_eq!(password_strength("abc"), PasswordStrength::Weak);
        assert_eq!(password_strength("abcdefgh"), PasswordStrength::Weak);
        assert_eq!(password_strength("Abcde1"), PasswordStrength::Medium);
        assert_eq!(password_strength("Abcdef1!"), PasswordStrength::Strong);
        assert_eq!(password_strength("Abcd1!"), PasswordStrength::Medium);
    }

    #[test]
    fn amount_input_is_sanitized() {
        assert_eq!(sanitize_amount_input("1a2.3.45"), "12.34");
        assert_eq!(sanitize_amount_input("₺40"), "40");
        assert_eq!(sanitize_amount_input("0.999"), "0.99");
        assert_eq!(sanitize_amount_input("."), ".");
    }

    #[test]
    fn parse_amount_rejects_zero_and_garbage() {
        assert_eq!(parse_amount("40.50"), Ok(Money::from_cents(4050)));
        assert_eq!(parse_amount("0"), Err(ValidationError::InvalidAmount));
        assert_eq!(parse_amount("abc"), Err(ValidationError::InvalidAmount));
        assert_eq!(parse_amount("-5"), Ok(Money::from_cents(500)));
        assert_eq!(parse_amount(""), Err(ValidationError::InvalidAmount));
    }

    #[test]
    fn presence_check_ignores_whitespace() {
        assert!(all_present(&["a", "b"]));
        assert!(!all_present(&["a", "  "]));
    }
}
