use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tracker_domain::{Money, DEFAULT_TARGET_BALANCE};

use crate::ConfigError;

/// Stores user-configurable CLI preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    /// Email prefilled at login when "remember me" was chosen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remembered_email: Option<String>,
    /// Target shown for profiles that have none stored.
    #[serde(default = "Config::default_target_balance")]
    pub default_target_balance: Money,
    #[serde(default = "Config::default_recent_activity_limit")]
    pub recent_activity_limit: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom directory for the local data store. Defaults to the
    /// platform data directory.
    pub data_root: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "tr-TR".into(),
            currency: "TRY".into(),
            currency_symbol: Self::default_currency_symbol(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            remembered_email: None,
            default_target_balance: Self::default_target_balance(),
            recent_activity_limit: Self::default_recent_activity_limit(),
            data_root: None,
        }
    }
}

impl Config {
    /// Keys accepted by [`Config::set`].
    pub const KEYS: [&'static str; 7] = [
        "locale",
        "currency",
        "currency_symbol",
        "ui_color_enabled",
        "default_target_balance",
        "recent_activity_limit",
        "data_root",
    ];

    pub fn default_currency_symbol() -> String {
        "₺".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    pub fn default_target_balance() -> Money {
        DEFAULT_TARGET_BALANCE
    }

    pub fn default_recent_activity_limit() -> usize {
        5
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("budget_tracker")
    }

    /// Formats an amount with the configured currency symbol, e.g. `₺60.00`.
    pub fn format_amount(&self, amount: Money) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.currency_symbol, amount.abs())
        } else {
            format!("{}{}", self.currency_symbol, amount)
        }
    }

    pub fn remember_email(&mut self, email: Option<&str>) {
        self.remembered_email = email
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);
    }

    /// Current value of `key` as text.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "locale" => self.locale.clone(),
            "currency" => self.currency.clone(),
            "currency_symbol" => self.currency_symbol.clone(),
            "ui_color_enabled" => self.ui_color_enabled.to_string(),
            "remembered_email" => self.remembered_email.clone().unwrap_or_default(),
            "default_target_balance" => self.default_target_balance.to_string(),
            "recent_activity_limit" => self.recent_activity_limit.to_string(),
            "data_root" => self.resolve_data_root().display().to_string(),
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// Updates `key` from text, validating the value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        match key {
            "locale" if !value.is_empty() => self.locale = value.to_string(),
            "currency" if !value.is_empty() => self.currency = value.to_ascii_uppercase(),
            "currency_symbol" => self.currency_symbol = value.to_string(),
            "locale" | "currency" => return Err(invalid("value cannot be empty")),
            "ui_color_enabled" => {
                self.ui_color_enabled = match value.to_ascii_lowercase().as_str() {
                    "true" | "on" | "yes" | "1" => true,
                    "false" | "off" | "no" | "0" => false,
                    _ => return Err(invalid("expected true or false")),
                }
            }
            "default_target_balance" => {
                let amount: Money = value
                    .parse()
                    .map_err(|_| invalid("expected an amount such as 1250.00"))?;
                if !amount.is_positive() {
                    return Err(invalid("target must be greater than zero"));
                }
                self.default_target_balance = amount;
            }
            "recent_activity_limit" => {
                let limit: usize = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number"))?;
                if limit == 0 {
                    return Err(invalid("limit must be at least 1"));
                }
                self.recent_activity_limit = limit;
            }
            "data_root" => {
                self.data_root = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}
